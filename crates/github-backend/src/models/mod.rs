pub mod content;
pub mod release;
pub mod repo;

pub use content::*;
pub use release::*;
pub use repo::*;
