pub mod catalog;
pub mod error;
pub mod models;
pub mod publish;
pub mod repo;
pub mod traits;

pub use catalog::{fetch_catalog, published, stats};
pub use error::{Result, ShelfError};
pub use models::*;
pub use publish::{attach_asset, ensure_release, expand_upload_url, publish_build};
pub use repo::{commit_file, create_game_repo, CoverImage, CreatedRepo};
pub use traits::ReleaseHost;
