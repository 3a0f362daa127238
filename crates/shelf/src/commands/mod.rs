pub mod auth;
pub mod catalog;
pub mod publish;
pub mod repo;
