//! Database repository implementations

pub mod gist_repository;
pub mod like_repository;
pub mod user_repository;

pub use gist_repository::*;
pub use like_repository::*;
pub use user_repository::*;
