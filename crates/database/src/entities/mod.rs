//! Domain entities for the database layer

pub mod gist;
pub mod ssh_key;
pub mod user;

pub use gist::{Gist, NewGist};
pub use ssh_key::SshKey;
pub use user::{User, UserDto};
