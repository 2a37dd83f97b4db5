//! Gist entity definitions

use serde::{Deserialize, Serialize};

/// The parts of a gist row the user store reads and maintains
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Gist {
    pub id: i64,
    pub uuid: String,
    pub title: String,
    pub user_id: i64,
    /// Parent gist when this gist is a fork
    pub forked_id: Option<i64>,
    pub nb_likes: i64,
    pub nb_forks: i64,
    pub created_at: i64,
    pub updated_at: i64,
}

impl Gist {
    pub fn is_fork(&self) -> bool {
        self.forked_id.is_some()
    }
}

/// Request for inserting a gist row
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewGist {
    pub title: String,
    pub user_id: i64,
    pub forked_id: Option<i64>,
}
