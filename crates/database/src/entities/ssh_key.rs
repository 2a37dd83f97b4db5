//! SSH key entity

use serde::{Deserialize, Serialize};

/// Public key registered by a user. Owned by the key management module;
/// the user store only reads these rows.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SshKey {
    pub id: i64,
    pub user_id: i64,
    pub title: String,
    pub content: String,
    pub sha: String,
    pub created_at: i64,
    pub last_used_at: Option<i64>,
}
