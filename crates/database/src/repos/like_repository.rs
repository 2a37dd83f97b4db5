//! Repository for the `likes` join table between users and gists.
//!
//! Each write keeps `gists.nb_likes` in step with the association rows and
//! leaves `gists.updated_at` untouched.

use crate::types::{UserError, UserResult};
use sqlx::SqlitePool;
use tracing::debug;

#[derive(Clone)]
pub struct LikeRepository {
    pool: SqlitePool,
}

impl LikeRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Record a like. Returns `false` when the user already liked the gist,
    /// `GistNotFound` when there is no such gist.
    pub async fn add(&self, user_id: i64, gist_id: i64) -> UserResult<bool> {
        let mut tx = self.pool.begin().await?;

        let gist_exists: i64 = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM gists WHERE id = ?)")
            .bind(gist_id)
            .fetch_one(&mut *tx)
            .await?;

        if gist_exists == 0 {
            return Err(UserError::GistNotFound);
        }

        let inserted = sqlx::query("INSERT OR IGNORE INTO likes (user_id, gist_id) VALUES (?, ?)")
            .bind(user_id)
            .bind(gist_id)
            .execute(&mut *tx)
            .await?;

        if inserted.rows_affected() == 0 {
            return Ok(false);
        }

        sqlx::query("UPDATE gists SET nb_likes = nb_likes + 1 WHERE id = ?")
            .bind(gist_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        debug!(user_id, gist_id, "recorded like");
        Ok(true)
    }

    /// Drop a like. Returns `false` when there was nothing to remove.
    pub async fn remove(&self, user_id: i64, gist_id: i64) -> UserResult<bool> {
        let mut tx = self.pool.begin().await?;

        let deleted = sqlx::query("DELETE FROM likes WHERE user_id = ? AND gist_id = ?")
            .bind(user_id)
            .bind(gist_id)
            .execute(&mut *tx)
            .await?;

        if deleted.rows_affected() == 0 {
            return Ok(false);
        }

        sqlx::query("UPDATE gists SET nb_likes = nb_likes - 1 WHERE id = ?")
            .bind(gist_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        debug!(user_id, gist_id, "removed like");
        Ok(true)
    }

    pub async fn exists(&self, user_id: i64, gist_id: i64) -> UserResult<bool> {
        let liked: i64 = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM likes WHERE user_id = ? AND gist_id = ?)",
        )
        .bind(user_id)
        .bind(gist_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(liked != 0)
    }

    /// Number of association rows for a gist, independent of the cached counter
    pub async fn count_for_gist(&self, gist_id: i64) -> UserResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM likes WHERE gist_id = ?")
            .bind(gist_id)
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}
