//! Gist rows as seen by the user store: identity, ownership, fork link and counters.

use crate::entities::{Gist, NewGist};
use crate::types::{UserError, UserResult};
use chrono::Utc;
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};
use tracing::info;

pub(crate) fn gist_from_row(row: &SqliteRow) -> Result<Gist, sqlx::Error> {
    Ok(Gist {
        id: row.try_get("id")?,
        uuid: row.try_get("uuid")?,
        title: row.try_get("title")?,
        user_id: row.try_get("user_id")?,
        forked_id: row.try_get("forked_id")?,
        nb_likes: row.try_get("nb_likes")?,
        nb_forks: row.try_get("nb_forks")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

#[derive(Clone)]
pub struct GistRepository {
    pool: SqlitePool,
}

impl GistRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn find_by_id(&self, id: i64) -> UserResult<Gist> {
        let row = sqlx::query(
            "SELECT id, uuid, title, user_id, forked_id, nb_likes, nb_forks, created_at, updated_at
             FROM gists WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(row) => Ok(gist_from_row(&row)?),
            None => Err(UserError::GistNotFound),
        }
    }

    /// Insert a gist. A fork bumps its parent's fork counter in the same transaction.
    ///
    /// A user may hold only one fork of a given parent; a second attempt fails
    /// with `AlreadyForked` and leaves the counter alone.
    pub async fn create(&self, request: &NewGist) -> UserResult<Gist> {
        let now = Utc::now().timestamp();
        let uuid = cuid2::cuid();

        let mut tx = self.pool.begin().await?;

        if let Some(parent_id) = request.forked_id {
            let already_forked: i64 = sqlx::query_scalar(
                "SELECT EXISTS(SELECT 1 FROM gists WHERE user_id = ? AND forked_id = ?)",
            )
            .bind(request.user_id)
            .bind(parent_id)
            .fetch_one(&mut *tx)
            .await?;

            if already_forked != 0 {
                return Err(UserError::AlreadyForked);
            }

            let bumped = sqlx::query(
                "UPDATE gists SET nb_forks = nb_forks + 1 WHERE id = ?",
            )
            .bind(parent_id)
            .execute(&mut *tx)
            .await?;

            if bumped.rows_affected() == 0 {
                return Err(UserError::GistNotFound);
            }
        }

        let result = sqlx::query(
            "INSERT INTO gists (uuid, title, user_id, forked_id, nb_likes, nb_forks, created_at, updated_at)
             VALUES (?, ?, ?, ?, 0, 0, ?, ?)",
        )
        .bind(&uuid)
        .bind(&request.title)
        .bind(request.user_id)
        .bind(request.forked_id)
        .bind(now)
        .bind(now)
        .execute(&mut *tx)
        .await
        .map_err(UserError::from_write)?;

        tx.commit().await?;

        let gist_id = result.last_insert_rowid();
        info!(gist_id, user_id = request.user_id, forked_id = ?request.forked_id, "created gist");

        Ok(Gist {
            id: gist_id,
            uuid,
            title: request.title.clone(),
            user_id: request.user_id,
            forked_id: request.forked_id,
            nb_likes: 0,
            nb_forks: 0,
            created_at: now,
            updated_at: now,
        })
    }
}
