//! User repository for database operations.

use super::LikeRepository;
use crate::entities::{Gist, SshKey, User};
use crate::types::{UserError, UserResult};
use chrono::Utc;
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqliteConnection, SqlitePool};
use tracing::{debug, info};

/// Rows per page in user listings
pub const USERS_PAGE_SIZE: i64 = 10;

const USER_COLUMNS: &str = "users.id, users.username, users.password, users.is_admin, users.created_at, users.email, users.md5_hash";

fn user_from_row(row: &SqliteRow) -> Result<User, sqlx::Error> {
    Ok(User {
        id: row.try_get("id")?,
        username: row.try_get("username")?,
        password: row.try_get("password")?,
        is_admin: row.try_get("is_admin")?,
        created_at: row.try_get("created_at")?,
        email: row.try_get("email")?,
        md5_hash: row.try_get("md5_hash")?,
        ssh_keys: Vec::new(),
    })
}

fn ssh_key_from_row(row: &SqliteRow) -> Result<SshKey, sqlx::Error> {
    Ok(SshKey {
        id: row.try_get("id")?,
        user_id: row.try_get("user_id")?,
        title: row.try_get("title")?,
        content: row.try_get("content")?,
        sha: row.try_get("sha")?,
        created_at: row.try_get("created_at")?,
        last_used_at: row.try_get("last_used_at")?,
    })
}

/// Fix the denormalised gist counters that reference `user_id`, ahead of the
/// user row being deleted.
///
/// Every gist the user liked loses one like, and every gist the user forked
/// loses one fork. A user holds at most one fork per parent, so one decrement
/// per parent matches the fork rows that go away.
/// `updated_at` is left alone. The like rows themselves go with the user
/// through the `likes` cascade.
///
/// Runs on the caller's connection so it can share the delete's transaction.
pub async fn decrement_counters_for_user(
    conn: &mut SqliteConnection,
    user_id: i64,
) -> UserResult<()> {
    let likes = sqlx::query(
        "UPDATE gists SET nb_likes = nb_likes - 1
         WHERE id IN (SELECT gist_id FROM likes WHERE user_id = ?)",
    )
    .bind(user_id)
    .execute(&mut *conn)
    .await?;

    let forks = sqlx::query(
        "UPDATE gists SET nb_forks = nb_forks - 1
         WHERE id IN (SELECT forked_id FROM gists WHERE user_id = ? AND forked_id IS NOT NULL)",
    )
    .bind(user_id)
    .execute(&mut *conn)
    .await?;

    debug!(
        user_id,
        likes_corrected = likes.rows_affected(),
        forks_corrected = forks.rows_affected(),
        "decremented gist counters for departing user"
    );

    Ok(())
}

/// Repository for user database operations
#[derive(Clone)]
pub struct UserRepository {
    pool: SqlitePool,
    likes: LikeRepository,
}

impl UserRepository {
    pub fn new(pool: SqlitePool) -> Self {
        let likes = LikeRepository::new(pool.clone());
        Self { pool, likes }
    }

    /// Case-insensitive check for a taken username
    pub async fn exists(&self, username: &str) -> UserResult<bool> {
        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM users WHERE username = ? COLLATE NOCASE")
                .bind(username)
                .fetch_one(&self.pool)
                .await?;

        Ok(count > 0)
    }

    /// One page of users ordered by id.
    ///
    /// Fetches up to `USERS_PAGE_SIZE + 1` rows starting at `page * USERS_PAGE_SIZE`.
    /// The extra row only signals that another page exists; callers drop it
    /// before rendering.
    pub async fn list_page(&self, page: u32) -> UserResult<Vec<User>> {
        let rows = sqlx::query(&format!(
            "SELECT {USER_COLUMNS} FROM users ORDER BY id ASC LIMIT ? OFFSET ?"
        ))
        .bind(USERS_PAGE_SIZE + 1)
        .bind(i64::from(page) * USERS_PAGE_SIZE)
        .fetch_all(&self.pool)
        .await?;

        let users = rows
            .iter()
            .map(user_from_row)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(users)
    }

    pub async fn count(&self) -> UserResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }

    /// Find user by username, ignoring case
    pub async fn find_by_username(&self, username: &str) -> UserResult<User> {
        let row = sqlx::query(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE username = ? COLLATE NOCASE LIMIT 1"
        ))
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(row) => Ok(user_from_row(&row)?),
            None => Err(UserError::NotFound),
        }
    }

    pub async fn find_by_id(&self, id: i64) -> UserResult<User> {
        let row = sqlx::query(&format!("SELECT {USER_COLUMNS} FROM users WHERE id = ?"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        match row {
            Some(row) => Ok(user_from_row(&row)?),
            None => Err(UserError::NotFound),
        }
    }

    /// Find the owner of an SSH key, with all of that owner's keys loaded
    pub async fn find_by_ssh_key_id(&self, ssh_key_id: i64) -> UserResult<User> {
        let row = sqlx::query(&format!(
            "SELECT {USER_COLUMNS} FROM users
             JOIN ssh_keys ON users.id = ssh_keys.user_id
             WHERE ssh_keys.id = ?
             LIMIT 1"
        ))
        .bind(ssh_key_id)
        .fetch_optional(&self.pool)
        .await?;

        let Some(row) = row else {
            return Err(UserError::NotFound);
        };
        let mut user = user_from_row(&row)?;

        let key_rows = sqlx::query(
            "SELECT id, user_id, title, content, sha, created_at, last_used_at
             FROM ssh_keys WHERE user_id = ? ORDER BY id ASC",
        )
        .bind(user.id)
        .fetch_all(&self.pool)
        .await?;

        user.ssh_keys = key_rows
            .iter()
            .map(ssh_key_from_row)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(user)
    }

    /// Insert a new user and return the stored record
    pub async fn create(&self, user: &User) -> UserResult<User> {
        let created_at = if user.created_at == 0 {
            Utc::now().timestamp()
        } else {
            user.created_at
        };

        let result = sqlx::query(
            "INSERT INTO users (username, password, is_admin, created_at, email, md5_hash)
             VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(&user.username)
        .bind(&user.password)
        .bind(user.is_admin)
        .bind(created_at)
        .bind(&user.email)
        .bind(&user.md5_hash)
        .execute(&self.pool)
        .await
        .map_err(UserError::from_write)?;

        let user_id = result.last_insert_rowid();
        info!(user_id, username = %user.username, "created user");

        Ok(User {
            id: user_id,
            created_at,
            ssh_keys: Vec::new(),
            ..user.clone()
        })
    }

    /// Overwrite every column of an existing user
    pub async fn update(&self, user: &User) -> UserResult<()> {
        let result = sqlx::query(
            "UPDATE users
             SET username = ?, password = ?, is_admin = ?, created_at = ?, email = ?, md5_hash = ?
             WHERE id = ?",
        )
        .bind(&user.username)
        .bind(&user.password)
        .bind(user.is_admin)
        .bind(user.created_at)
        .bind(&user.email)
        .bind(&user.md5_hash)
        .bind(user.id)
        .execute(&self.pool)
        .await
        .map_err(UserError::from_write)?;

        if result.rows_affected() == 0 {
            return Err(UserError::NotFound);
        }

        Ok(())
    }

    /// Delete a user, correcting gist counters in the same transaction.
    ///
    /// Gists, SSH keys and likes owned by the user are removed by the schema's
    /// cascades. Nothing is committed unless every step succeeds.
    pub async fn delete(&self, user: &User) -> UserResult<()> {
        let mut tx = self.pool.begin().await?;

        decrement_counters_for_user(&mut *tx, user.id).await?;

        let result = sqlx::query("DELETE FROM users WHERE id = ?")
            .bind(user.id)
            .execute(&mut *tx)
            .await?;

        if result.rows_affected() == 0 {
            return Err(UserError::NotFound);
        }

        tx.commit().await?;

        info!(user_id = user.id, username = %user.username, "deleted user");
        Ok(())
    }

    /// Grant admin rights without touching any other column
    pub async fn set_admin(&self, user: &User) -> UserResult<()> {
        let result = sqlx::query("UPDATE users SET is_admin = true WHERE id = ?")
            .bind(user.id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(UserError::NotFound);
        }

        info!(user_id = user.id, username = %user.username, "granted admin rights");
        Ok(())
    }

    /// Whether `user` has a like row for `gist`
    pub async fn has_liked(&self, user: &User, gist: &Gist) -> UserResult<bool> {
        self.likes.exists(user.id, gist.id).await
    }
}
