//! Fixtures shared by the unit tests in this crate

use crate::connection::prepare_database;
use crate::entities::Gist;
use crate::migrations::run_migrations;
use crate::repos::GistRepository;
use gistshare_config::DatabaseConfig;
use sqlx::SqlitePool;
use tempfile::TempDir;

/// Timestamp far enough in the past that any accidental refresh shows up
pub const OLD_TIMESTAMP: i64 = 1_600_000_000;

pub async fn test_pool() -> (SqlitePool, TempDir) {
    let temp_dir = TempDir::new().unwrap();
    let db_path = temp_dir.path().join("test_users.db");
    let config = DatabaseConfig {
        url: format!("sqlite://{}", db_path.display()),
        max_connections: 2,
    };

    let pool = prepare_database(&config).await.unwrap();
    run_migrations(&pool).await.unwrap();
    (pool, temp_dir)
}

/// Insert a gist row directly, with stale timestamps
pub async fn insert_gist(pool: &SqlitePool, user_id: i64, forked_id: Option<i64>) -> Gist {
    let result = sqlx::query(
        "INSERT INTO gists (uuid, title, user_id, forked_id, nb_likes, nb_forks, created_at, updated_at)
         VALUES (?, 'fixture', ?, ?, 0, 0, ?, ?)",
    )
    .bind(cuid2::cuid())
    .bind(user_id)
    .bind(forked_id)
    .bind(OLD_TIMESTAMP)
    .bind(OLD_TIMESTAMP)
    .execute(pool)
    .await
    .unwrap();

    GistRepository::new(pool.clone())
        .find_by_id(result.last_insert_rowid())
        .await
        .unwrap()
}

pub async fn insert_ssh_key(pool: &SqlitePool, user_id: i64, title: &str) -> i64 {
    sqlx::query(
        "INSERT INTO ssh_keys (title, content, sha, created_at, user_id) VALUES (?, ?, ?, ?, ?)",
    )
    .bind(title)
    .bind(format!("ssh-ed25519 AAAA{title}"))
    .bind(format!("sha-{title}"))
    .bind(OLD_TIMESTAMP)
    .bind(user_id)
    .execute(pool)
    .await
    .unwrap()
    .last_insert_rowid()
}
