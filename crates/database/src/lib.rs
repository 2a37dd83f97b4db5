//! Gistshare Database Crate
//!
//! Persistence for user accounts of the gist-sharing service: connection
//! management, migrations, entities and the user, like and gist repositories.

use gistshare_config::DatabaseConfig;
use sqlx::SqlitePool;

pub mod connection;
pub mod entities;
pub mod migrations;
pub mod repos;
pub mod types;

#[cfg(test)]
pub(crate) mod test_support;

pub use connection::{prepare_database, DatabaseConnection};
pub use migrations::run_migrations;

pub use repos::{
    decrement_counters_for_user, GistRepository, LikeRepository, UserRepository, USERS_PAGE_SIZE,
};

pub use entities::{
    gist::{Gist, NewGist},
    ssh_key::SshKey,
    user::{avatar_hash, User, UserDto, RESERVED_USERNAMES, USERNAME_MAX_LEN},
};

pub use types::{
    errors::{DatabaseError, UserError},
    DatabaseResult, UserResult,
};

/// Connect and bring the schema up to date
pub async fn initialize_database(config: &DatabaseConfig) -> DatabaseResult<SqlitePool> {
    let pool = prepare_database(config)
        .await
        .map_err(|e| DatabaseError::ConnectionError(format!("{e:#}")))?;

    run_migrations(&pool)
        .await
        .map_err(|e| DatabaseError::MigrationError(format!("{e:#}")))?;

    Ok(pool)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_database_initialization() {
        let temp_dir = TempDir::new().unwrap();
        let db_path = temp_dir.path().join("init.db");
        let config = DatabaseConfig {
            url: format!("sqlite://{}", db_path.display()),
            max_connections: 1,
        };

        let pool = initialize_database(&config).await.unwrap();
        let users = UserRepository::new(pool);
        assert_eq!(users.count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_initialization_reports_bad_url() {
        let config = DatabaseConfig {
            url: "postgres://nobody@localhost/none".to_string(),
            max_connections: 1,
        };

        assert!(matches!(
            initialize_database(&config).await,
            Err(DatabaseError::ConnectionError(_))
        ));
    }
}
