//! Shared setup for the database integration tests

#![allow(dead_code)]

use gistshare_config::DatabaseConfig;
use gistshare_database::{
    initialize_database, Gist, GistRepository, LikeRepository, NewGist, User, UserRepository,
};
use sqlx::SqlitePool;
use tempfile::TempDir;

pub struct TestStore {
    pub pool: SqlitePool,
    pub users: UserRepository,
    pub gists: GistRepository,
    pub likes: LikeRepository,
    _temp_dir: TempDir,
}

impl TestStore {
    pub async fn new() -> Self {
        let temp_dir = TempDir::new().expect("failed to create temp dir");
        let db_path = temp_dir.path().join("gistshare_test.db");
        let config = DatabaseConfig {
            url: format!("sqlite://{}", db_path.display()),
            max_connections: 2,
        };

        let pool = initialize_database(&config)
            .await
            .expect("failed to initialise test database");

        Self {
            users: UserRepository::new(pool.clone()),
            gists: GistRepository::new(pool.clone()),
            likes: LikeRepository::new(pool.clone()),
            pool,
            _temp_dir: temp_dir,
        }
    }

    pub async fn user(&self, username: &str) -> User {
        self.users
            .create(&User::new(username, "hashed-password", None))
            .await
            .expect("failed to create user")
    }

    pub async fn gist(&self, owner: &User, forked_from: Option<&Gist>) -> Gist {
        self.gists
            .create(&NewGist {
                title: format!("{}'s gist", owner.username),
                user_id: owner.id,
                forked_id: forked_from.map(|g| g.id),
            })
            .await
            .expect("failed to create gist")
    }

    pub async fn reload(&self, gist: &Gist) -> Gist {
        self.gists
            .find_by_id(gist.id)
            .await
            .expect("gist should still exist")
    }
}
