use std::path::Path;

use anyhow::{Context, Result};
use gistshare_config::AppConfig;
use gistshare_database::{NewGist, User};
use gistshare_runtime::Services;
use tempfile::TempDir;

fn sqlite_url(path: &Path) -> String {
    format!("sqlite://{}", path.to_string_lossy())
}

fn build_config(database_url: String, max_connections: u32) -> AppConfig {
    let mut config = AppConfig::default();
    config.database.url = database_url;
    config.database.max_connections = max_connections;
    config
}

async fn initialise(config: &AppConfig) -> Result<Services> {
    Services::initialise(config)
        .await
        .context("failed to initialise services")
}

#[tokio::test(flavor = "multi_thread")]
async fn initialise_runs_migrations_and_creates_directories() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let db_path = temp_dir.path().join("runtime/init.db");
    let config = build_config(sqlite_url(&db_path), 4);

    let services = initialise(&config).await?;
    let table: String = sqlx::query_scalar(
        "SELECT name FROM sqlite_master WHERE type = 'table' AND name = 'likes'",
    )
    .fetch_one(&services.db_pool)
    .await?;

    assert_eq!(table, "likes");
    assert!(db_path.exists());
    services.close().await;
    Ok(())
}

#[tokio::test(flavor = "multi_thread")]
async fn repositories_share_one_store() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let config = build_config(sqlite_url(&temp_dir.path().join("shared.db")), 2);
    let services = initialise(&config).await?;

    let user = services.users.create(&User::new("runtime", "hash", None)).await?;
    let gist = services
        .gists
        .create(&NewGist {
            title: "hello".into(),
            user_id: user.id,
            forked_id: None,
        })
        .await?;
    services.likes.add(user.id, gist.id).await?;

    assert!(services.users.has_liked(&user, &gist).await?);
    assert_eq!(services.gists.find_by_id(gist.id).await?.nb_likes, 1);
    Ok(())
}

#[tokio::test(flavor = "multi_thread")]
async fn initialise_fails_for_unsupported_url() {
    let config = build_config("mysql://localhost/gists".to_string(), 1);
    let error = Services::initialise(&config)
        .await
        .err()
        .expect("non-sqlite urls should be rejected");

    assert!(format!("{error:#}").contains("failed to initialise database"));
}
