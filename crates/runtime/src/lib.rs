use anyhow::{Context, Result};
use gistshare_config::AppConfig;
use gistshare_database::{initialize_database, GistRepository, LikeRepository, UserRepository};
use sqlx::SqlitePool;
use tracing::info;

pub mod telemetry {
    use anyhow::Result;
    use gistshare_config::LogConfig;
    use tracing_subscriber::{fmt::SubscriberBuilder, EnvFilter};

    /// Install the global subscriber. `RUST_LOG` overrides the configured filter.
    pub fn init_tracing(config: &LogConfig) -> Result<()> {
        let env_filter = EnvFilter::try_from_default_env()
            .or_else(|_| EnvFilter::try_new(&config.filter))
            .unwrap_or_else(|_| EnvFilter::new("info"));

        let subscriber = SubscriberBuilder::default()
            .with_env_filter(env_filter)
            .with_writer(std::io::stderr)
            .finish();

        tracing::subscriber::set_global_default(subscriber)
            .map_err(|error| anyhow::anyhow!("failed to set tracing subscriber: {error}"))
    }
}

/// Pool and repositories shared by every entrypoint
#[derive(Clone)]
pub struct Services {
    pub db_pool: SqlitePool,
    pub users: UserRepository,
    pub likes: LikeRepository,
    pub gists: GistRepository,
}

impl Services {
    pub async fn initialise(config: &AppConfig) -> Result<Self> {
        let db_pool = initialize_database(&config.database)
            .await
            .context("failed to initialise database")?;

        info!(url = %config.database.url, "user store ready");

        Ok(Self {
            users: UserRepository::new(db_pool.clone()),
            likes: LikeRepository::new(db_pool.clone()),
            gists: GistRepository::new(db_pool.clone()),
            db_pool,
        })
    }

    pub async fn close(self) {
        self.db_pool.close().await;
        info!("user store closed");
    }
}
