use crate::postgres::topics::TopicRepo;
use crate::postgres::{ConnectionDetails, PoolSettings};
use deadpool_postgres::{Manager, ManagerConfig, Pool, RecyclingMethod, Runtime};
use error_stack::{Report, ResultExt};
use std::str::FromStr;
use tokio_postgres::{Config, NoTls};
use tracing::debug;

#[derive(Debug, thiserror::Error)]
#[error("failed to create repos")]
pub struct RepoCreationErr;

/// Builds the connection pool and the repository on top of it.
/// Connections are opened lazily, so an unreachable database only shows up on first use.
#[derive(Debug, Default)]
pub struct RepoCreator {
    pool_settings: PoolSettings,
}

impl RepoCreator {
    pub fn with_pool_settings(self, pool_settings: PoolSettings) -> Self {
        Self { pool_settings }
    }

    pub fn create(
        self,
        connection_details: ConnectionDetails,
    ) -> Result<TopicRepo, Report<RepoCreationErr>> {
        let config = build_config(connection_details)?;

        let mgr_config = ManagerConfig {
            recycling_method: RecyclingMethod::Fast,
        };
        let mgr = Manager::from_config(config, NoTls, mgr_config);

        debug!(
            max_size = self.pool_settings.max_size,
            acquire_timeout_secs = self.pool_settings.acquire_timeout.as_secs(),
            "building connection pool.."
        );
        let pool = Pool::builder(mgr)
            .max_size(self.pool_settings.max_size)
            .wait_timeout(Some(self.pool_settings.acquire_timeout))
            .runtime(Runtime::Tokio1)
            .build()
            .change_context(RepoCreationErr)?;
        debug!("connection pool built");

        Ok(TopicRepo::new(pool))
    }
}

fn build_config(connection_details: ConnectionDetails) -> Result<Config, Report<RepoCreationErr>> {
    match connection_details {
        ConnectionDetails::Url(url) => Config::from_str(&url)
            .change_context(RepoCreationErr)
            .attach("DATABASE_URL is not a valid connection string"),
        ConnectionDetails::Params {
            host,
            port,
            user,
            password,
            dbname,
        } => {
            let mut config = Config::new();
            config.host(&host).port(port).user(&user).dbname(&dbname);
            if let Some(password) = password {
                config.password(password);
            }
            Ok(config)
        }
    }
}
