use deadpool_postgres::PoolError;
use error_stack::Report;
use std::time::Duration;
use topics_core::result::{RepoOperation, RepoResult, TopicRepoError};

pub mod initializer;
mod statements;
pub mod topics;

pub const DEFAULT_POOL_SIZE: usize = 10;
pub const DEFAULT_ACQUIRE_TIMEOUT: Duration = Duration::from_secs(60);

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConnectionDetails {
    Url(String),
    Params {
        host: String,
        port: u16,
        user: String,
        password: Option<String>,
        dbname: String,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PoolSettings {
    /// Upper bound on concurrently checked-out connections.
    pub max_size: usize,
    /// How long a request waits for a free connection before failing.
    pub acquire_timeout: Duration,
}

impl Default for PoolSettings {
    fn default() -> Self {
        Self {
            max_size: DEFAULT_POOL_SIZE,
            acquire_timeout: DEFAULT_ACQUIRE_TIMEOUT,
        }
    }
}

/// Turns a driver or pool failure into a [`TopicRepoError`] that carries the storage message.
pub(crate) trait StorageResultExt<T> {
    fn storage_context(self, operation: RepoOperation) -> RepoResult<T>;
}

impl<T> StorageResultExt<T> for Result<T, tokio_postgres::Error> {
    fn storage_context(self, operation: RepoOperation) -> RepoResult<T> {
        self.map_err(|e| {
            let message = e
                .as_db_error()
                .map(|db| db.message().to_string())
                .unwrap_or_else(|| e.to_string());
            Report::new(e).change_context(TopicRepoError::new(operation, message))
        })
    }
}

impl<T> StorageResultExt<T> for Result<T, PoolError> {
    fn storage_context(self, operation: RepoOperation) -> RepoResult<T> {
        self.map_err(|e| {
            let message = e.to_string();
            Report::new(e).change_context(TopicRepoError::new(operation, message))
        })
    }
}
