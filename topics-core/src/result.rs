use error_stack::Report;
use std::fmt::{Display, Formatter};

pub type RepoResult<T> = Result<T, Report<TopicRepoError>>;
pub type OptRepoResult<T> = Result<Option<T>, Report<TopicRepoError>>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RepoOperation {
    InitSchema,
    Get,
    List,
    Create,
    Update,
    Delete,
    CategoryStats,
}

impl Display for RepoOperation {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            RepoOperation::InitSchema => "init schema",
            RepoOperation::Get => "get topic",
            RepoOperation::List => "list topics",
            RepoOperation::Create => "create topic",
            RepoOperation::Update => "update topic",
            RepoOperation::Delete => "delete topic",
            RepoOperation::CategoryStats => "count categories",
        };
        f.write_str(name)
    }
}

/// A failure raised by storage. `message` is the storage engine's own message.
#[derive(Debug, thiserror::Error)]
#[error("failed to {operation}: {message}")]
pub struct TopicRepoError {
    operation: RepoOperation,
    message: String,
}

impl TopicRepoError {
    pub fn new(operation: RepoOperation, message: impl Into<String>) -> Self {
        Self {
            operation,
            message: message.into(),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}
