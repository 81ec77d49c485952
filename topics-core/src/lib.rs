use list_filter::TopicListCriteria;
use model::{CategoryCount, Topic, TopicFields, TopicId, TopicUpdate};
use result::{OptRepoResult, RepoResult};

pub mod list_filter;
pub mod model;
pub mod result;
pub mod transform;

/// Hands out the storage client the service works against.
/// `repo` returns `None` when no database is configured.
pub trait TopicEngine: Clone + Send + Sync + 'static {
    type Repo: TopicRepository + Send + Sync + 'static;

    fn repo(&self) -> Option<Self::Repo>;
}

pub trait TopicRepository {
    /// Creates the topics table if it does not exist yet.
    fn init_schema(&self) -> impl Future<Output = RepoResult<()>> + Send;

    fn get(&self, id: TopicId) -> impl Future<Output = OptRepoResult<Topic>> + Send;

    /// Newest first.
    fn list(
        &self,
        list_criteria: TopicListCriteria,
    ) -> impl Future<Output = RepoResult<Vec<Topic>>> + Send;

    fn create(&self, new_topic: TopicFields) -> impl Future<Output = RepoResult<TopicId>> + Send;

    /// Returns the number of rows touched, zero when `id` does not exist.
    fn update(
        &self,
        id: TopicId,
        update: TopicUpdate,
    ) -> impl Future<Output = RepoResult<u64>> + Send;

    /// Returns the number of rows removed, zero when `id` does not exist.
    fn delete(&self, id: TopicId) -> impl Future<Output = RepoResult<u64>> + Send;

    /// Topic count per distinct category, largest first.
    fn category_counts(&self) -> impl Future<Output = RepoResult<Vec<CategoryCount>>> + Send;

    /// Releases pooled connections. Later calls fail.
    fn close(&self);
}
