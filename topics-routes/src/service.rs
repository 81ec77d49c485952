use crate::error::TopicServiceError;
use crate::{OptServiceResult, ServiceResult};
use error_stack::Report;
use topics_core::list_filter::TopicListCriteria;
use topics_core::model::{CategoryCount, Topic, TopicDraft, TopicId, TopicUpdate};
use topics_core::result::RepoResult;
use topics_core::{TopicEngine, TopicRepository};
use tracing::{debug, instrument};

/// Without a database, reads answer empty, writes fail as unavailable and
/// schema initialisation fails as a configuration error.
#[derive(Debug, Clone)]
pub struct TopicService<T> {
    engine: T,
}

fn from_storage<T>(result: RepoResult<T>) -> ServiceResult<T> {
    result.map_err(|report| {
        let message = report.current_context().message().to_string();
        report.change_context(TopicServiceError::Storage(message))
    })
}

impl<T> TopicService<T>
where
    T: TopicEngine,
{
    pub fn new(engine: T) -> Self {
        TopicService { engine }
    }

    fn write_repo(&self) -> ServiceResult<T::Repo> {
        self.engine
            .repo()
            .ok_or_else(|| Report::new(TopicServiceError::Unavailable))
    }

    #[instrument(skip_all, name = "service#init_schema")]
    pub async fn init_schema(&self) -> ServiceResult<()> {
        let repo = self
            .engine
            .repo()
            .ok_or_else(|| Report::new(TopicServiceError::Configuration))?;
        from_storage(repo.init_schema().await)
    }

    #[instrument(skip_all, name = "service#get")]
    pub async fn get(&self, id: TopicId) -> OptServiceResult<Topic> {
        match self.engine.repo() {
            Some(repo) => from_storage(repo.get(id).await),
            None => Ok(None),
        }
    }

    #[instrument(skip_all, name = "service#list")]
    pub async fn list(&self, list_criteria: TopicListCriteria) -> ServiceResult<Vec<Topic>> {
        match self.engine.repo() {
            Some(repo) => from_storage(repo.list(list_criteria).await),
            None => {
                debug!("no database configured, listing nothing");
                Ok(Vec::new())
            }
        }
    }

    #[instrument(skip_all, name = "service#create")]
    pub async fn create(&self, draft: TopicDraft) -> ServiceResult<TopicId> {
        let repo = self.write_repo()?;
        from_storage(repo.create(draft.into()).await)
    }

    /// Reports success even when `id` matched nothing, the returned count says how many rows changed.
    #[instrument(skip(self, update), name = "service#update")]
    pub async fn update(&self, id: TopicId, update: TopicUpdate) -> ServiceResult<u64> {
        let repo = self.write_repo()?;
        let touched = from_storage(repo.update(id, update).await)?;
        debug!(touched, "topic update applied");
        Ok(touched)
    }

    #[instrument(skip(self), name = "service#delete")]
    pub async fn delete(&self, id: TopicId) -> ServiceResult<u64> {
        let repo = self.write_repo()?;
        let removed = from_storage(repo.delete(id).await)?;
        debug!(removed, "topic delete applied");
        Ok(removed)
    }

    #[instrument(skip_all, name = "service#category_counts")]
    pub async fn category_counts(&self) -> ServiceResult<Vec<CategoryCount>> {
        match self.engine.repo() {
            Some(repo) => from_storage(repo.category_counts().await),
            None => Ok(Vec::new()),
        }
    }

    /// Closes the storage connections, if there are any.
    pub fn close(&self) {
        if let Some(repo) = self.engine.repo() {
            repo.close();
        }
    }
}
