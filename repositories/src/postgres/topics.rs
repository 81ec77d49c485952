use crate::postgres::StorageResultExt;
use crate::postgres::statements::{self, ListQuery};
use deadpool_postgres::{Object, Pool};
use tokio_postgres::Row;
use topics_core::TopicRepository;
use topics_core::list_filter::TopicListCriteria;
use topics_core::model::{CategoryCount, StoredTopic, Topic, TopicFields, TopicId, TopicUpdate};
use topics_core::result::{OptRepoResult, RepoOperation, RepoResult};
use tracing::debug;

#[derive(Debug, Clone)]
pub struct TopicRepo {
    pool: Pool,
}

impl TopicRepo {
    pub fn new(pool: Pool) -> Self {
        Self { pool }
    }

    async fn client(&self, operation: RepoOperation) -> RepoResult<Object> {
        self.pool.get().await.storage_context(operation)
    }
}

fn row_to_topic(row: Row) -> Topic {
    StoredTopic {
        id: TopicId::new(row.get("id")),
        title: row.get("title"),
        category: row.get("category"),
        keywords: row.get("keywords"),
        content: row.get("content"),
        preview: row.get("preview"),
        author: row.get("author"),
        created_date: row.get("created_date"),
        views: row.get("views"),
        helpful: row.get("helpful"),
    }
    .into()
}

impl TopicRepository for TopicRepo {
    async fn init_schema(&self) -> RepoResult<()> {
        let op = RepoOperation::InitSchema;
        self.client(op)
            .await?
            .batch_execute(statements::CREATE_TABLE)
            .await
            .storage_context(op)
    }

    async fn get(&self, id: TopicId) -> OptRepoResult<Topic> {
        let op = RepoOperation::Get;
        let client = self.client(op).await?;
        let statement = client
            .prepare_cached(statements::GET)
            .await
            .storage_context(op)?;

        let topic = client
            .query_opt(&statement, &[&id.get()])
            .await
            .storage_context(op)?
            .map(row_to_topic);
        Ok(topic)
    }

    async fn list(&self, list_criteria: TopicListCriteria) -> RepoResult<Vec<Topic>> {
        let op = RepoOperation::List;
        let list = ListQuery::build(&list_criteria);
        debug!(query = %list.query, "listing topics");

        let client = self.client(op).await?;
        let statement = client
            .prepare_cached(&list.query)
            .await
            .storage_context(op)?;

        let topics = client
            .query(&statement, &list.params())
            .await
            .storage_context(op)?
            .into_iter()
            .map(row_to_topic)
            .collect();
        Ok(topics)
    }

    async fn create(&self, new_topic: TopicFields) -> RepoResult<TopicId> {
        let op = RepoOperation::Create;
        let client = self.client(op).await?;
        let statement = client
            .prepare_cached(statements::CREATE)
            .await
            .storage_context(op)?;

        let row = client
            .query_one(
                &statement,
                &[
                    &new_topic.title,
                    &new_topic.category,
                    &new_topic.keywords,
                    &new_topic.content,
                    &new_topic.preview,
                    &new_topic.author,
                ],
            )
            .await
            .storage_context(op)?;
        Ok(TopicId::new(row.get("id")))
    }

    async fn update(&self, id: TopicId, update: TopicUpdate) -> RepoResult<u64> {
        let op = RepoOperation::Update;
        let client = self.client(op).await?;

        match update {
            TopicUpdate::Increment(counter) => {
                let statement = client
                    .prepare_cached(statements::increment(counter))
                    .await
                    .storage_context(op)?;
                client
                    .execute(&statement, &[&id.get()])
                    .await
                    .storage_context(op)
            }
            TopicUpdate::Replace(fields) => {
                let statement = client
                    .prepare_cached(statements::REPLACE)
                    .await
                    .storage_context(op)?;
                client
                    .execute(
                        &statement,
                        &[
                            &fields.title,
                            &fields.category,
                            &fields.keywords,
                            &fields.preview,
                            &fields.content,
                            &fields.author,
                            &id.get(),
                        ],
                    )
                    .await
                    .storage_context(op)
            }
        }
    }

    async fn delete(&self, id: TopicId) -> RepoResult<u64> {
        let op = RepoOperation::Delete;
        let client = self.client(op).await?;
        let statement = client
            .prepare_cached(statements::DELETE)
            .await
            .storage_context(op)?;

        client
            .execute(&statement, &[&id.get()])
            .await
            .storage_context(op)
    }

    async fn category_counts(&self) -> RepoResult<Vec<CategoryCount>> {
        let op = RepoOperation::CategoryStats;
        let client = self.client(op).await?;
        let statement = client
            .prepare_cached(statements::CATEGORY_COUNTS)
            .await
            .storage_context(op)?;

        let counts = client
            .query(&statement, &[])
            .await
            .storage_context(op)?
            .into_iter()
            .map(|row| CategoryCount::new(row.get("category"), row.get("count")))
            .collect();
        Ok(counts)
    }

    fn close(&self) {
        debug!("closing connection pool");
        self.pool.close();
    }
}
