//! All tests in this module are intended to test the contract made by the API,
//! e.g. return codes, bodies, query parameters and the degraded mode without a database.
use chrono::Utc;
use std::sync::{Arc, Mutex, MutexGuard};
use topics_core::list_filter::TopicListCriteria;
use topics_core::model::{
    CategoryCount, Counter, StoredTopic, Topic, TopicFields, TopicId, TopicUpdate,
};
use topics_core::result::{OptRepoResult, RepoOperation, RepoResult, TopicRepoError};
use topics_core::{TopicEngine, TopicRepository};


#[derive(Debug, Clone)]
struct TestEngine {
    repo: Option<MemoryRepo>,
}

impl TestEngine {
    fn with_database(repo: MemoryRepo) -> Self {
        Self { repo: Some(repo) }
    }

    fn without_database() -> Self {
        Self { repo: None }
    }
}

impl TopicEngine for TestEngine {
    type Repo = MemoryRepo;

    fn repo(&self) -> Option<Self::Repo> {
        self.repo.clone()
    }
}

#[derive(Debug, Default)]
struct Table {
    last_id: i32,
    rows: Vec<StoredTopic>,
    closed: bool,
}

/// Behaves like the topics table: serial ids, not-null title, atomic counters.
#[derive(Debug, Clone, Default)]
struct MemoryRepo {
    table: Arc<Mutex<Table>>,
}

impl MemoryRepo {
    fn table(&self, operation: RepoOperation) -> RepoResult<MutexGuard<'_, Table>> {
        let table = self.table.lock().expect("table lock is not poisoned");
        if table.closed {
            return Err(TopicRepoError::new(operation, "pool has been closed").into());
        }
        Ok(table)
    }
}

/// Same rules and messages as postgres casting the limit text to bigint.
fn parse_limit(raw: &str) -> RepoResult<usize> {
    let limit: i64 = raw.trim().parse().map_err(|_| {
        TopicRepoError::new(
            RepoOperation::List,
            format!(r#"invalid input syntax for type bigint: "{raw}""#),
        )
    })?;
    usize::try_from(limit)
        .map_err(|_| TopicRepoError::new(RepoOperation::List, "LIMIT must not be negative").into())
}

fn contains_ignoring_case(haystack: Option<&str>, needle: &str) -> bool {
    haystack.is_some_and(|h| h.to_lowercase().contains(&needle.to_lowercase()))
}

impl TopicRepository for MemoryRepo {
    async fn init_schema(&self) -> RepoResult<()> {
        self.table(RepoOperation::InitSchema).map(|_| ())
    }

    async fn get(&self, id: TopicId) -> OptRepoResult<Topic> {
        let table = self.table(RepoOperation::Get)?;
        Ok(table
            .rows
            .iter()
            .find(|row| row.id == id)
            .cloned()
            .map(Topic::from))
    }

    async fn list(&self, list_criteria: TopicListCriteria) -> RepoResult<Vec<Topic>> {
        let table = self.table(RepoOperation::List)?;

        let limit = match list_criteria.limit() {
            Some(raw) => parse_limit(raw)?,
            None => usize::MAX,
        };

        let mut rows: Vec<_> = table
            .rows
            .iter()
            .filter(|row| {
                list_criteria.search().is_none_or(|search| {
                    contains_ignoring_case(Some(row.title.as_str()), search)
                        || contains_ignoring_case(row.keywords.as_deref(), search)
                        || contains_ignoring_case(row.content.as_deref(), search)
                })
            })
            .filter(|row| {
                list_criteria
                    .category()
                    .is_none_or(|category| row.category.as_deref() == Some(category))
            })
            .cloned()
            .collect();
        rows.sort_by(|a, b| {
            b.created_date
                .cmp(&a.created_date)
                .then_with(|| b.id.get().cmp(&a.id.get()))
        });

        Ok(rows.into_iter().take(limit).map(Topic::from).collect())
    }

    async fn create(&self, new_topic: TopicFields) -> RepoResult<TopicId> {
        let mut table = self.table(RepoOperation::Create)?;
        let Some(title) = new_topic.title else {
            return Err(TopicRepoError::new(
                RepoOperation::Create,
                r#"null value in column "title" of relation "topics" violates not-null constraint"#,
            )
            .into());
        };

        table.last_id += 1;
        let id = TopicId::new(table.last_id);
        table.rows.push(StoredTopic {
            id,
            title,
            category: new_topic.category,
            keywords: Some(new_topic.keywords),
            content: new_topic.content,
            preview: Some(new_topic.preview),
            author: Some(new_topic.author),
            created_date: Utc::now(),
            views: 0,
            helpful: 0,
        });
        Ok(id)
    }

    async fn update(&self, id: TopicId, update: TopicUpdate) -> RepoResult<u64> {
        let mut table = self.table(RepoOperation::Update)?;
        let Some(row) = table.rows.iter_mut().find(|row| row.id == id) else {
            return Ok(0);
        };

        match update {
            TopicUpdate::Increment(Counter::Views) => row.views += 1,
            TopicUpdate::Increment(Counter::Helpful) => row.helpful += 1,
            TopicUpdate::Replace(fields) => {
                let Some(title) = fields.title else {
                    return Err(TopicRepoError::new(
                        RepoOperation::Update,
                        r#"null value in column "title" of relation "topics" violates not-null constraint"#,
                    )
                    .into());
                };
                row.title = title;
                row.category = fields.category;
                row.keywords = Some(fields.keywords);
                row.content = fields.content;
                row.preview = Some(fields.preview);
                row.author = Some(fields.author);
            }
        }
        Ok(1)
    }

    async fn delete(&self, id: TopicId) -> RepoResult<u64> {
        let mut table = self.table(RepoOperation::Delete)?;
        let before = table.rows.len();
        table.rows.retain(|row| row.id != id);
        Ok((before - table.rows.len()) as u64)
    }

    async fn category_counts(&self) -> RepoResult<Vec<CategoryCount>> {
        let table = self.table(RepoOperation::CategoryStats)?;

        let mut counts: Vec<CategoryCount> = Vec::new();
        for row in &table.rows {
            match counts.iter_mut().find(|c| c.category == row.category) {
                Some(count) => count.count += 1,
                None => counts.push(CategoryCount::new(row.category.clone(), 1)),
            }
        }
        counts.sort_by(|a, b| {
            b.count
                .cmp(&a.count)
                .then_with(|| a.category.is_none().cmp(&b.category.is_none()))
                .then_with(|| a.category.cmp(&b.category))
        });
        Ok(counts)
    }

    fn close(&self) {
        if let Ok(mut table) = self.table.lock() {
            table.closed = true;
        }
    }
}
