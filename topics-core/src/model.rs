use crate::transform;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};
use utoipa::ToSchema;

/// Assigned by storage on insert, never reused.
#[derive(Debug, Serialize, Deserialize, ToSchema, PartialEq, Eq, Hash, Clone, Copy)]
#[serde(transparent)]
pub struct TopicId(i32);

impl TopicId {
    pub fn new(id: i32) -> Self {
        Self(id)
    }

    pub fn get(self) -> i32 {
        self.0
    }
}

impl Display for TopicId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

/// A topic as it is exposed by the API.
#[derive(Debug, Serialize, Deserialize, ToSchema, Clone, PartialEq, Eq)]
pub struct Topic {
    pub id: TopicId,
    pub title: String,
    pub category: Option<String>,
    pub keywords: Vec<String>,
    pub content: Option<String>,
    pub preview: String,
    pub author: String,
    /// Creation date, `YYYY-MM-DD`.
    #[schema(value_type = String, format = Date)]
    pub date: NaiveDate,
    pub views: i32,
    pub helpful: i32,
}

/// A topic row as it is persisted. `keywords` is the comma-joined form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredTopic {
    pub id: TopicId,
    pub title: String,
    pub category: Option<String>,
    pub keywords: Option<String>,
    pub content: Option<String>,
    pub preview: Option<String>,
    pub author: Option<String>,
    pub created_date: DateTime<Utc>,
    pub views: i32,
    pub helpful: i32,
}

impl From<StoredTopic> for Topic {
    fn from(row: StoredTopic) -> Self {
        Self {
            id: row.id,
            title: row.title,
            category: row.category,
            keywords: transform::split_keywords(row.keywords.as_deref().unwrap_or_default()),
            content: row.content,
            preview: row.preview.unwrap_or_default(),
            author: row
                .author
                .unwrap_or_else(|| transform::DEFAULT_AUTHOR.to_string()),
            date: row.created_date.date_naive(),
            views: row.views,
            helpful: row.helpful,
        }
    }
}

/// Keywords as a client may submit them.
#[derive(Debug, Deserialize, ToSchema, Clone, PartialEq, Eq)]
#[serde(untagged)]
pub enum Keywords {
    List(Vec<String>),
    Raw(String),
}

/// The caller-supplied fields of a topic, before derived fields are computed.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct TopicDraft {
    pub title: Option<String>,
    pub category: Option<String>,
    pub keywords: Option<Keywords>,
    pub content: Option<String>,
    pub author: Option<String>,
}

/// Every writable column of a topic, ready to be persisted by a create or a full replacement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TopicFields {
    pub title: Option<String>,
    pub category: Option<String>,
    pub keywords: String,
    pub content: Option<String>,
    pub preview: String,
    pub author: String,
}

impl From<TopicDraft> for TopicFields {
    fn from(draft: TopicDraft) -> Self {
        let keywords = transform::join_keywords(draft.keywords);
        let preview = transform::preview(draft.content.as_deref());
        Self {
            title: draft.title,
            category: draft.category,
            keywords,
            content: draft.content,
            preview,
            author: draft
                .author
                .unwrap_or_else(|| transform::DEFAULT_AUTHOR.to_string()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Counter {
    Views,
    Helpful,
}

impl Counter {
    pub fn column(self) -> &'static str {
        match self {
            Counter::Views => "views",
            Counter::Helpful => "helpful",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TopicUpdate {
    Increment(Counter),
    Replace(TopicFields),
}

#[derive(Debug, Serialize, Deserialize, ToSchema, Clone, PartialEq, Eq)]
pub struct CategoryCount {
    pub category: Option<String>,
    pub count: i64,
}

impl CategoryCount {
    pub fn new(category: Option<String>, count: i64) -> Self {
        Self { category, count }
    }
}
