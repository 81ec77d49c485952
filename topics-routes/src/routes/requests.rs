use serde::Deserialize;
use topics_core::list_filter::TopicListCriteria;
use topics_core::model::{Counter, Keywords, TopicDraft, TopicUpdate};
use utoipa::{IntoParams, ToSchema};

#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct TopicSearch {
    /// Substring matched against title, keywords and content, ignoring case.
    pub search: Option<String>,
    /// Exact category. `all` means every category.
    pub category: Option<String>,
    /// Maximum number of topics to return.
    #[param(value_type = Option<i64>)]
    pub limit: Option<String>,
}

impl From<TopicSearch> for TopicListCriteria {
    fn from(search: TopicSearch) -> Self {
        TopicListCriteria::new(search.search, search.category, search.limit)
    }
}

#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct TopicRequest {
    /// Required by storage. A missing title is rejected when the topic is written.
    pub title: Option<String>,
    pub category: Option<String>,
    /// Either a list of keywords or an already comma-joined string.
    pub keywords: Option<Keywords>,
    /// May contain markup, which is stripped from the preview.
    pub content: Option<String>,
    /// Defaults to `Anonymous`.
    pub author: Option<String>,
}

impl From<TopicRequest> for TopicDraft {
    fn from(request: TopicRequest) -> Self {
        Self {
            title: request.title,
            category: request.category,
            keywords: request.keywords,
            content: request.content,
            author: request.author,
        }
    }
}

/// Either bumps one counter or replaces every writable field.
/// `incrementView` wins over `incrementHelpful`, both win over the topic fields.
#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TopicUpdateRequest {
    #[serde(default, alias = "incrementViews")]
    pub increment_view: bool,
    #[serde(default)]
    pub increment_helpful: bool,
    #[serde(flatten)]
    pub topic: TopicRequest,
}

impl From<TopicUpdateRequest> for TopicUpdate {
    fn from(request: TopicUpdateRequest) -> Self {
        if request.increment_view {
            TopicUpdate::Increment(Counter::Views)
        } else if request.increment_helpful {
            TopicUpdate::Increment(Counter::Helpful)
        } else {
            TopicUpdate::Replace(TopicDraft::from(request.topic).into())
        }
    }
}
