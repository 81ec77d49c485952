/// Category value that means "do not filter by category".
pub const ALL_CATEGORIES: &str = "all";

/// Optional filters for listing topics. Empty strings count as absent.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct TopicListCriteria {
    search: Option<String>,
    category: Option<String>,
    limit: Option<String>,
}

impl TopicListCriteria {
    pub fn new(search: Option<String>, category: Option<String>, limit: Option<String>) -> Self {
        Self {
            search: search.filter(|s| !s.is_empty()),
            category: category.filter(|c| !c.is_empty() && c != ALL_CATEGORIES),
            limit: limit.filter(|l| !l.trim().is_empty()),
        }
    }

    /// Substring to look for in title, keywords and content.
    pub fn search(&self) -> Option<&str> {
        self.search.as_deref()
    }

    /// Exact category to restrict to.
    pub fn category(&self) -> Option<&str> {
        self.category.as_deref()
    }

    /// The raw query value. Storage parses it and rejects anything but a non-negative integer.
    pub fn limit(&self) -> Option<&str> {
        self.limit.as_deref()
    }
}
