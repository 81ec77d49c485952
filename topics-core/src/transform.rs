//! Derived fields of a topic: the keyword string, the preview and the author placeholder.

use crate::model::Keywords;
use itertools::Itertools;
use regex::Regex;
use std::sync::LazyLock;

pub const DEFAULT_AUTHOR: &str = "Anonymous";

pub const KEYWORD_SEPARATOR: &str = ", ";

pub const PREVIEW_LENGTH: usize = 200;

const PREVIEW_ELLIPSIS: &str = "...";

static MARKUP_TAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<[^>]*>").expect("markup tag pattern is valid"));

/// Keywords are not escaped, so a keyword containing a comma comes back as two keywords.
pub fn join_keywords(keywords: Option<Keywords>) -> String {
    match keywords {
        Some(Keywords::List(list)) => list.iter().join(KEYWORD_SEPARATOR),
        Some(Keywords::Raw(raw)) => raw,
        None => String::new(),
    }
}

pub fn split_keywords(keywords: &str) -> Vec<String> {
    keywords
        .split(',')
        .map(str::trim)
        .filter(|k| !k.is_empty())
        .map(String::from)
        .collect()
}

pub fn strip_markup(content: &str) -> String {
    MARKUP_TAG.replace_all(content, "").into_owned()
}

pub fn preview(content: Option<&str>) -> String {
    match content {
        Some(content) if !content.is_empty() => {
            let mut preview: String = strip_markup(content)
                .chars()
                .take(PREVIEW_LENGTH)
                .collect();
            preview.push_str(PREVIEW_ELLIPSIS);
            preview
        }
        _ => String::new(),
    }
}
