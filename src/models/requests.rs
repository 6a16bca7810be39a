//! Request DTOs for the wordbook API
//!
//! Defines the structure of incoming HTTP request bodies and query strings.

use serde::{Deserialize, Serialize};

/// Maximum comment length in characters
pub const MAX_COMMENT_LENGTH: usize = 500;

fn blank(value: &str) -> bool {
    value.trim().is_empty()
}

/// Body for POST /api/accounts, sent by the login layer after OAuth.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LinkAccountRequest {
    pub provider: String,
    pub provider_account_id: String,
    pub name: String,
    #[serde(default)]
    pub image: Option<String>,
}

impl LinkAccountRequest {
    /// Returns an error message if validation fails, None if valid.
    pub fn validate(&self) -> Option<String> {
        if blank(&self.provider) || blank(&self.provider_account_id) {
            return Some("Provider and account id are required".to_string());
        }
        None
    }
}

/// A word typed into the list creation form.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DraftWord {
    #[serde(default)]
    pub english: String,
    #[serde(default)]
    pub korean: String,
    #[serde(default)]
    pub example: String,
}

/// Body for POST /api/wordlists
#[derive(Debug, Clone, Deserialize)]
pub struct CreateWordListRequest {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub words: Vec<DraftWord>,
}

impl CreateWordListRequest {
    pub fn validate(&self) -> Option<String> {
        if blank(&self.title) {
            return Some("Word list title is required".to_string());
        }
        None
    }

    /// Draft rows that carry at least a headword or a meaning.
    pub fn filled_words(&self) -> impl Iterator<Item = WordInput> + '_ {
        self.words
            .iter()
            .filter(|w| !blank(&w.english) || !blank(&w.korean))
            .map(|w| WordInput {
                english: w.english.clone(),
                korean: w.korean.clone(),
                pronunciation: None,
                level: None,
                example: (!blank(&w.example)).then(|| w.example.clone()),
            })
    }
}

/// Body for adding, updating or copying a word.
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq)]
pub struct WordInput {
    pub english: String,
    pub korean: String,
    #[serde(default)]
    pub pronunciation: Option<String>,
    #[serde(default)]
    pub level: Option<String>,
    #[serde(default)]
    pub example: Option<String>,
}

impl WordInput {
    pub fn validate(&self) -> Option<String> {
        if blank(&self.english) {
            return Some("English word is required".to_string());
        }
        if blank(&self.korean) {
            return Some("Korean meaning is required".to_string());
        }
        None
    }
}

/// Body for POST /api/wordlists/:id/share
#[derive(Debug, Clone, Deserialize)]
pub struct PublishRequest {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
}

impl PublishRequest {
    pub fn validate(&self) -> Option<String> {
        if blank(&self.name) {
            return Some("Shared list name is required".to_string());
        }
        if self.tags.iter().any(|t| blank(t)) {
            return Some("Tags cannot be empty".to_string());
        }
        None
    }

    /// Trimmed tags without duplicates, in the order given.
    pub fn normalized_tags(&self) -> Vec<String> {
        let mut tags: Vec<String> = Vec::new();
        for tag in self.tags.iter().map(|t| t.trim().to_string()) {
            if !tags.contains(&tag) {
                tags.push(tag);
            }
        }
        tags
    }
}

/// Body for creating or editing a comment.
#[derive(Debug, Clone, Deserialize)]
pub struct CommentRequest {
    pub content: String,
}

impl CommentRequest {
    pub fn validate(&self) -> Option<String> {
        if blank(&self.content) {
            return Some("Comment cannot be empty".to_string());
        }
        if self.content.chars().count() > MAX_COMMENT_LENGTH {
            return Some(format!(
                "Comment cannot exceed {} characters",
                MAX_COMMENT_LENGTH
            ));
        }
        None
    }
}

/// Query string for GET /api/shared
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SharedQuery {
    #[serde(default)]
    pub q: Option<String>,
    /// Comma separated tag filter
    #[serde(default)]
    pub tags: Option<String>,
    #[serde(default)]
    pub page: Option<usize>,
    #[serde(default)]
    pub bookmarks_only: Option<bool>,
}

impl SharedQuery {
    pub fn search(&self) -> Option<String> {
        self.q
            .as_deref()
            .map(str::trim)
            .filter(|q| !q.is_empty())
            .map(str::to_string)
    }

    pub fn selected_tags(&self) -> Vec<String> {
        self.tags
            .as_deref()
            .map(|tags| {
                tags.split(',')
                    .map(str::trim)
                    .filter(|t| !t.is_empty())
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default()
    }

    /// 1-based page, anything below 1 is treated as the first page.
    pub fn page(&self) -> usize {
        self.page.unwrap_or(1).max(1)
    }
}

/// Body for POST /cache/invalidate
#[derive(Debug, Clone, Deserialize)]
pub struct InvalidateRequest {
    pub tag: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_word_list_deserialize_defaults() {
        let json = r#"{"title": "TOEIC"}"#;
        let req: CreateWordListRequest = serde_json::from_str(json).unwrap();
        assert_eq!(req.title, "TOEIC");
        assert!(req.description.is_none());
        assert!(req.words.is_empty());
        assert!(req.validate().is_none());
    }

    #[test]
    fn test_create_word_list_blank_title() {
        let req: CreateWordListRequest = serde_json::from_str(r#"{"title": "  "}"#).unwrap();
        assert!(req.validate().is_some());
    }

    #[test]
    fn test_filled_words_skips_empty_rows() {
        let json = r#"{
            "title": "t",
            "words": [
                {"english": "apple", "korean": "사과"},
                {"english": "", "korean": ""},
                {"english": "pear", "example": "a ripe pear"}
            ]
        }"#;
        let req: CreateWordListRequest = serde_json::from_str(json).unwrap();
        let words: Vec<WordInput> = req.filled_words().collect();

        assert_eq!(words.len(), 2);
        assert_eq!(words[0].example, None);
        assert_eq!(words[1].example.as_deref(), Some("a ripe pear"));
    }

    #[test]
    fn test_word_input_validation() {
        let mut word = WordInput {
            english: "apple".into(),
            korean: "사과".into(),
            ..WordInput::default()
        };
        assert!(word.validate().is_none());

        word.korean = " ".into();
        assert!(word.validate().is_some());
    }

    #[test]
    fn test_comment_length_limit() {
        let ok = CommentRequest {
            content: "가".repeat(MAX_COMMENT_LENGTH),
        };
        assert!(ok.validate().is_none());

        let too_long = CommentRequest {
            content: "가".repeat(MAX_COMMENT_LENGTH + 1),
        };
        assert!(too_long.validate().is_some());

        let empty = CommentRequest {
            content: String::new(),
        };
        assert!(empty.validate().is_some());
    }

    #[test]
    fn test_publish_tags_normalized() {
        let req = PublishRequest {
            name: "TOEIC".into(),
            description: None,
            tags: vec![" exam".into(), "exam".into(), "daily".into()],
        };
        assert!(req.validate().is_none());
        assert_eq!(req.normalized_tags(), vec!["exam", "daily"]);
    }

    #[test]
    fn test_shared_query_parsing() {
        let query = SharedQuery {
            q: Some("  ".into()),
            tags: Some("exam, ,daily".into()),
            page: Some(0),
            bookmarks_only: None,
        };
        assert_eq!(query.search(), None);
        assert_eq!(query.selected_tags(), vec!["exam", "daily"]);
        assert_eq!(query.page(), 1);
    }
}
