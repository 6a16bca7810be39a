//! Read models returned by the services.
//!
//! These are the values the read-through cache memoizes, so all of them are
//! `Clone` and carry everything the caller needs without another lookup.

use serde::Serialize;

use crate::db::{Bookmark, Comment, SharedWordList, User, Word, WordList};

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct UserSummary {
    pub id: String,
    pub name: String,
    pub image: Option<String>,
}

impl From<&User> for UserSummary {
    fn from(user: &User) -> Self {
        Self {
            id: user.id.clone(),
            name: user.name.clone(),
            image: user.image.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WordListSummary {
    #[serde(flatten)]
    pub list: WordList,
    pub word_count: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct WordListDetail {
    #[serde(flatten)]
    pub list: WordList,
    pub words: Vec<Word>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SharedListSummary {
    #[serde(flatten)]
    pub list: SharedWordList,
    pub owner: Option<UserSummary>,
    pub view_count: u64,
    pub comment_count: usize,
    pub like_count: usize,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SharedListDetail {
    #[serde(flatten)]
    pub list: SharedWordList,
    pub owner: Option<UserSummary>,
    pub words: Vec<Word>,
    pub comments: Vec<CommentView>,
    pub view_count: u64,
    pub comment_count: usize,
    pub like_count: usize,
}

/// One page of the shared space.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SharedPage {
    pub lists: Vec<SharedListSummary>,
    pub total_count: usize,
    pub page: usize,
    pub page_size: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct CommentView {
    #[serde(flatten)]
    pub comment: Comment,
    pub author: Option<UserSummary>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BookmarkView {
    #[serde(flatten)]
    pub bookmark: Bookmark,
    pub shared_list: Option<SharedWordList>,
}

/// Outcome of a like or bookmark toggle.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Toggle {
    pub active: bool,
    pub message: String,
}
