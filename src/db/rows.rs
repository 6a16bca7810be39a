//! Stored rows and the resources they belong to.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::cache::{Owned, Resource, ResourceKind};

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub name: String,
    pub image: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Social-login account linked to a user.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Account {
    pub provider: String,
    pub provider_account_id: String,
    pub user_id: String,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct WordList {
    pub id: String,
    pub user_id: String,
    pub name: String,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Word {
    pub id: String,
    pub list_id: String,
    pub user_id: String,
    pub english: String,
    pub korean: String,
    pub pronunciation: Option<String>,
    pub level: Option<String>,
    pub example: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// A word list published to the shared space.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SharedWordList {
    pub id: String,
    pub user_id: String,
    pub original_id: String,
    pub name: String,
    pub description: Option<String>,
    pub tags: Vec<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SharedListStats {
    pub list_id: String,
    pub view_count: u64,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    pub id: String,
    pub list_id: String,
    pub user_id: String,
    pub content: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Like {
    pub id: String,
    pub user_id: String,
    pub list_id: String,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Bookmark {
    pub id: String,
    pub user_id: String,
    pub list_id: String,
}

/// Rows removed together with a shared list.
#[derive(Debug, Clone, Default)]
pub struct SharedCascade {
    pub shared: Vec<SharedWordList>,
    pub stats: Vec<SharedListStats>,
    pub comments: Vec<Comment>,
    pub likes: Vec<Like>,
    pub bookmarks: Vec<Bookmark>,
}

impl SharedCascade {
    pub fn extend(&mut self, other: SharedCascade) {
        self.shared.extend(other.shared);
        self.stats.extend(other.stats);
        self.comments.extend(other.comments);
        self.likes.extend(other.likes);
        self.bookmarks.extend(other.bookmarks);
    }
}

// == Ownership ==

fn shared_list(id: &str) -> Resource {
    Resource::new(ResourceKind::SharedWordLists).with_id(id)
}

impl Owned for WordList {
    fn resources(&self) -> Vec<Resource> {
        vec![Resource::new(ResourceKind::WordLists)
            .owned_by(&self.user_id)
            .with_id(&self.id)]
    }
}

impl Owned for Word {
    fn resources(&self) -> Vec<Resource> {
        vec![Resource::new(ResourceKind::WordLists)
            .owned_by(&self.user_id)
            .with_id(&self.list_id)]
    }
}

impl Owned for SharedWordList {
    fn resources(&self) -> Vec<Resource> {
        vec![Resource::new(ResourceKind::SharedWordLists)
            .owned_by(&self.user_id)
            .with_id(&self.id)]
    }
}

impl Owned for SharedListStats {
    fn resources(&self) -> Vec<Resource> {
        vec![shared_list(&self.list_id)]
    }
}

impl Owned for Comment {
    fn resources(&self) -> Vec<Resource> {
        vec![
            Resource::new(ResourceKind::Comments)
                .owned_by(&self.user_id)
                .with_id(&self.list_id),
            shared_list(&self.list_id),
        ]
    }
}

impl Owned for Like {
    fn resources(&self) -> Vec<Resource> {
        vec![
            Resource::new(ResourceKind::Likes)
                .owned_by(&self.user_id)
                .with_id(&self.list_id),
            shared_list(&self.list_id),
        ]
    }
}

impl Owned for Bookmark {
    fn resources(&self) -> Vec<Resource> {
        vec![Resource::new(ResourceKind::Bookmarks)
            .owned_by(&self.user_id)
            .with_id(&self.list_id)]
    }
}

impl Owned for SharedCascade {
    fn resources(&self) -> Vec<Resource> {
        let mut resources = self.shared.resources();
        resources.extend(self.stats.resources());
        resources.extend(self.comments.resources());
        resources.extend(self.likes.resources());
        resources.extend(self.bookmarks.resources());
        resources
    }
}
