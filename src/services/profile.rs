//! The profile page: everything one user owns, each read scoped to that user.

use crate::cache::{ResourceKind, Tag, TaggedCache};
use crate::db::{Db, Like, SharedWordList, WordList};
use crate::error::Result;
use crate::models::{BookmarkView, ProfileResponse};

#[derive(Clone)]
pub struct Profile {
    db: Db,
    cache: TaggedCache,
}

impl Profile {
    pub fn new(db: Db, cache: TaggedCache) -> Self {
        Self { db, cache }
    }

    pub async fn word_lists(&self, user_id: &str) -> Result<Vec<WordList>> {
        let db = self.db.clone();
        let scope = [Tag::user(user_id, ResourceKind::WordLists)];

        self.cache
            .get_or_fetch("profile_word_lists", &scope, user_id, |user_id| async move {
                Ok(db.read().await.word_lists_by_user(user_id))
            })
            .await
    }

    pub async fn shared_word_lists(&self, user_id: &str) -> Result<Vec<SharedWordList>> {
        let db = self.db.clone();
        let scope = [Tag::user(user_id, ResourceKind::SharedWordLists)];

        self.cache
            .get_or_fetch("profile_shared_word_lists", &scope, user_id, |user_id| async move {
                Ok(db.read().await.shared_by_user(user_id))
            })
            .await
    }

    /// Bookmarks joined with the list they point at.
    pub async fn bookmarks(&self, user_id: &str) -> Result<Vec<BookmarkView>> {
        let db = self.db.clone();
        let scope = [Tag::user(user_id, ResourceKind::Bookmarks)];

        self.cache
            .get_or_fetch("profile_bookmarks", &scope, user_id, |user_id| async move {
                let tables = db.read().await;
                Ok(tables
                    .bookmarks_by_user(user_id)
                    .into_iter()
                    .map(|bookmark| BookmarkView {
                        shared_list: tables.shared(&bookmark.list_id).cloned(),
                        bookmark,
                    })
                    .collect())
            })
            .await
    }

    pub async fn likes(&self, user_id: &str) -> Result<Vec<Like>> {
        let db = self.db.clone();
        let scope = [Tag::user(user_id, ResourceKind::Likes)];

        self.cache
            .get_or_fetch("profile_likes", &scope, user_id, |user_id| async move {
                Ok(db.read().await.likes_by_user(user_id))
            })
            .await
    }

    /// All four profile reads.
    pub async fn profile(&self, user_id: &str) -> Result<ProfileResponse> {
        let (word_lists, shared_word_lists, bookmarks, likes) = tokio::try_join!(
            self.word_lists(user_id),
            self.shared_word_lists(user_id),
            self.bookmarks(user_id),
            self.likes(user_id),
        )?;

        Ok(ProfileResponse {
            word_lists,
            shared_word_lists,
            bookmarks,
            likes,
        })
    }
}
