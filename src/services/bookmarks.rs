//! Per-user bookmarks of shared lists.

use tracing::info;

use crate::cache::{ResourceKind, Tag, TaggedCache};
use crate::db::{Bookmark, Db};
use crate::error::{AppError, Result};
use crate::models::Toggle;

#[derive(Clone)]
pub struct Bookmarks {
    db: Db,
    cache: TaggedCache,
}

impl Bookmarks {
    pub fn new(db: Db, cache: TaggedCache) -> Self {
        Self { db, cache }
    }

    pub async fn bookmarks(&self, user_id: &str) -> Result<Vec<Bookmark>> {
        let db = self.db.clone();
        let scope = [Tag::user(user_id, ResourceKind::Bookmarks)];

        self.cache
            .get_or_fetch("bookmarks", &scope, user_id, |user_id| async move {
                Ok(db.read().await.bookmarks_by_user(user_id))
            })
            .await
    }

    /// Bookmarks `list_id` if not yet bookmarked, removes the bookmark otherwise.
    pub async fn toggle_bookmark(&self, user_id: &str, list_id: &str) -> Result<Toggle> {
        let (bookmark, active) = {
            let mut tables = self.db.write().await;
            let existing = tables.bookmark(user_id, list_id).map(|b| b.id.clone());
            match existing {
                Some(id) => {
                    let bookmark = tables
                        .delete_bookmark(&id)
                        .ok_or_else(|| AppError::NotFound("bookmark".into()))?;
                    (bookmark, false)
                }
                None => (tables.insert_bookmark(user_id, list_id)?, true),
            }
        };

        self.cache.invalidate_for(&bookmark).await;
        info!(list_id, active, "bookmark toggled");

        let message = if active {
            "Bookmark added"
        } else {
            "Bookmark removed"
        };
        Ok(Toggle {
            active,
            message: message.to_string(),
        })
    }
}
