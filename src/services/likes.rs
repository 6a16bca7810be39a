//! Likes on shared lists.

use tracing::info;

use crate::cache::{ResourceKind, Tag, TaggedCache};
use crate::db::{Db, Like};
use crate::error::{AppError, Result};
use crate::models::Toggle;

#[derive(Clone)]
pub struct Likes {
    db: Db,
    cache: TaggedCache,
}

impl Likes {
    pub fn new(db: Db, cache: TaggedCache) -> Self {
        Self { db, cache }
    }

    /// Every like in the system.
    pub async fn likes(&self) -> Result<Vec<Like>> {
        let db = self.db.clone();
        let scope = [Tag::global(ResourceKind::Likes)];

        self.cache
            .get_or_fetch("likes", &scope, (), |()| async move {
                Ok(db.read().await.likes())
            })
            .await
    }

    /// Likes `list_id` if the user has not yet, unlikes it otherwise.
    pub async fn toggle_like(&self, user_id: &str, list_id: &str) -> Result<Toggle> {
        let (like, active) = {
            let mut tables = self.db.write().await;
            let existing = tables.like(user_id, list_id).map(|like| like.id.clone());
            match existing {
                Some(id) => {
                    let like = tables
                        .delete_like(&id)
                        .ok_or_else(|| AppError::NotFound("like".into()))?;
                    (like, false)
                }
                None => (tables.insert_like(user_id, list_id)?, true),
            }
        };

        self.cache.invalidate_for(&like).await;
        info!(list_id, active, "like toggled");

        let message = if active { "Like added" } else { "Like removed" };
        Ok(Toggle {
            active,
            message: message.to_string(),
        })
    }
}
