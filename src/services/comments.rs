//! Comments on shared lists.

use tracing::info;

use crate::cache::{ResourceKind, Tag, TaggedCache};
use crate::db::{Comment, Db};
use crate::error::{AppError, Result};
use crate::models::{CommentRequest, CommentView};
use crate::services::shared::comment_views;

#[derive(Clone)]
pub struct Comments {
    db: Db,
    cache: TaggedCache,
}

impl Comments {
    pub fn new(db: Db, cache: TaggedCache) -> Self {
        Self { db, cache }
    }

    /// Comments on a shared list, newest first.
    pub async fn comments(&self, list_id: &str) -> Result<Vec<CommentView>> {
        let db = self.db.clone();
        let scope = [Tag::id(list_id, ResourceKind::Comments)];

        self.cache
            .get_or_fetch("comments", &scope, list_id, |list_id| async move {
                let tables = db.read().await;
                Ok(comment_views(&tables, list_id))
            })
            .await
    }

    pub async fn create_comment(
        &self,
        user_id: &str,
        list_id: &str,
        req: &CommentRequest,
    ) -> Result<Comment> {
        if let Some(msg) = req.validate() {
            return Err(AppError::InvalidRequest(msg));
        }

        let comment = self
            .db
            .write()
            .await
            .insert_comment(list_id, user_id, req.content.trim())?;

        self.cache.invalidate_for(&comment).await;
        info!(list_id, comment_id = %comment.id, "comment created");
        Ok(comment)
    }

    /// Edits a comment. Someone else's comment is reported as missing.
    pub async fn update_comment(
        &self,
        user_id: &str,
        comment_id: &str,
        req: &CommentRequest,
    ) -> Result<Comment> {
        if let Some(msg) = req.validate() {
            return Err(AppError::InvalidRequest(msg));
        }

        let comment = self
            .db
            .write()
            .await
            .update_comment(comment_id, user_id, req.content.trim())
            .ok_or_else(|| AppError::NotFound("comment".into()))?;

        self.cache.invalidate_for(&comment).await;
        info!(comment_id, "comment updated");
        Ok(comment)
    }

    pub async fn delete_comment(&self, user_id: &str, comment_id: &str) -> Result<()> {
        let comment = self
            .db
            .write()
            .await
            .delete_comment(comment_id, user_id)
            .ok_or_else(|| AppError::NotFound("comment".into()))?;

        self.cache.invalidate_for(&comment).await;
        info!(comment_id, "comment deleted");
        Ok(())
    }
}
