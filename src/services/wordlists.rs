//! Personal word lists, their words, and publishing them to the shared space.

use tracing::info;

use crate::cache::{ResourceKind, Tag, TaggedCache};
use crate::db::{Db, SharedWordList, Tables, Word, WordList};
use crate::error::{AppError, Result};
use crate::models::{CreateWordListRequest, PublishRequest, WordInput, WordListDetail, WordListSummary};

#[derive(Clone)]
pub struct WordLists {
    db: Db,
    cache: TaggedCache,
}

/// Returns the list if `user_id` owns it.
fn owned_list(tables: &Tables, user_id: &str, list_id: &str) -> Result<WordList> {
    let list = tables
        .word_list(list_id)
        .ok_or_else(|| AppError::NotFound("word list".into()))?;
    if list.user_id != user_id {
        return Err(AppError::Forbidden("word list".into()));
    }
    Ok(list.clone())
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

impl WordLists {
    pub fn new(db: Db, cache: TaggedCache) -> Self {
        Self { db, cache }
    }

    // == Reads ==

    /// Lists owned by `user_id` with their word counts.
    pub async fn word_lists(&self, user_id: &str) -> Result<Vec<WordListSummary>> {
        let db = self.db.clone();
        let tags = [
            Tag::global(ResourceKind::WordLists),
            Tag::user(user_id, ResourceKind::WordLists),
        ];

        self.cache
            .get_or_fetch("word_lists", &tags, user_id, |user_id| async move {
                let tables = db.read().await;
                Ok(tables
                    .word_lists_by_user(user_id)
                    .into_iter()
                    .map(|list| WordListSummary {
                        word_count: tables.word_count(&list.id),
                        list,
                    })
                    .collect())
            })
            .await
    }

    /// One list with its words.
    ///
    /// None if the list does not exist, `Forbidden` if someone else owns it.
    pub async fn word_list(&self, user_id: &str, list_id: &str) -> Result<Option<WordListDetail>> {
        let db = self.db.clone();
        let tags = [Tag::id(list_id, ResourceKind::WordLists)];

        let detail: Option<WordListDetail> = self
            .cache
            .get_or_fetch("word_list", &tags, list_id, |list_id| async move {
                let tables = db.read().await;
                Ok::<_, AppError>(tables.word_list(list_id).cloned().map(|list| WordListDetail {
                    words: tables.words_in_list(&list.id),
                    list,
                }))
            })
            .await?;

        match detail {
            Some(detail) if detail.list.user_id != user_id => {
                Err(AppError::Forbidden("word list".into()))
            }
            detail => Ok(detail),
        }
    }

    // == List Mutations ==

    pub async fn create_word_list(
        &self,
        user_id: &str,
        req: &CreateWordListRequest,
    ) -> Result<WordList> {
        if let Some(msg) = req.validate() {
            return Err(AppError::InvalidRequest(msg));
        }

        let (list, words) = {
            let mut tables = self.db.write().await;
            let list = tables.insert_word_list(
                user_id,
                req.title.trim(),
                non_empty(req.description.as_deref()),
            )?;
            let words = req
                .filled_words()
                .map(|word| tables.insert_word(&list.id, user_id, &word))
                .collect::<std::result::Result<Vec<Word>, _>>()?;
            (list, words)
        };

        self.cache.invalidate_for(&list).await;
        info!(list_id = %list.id, words = words.len(), "word list created");
        Ok(list)
    }

    /// Deletes a list, its words and everything published from it.
    pub async fn delete_word_list(&self, user_id: &str, list_id: &str) -> Result<()> {
        let removed = {
            let mut tables = self.db.write().await;
            owned_list(&tables, user_id, list_id)?;
            tables.delete_word_list(list_id)
        };

        if let Some((list, words, cascade)) = removed {
            self.cache.invalidate_for(&list).await;
            self.cache.invalidate_for(&cascade).await;
            info!(
                list_id = %list.id,
                words = words.len(),
                shared = cascade.shared.len(),
                "word list deleted"
            );
        }
        Ok(())
    }

    // == Word Mutations ==

    pub async fn add_word(&self, user_id: &str, list_id: &str, input: &WordInput) -> Result<Word> {
        if let Some(msg) = input.validate() {
            return Err(AppError::InvalidRequest(msg));
        }

        let (word, published) = {
            let mut tables = self.db.write().await;
            owned_list(&tables, user_id, list_id)?;
            let word = tables.insert_word(list_id, user_id, input)?;
            (word, tables.shared_from(list_id))
        };

        self.after_word_write(&word, &published).await;
        info!(list_id, word_id = %word.id, "word added");
        Ok(word)
    }

    /// Copies a word seen in the shared space into one of the caller's lists.
    pub async fn copy_word(&self, user_id: &str, target_list_id: &str, input: &WordInput) -> Result<Word> {
        self.add_word(user_id, target_list_id, input).await
    }

    pub async fn update_word(
        &self,
        user_id: &str,
        list_id: &str,
        word_id: &str,
        input: &WordInput,
    ) -> Result<Word> {
        if let Some(msg) = input.validate() {
            return Err(AppError::InvalidRequest(msg));
        }

        let (word, published) = {
            let mut tables = self.db.write().await;
            owned_list(&tables, user_id, list_id)?;
            let word = tables
                .update_word(list_id, word_id, input)
                .ok_or_else(|| AppError::NotFound("word".into()))?;
            (word, tables.shared_from(list_id))
        };

        self.after_word_write(&word, &published).await;
        info!(list_id, word_id, "word updated");
        Ok(word)
    }

    pub async fn delete_word(&self, user_id: &str, list_id: &str, word_id: &str) -> Result<()> {
        let (word, published) = {
            let mut tables = self.db.write().await;
            owned_list(&tables, user_id, list_id)?;
            let word = tables
                .delete_word(list_id, word_id)
                .ok_or_else(|| AppError::NotFound("word".into()))?;
            (word, tables.shared_from(list_id))
        };

        self.after_word_write(&word, &published).await;
        info!(list_id, word_id, "word deleted");
        Ok(())
    }

    /// Shared details embed the original list's words.
    async fn after_word_write(&self, word: &Word, published: &[SharedWordList]) {
        self.cache.invalidate_for(word).await;
        self.cache.invalidate_for(published).await;
    }

    // == Publishing ==

    /// Publishes one of the caller's lists to the shared space.
    pub async fn publish(
        &self,
        user_id: &str,
        list_id: &str,
        req: &PublishRequest,
    ) -> Result<SharedWordList> {
        if let Some(msg) = req.validate() {
            return Err(AppError::InvalidRequest(msg));
        }

        let shared = {
            let mut tables = self.db.write().await;
            owned_list(&tables, user_id, list_id)?;
            tables.insert_shared(
                user_id,
                list_id,
                req.name.trim(),
                non_empty(req.description.as_deref()),
                &req.normalized_tags(),
            )?
        };

        self.cache.invalidate_for(&shared).await;
        info!(list_id, shared_id = %shared.id, "word list published");
        Ok(shared)
    }

    /// Removes a publication of the caller's list along with its social rows.
    pub async fn unpublish(&self, user_id: &str, list_id: &str, shared_id: &str) -> Result<()> {
        let cascade = {
            let mut tables = self.db.write().await;
            let shared = tables
                .shared(shared_id)
                .filter(|s| s.original_id == list_id)
                .ok_or_else(|| AppError::NotFound("shared word list".into()))?;
            if shared.user_id != user_id {
                return Err(AppError::Forbidden("shared word list".into()));
            }
            tables
                .delete_shared(shared_id)
                .ok_or_else(|| AppError::NotFound("shared word list".into()))?
        };

        self.cache.invalidate_for(&cascade).await;
        info!(list_id, shared_id, "word list unpublished");
        Ok(())
    }
}
