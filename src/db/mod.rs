//! In-process relational store
//!
//! Tables for users, word lists, shared lists and their social rows, behind an
//! async RwLock. Reads and writes go through `Db::read` / `Db::write`; the
//! service layer decides what is cached and what is invalidated.

mod rows;

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use tokio::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use uuid::Uuid;

use crate::error::DbError;
use crate::models::WordInput;

pub use rows::{
    Account, Bookmark, Comment, Like, SharedCascade, SharedListStats, SharedWordList, User, Word,
    WordList,
};

// == Db Handle ==
/// Shared handle to the tables.
#[derive(Clone, Default)]
pub struct Db {
    tables: Arc<RwLock<Tables>>,
}

impl Db {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn read(&self) -> RwLockReadGuard<'_, Tables> {
        self.tables.read().await
    }

    pub async fn write(&self) -> RwLockWriteGuard<'_, Tables> {
        self.tables.write().await
    }
}

fn new_id() -> String {
    Uuid::new_v4().to_string()
}

fn newest_first<T>(rows: &mut [T], created_at: impl Fn(&T) -> DateTime<Utc>) {
    rows.sort_by_key(|row| std::cmp::Reverse(created_at(row)));
}

// == Tables ==
#[derive(Debug)]
pub struct Tables {
    users: HashMap<String, User>,
    accounts: Vec<Account>,
    word_lists: HashMap<String, WordList>,
    words: HashMap<String, Word>,
    shared: HashMap<String, SharedWordList>,
    stats: HashMap<String, SharedListStats>,
    comments: HashMap<String, Comment>,
    likes: HashMap<String, Like>,
    bookmarks: HashMap<String, Bookmark>,
    /// Last timestamp handed out, keeps creation order strict
    clock: DateTime<Utc>,
}

impl Default for Tables {
    fn default() -> Self {
        Self {
            users: HashMap::new(),
            accounts: Vec::new(),
            word_lists: HashMap::new(),
            words: HashMap::new(),
            shared: HashMap::new(),
            stats: HashMap::new(),
            comments: HashMap::new(),
            likes: HashMap::new(),
            bookmarks: HashMap::new(),
            clock: DateTime::<Utc>::MIN_UTC,
        }
    }
}

impl Tables {
    fn now(&mut self) -> DateTime<Utc> {
        let now = Utc::now();
        self.clock = if now > self.clock {
            now
        } else {
            self.clock + Duration::microseconds(1)
        };
        self.clock
    }

    // == Users & Accounts ==

    /// Returns the user behind a provider account, creating both on first sight.
    pub fn link_account(
        &mut self,
        provider: &str,
        provider_account_id: &str,
        name: &str,
        image: Option<&str>,
    ) -> User {
        let existing = self
            .accounts
            .iter()
            .find(|a| a.provider == provider && a.provider_account_id == provider_account_id)
            .and_then(|a| self.users.get(&a.user_id));
        if let Some(user) = existing {
            return user.clone();
        }

        let user = User {
            id: new_id(),
            name: name.to_string(),
            image: image.map(str::to_string),
            created_at: self.now(),
        };
        self.accounts.push(Account {
            provider: provider.to_string(),
            provider_account_id: provider_account_id.to_string(),
            user_id: user.id.clone(),
        });
        self.users.insert(user.id.clone(), user.clone());
        user
    }

    /// Resolves a provider account id to the internal user id.
    pub fn user_id_for_account(&self, provider_account_id: &str) -> Option<String> {
        self.accounts
            .iter()
            .find(|a| a.provider_account_id == provider_account_id)
            .map(|a| a.user_id.clone())
    }

    pub fn user(&self, id: &str) -> Option<&User> {
        self.users.get(id)
    }

    // == Word Lists ==

    pub fn insert_word_list(
        &mut self,
        user_id: &str,
        name: &str,
        description: Option<&str>,
    ) -> Result<WordList, DbError> {
        if !self.users.contains_key(user_id) {
            return Err(DbError::MissingReference("user".into()));
        }

        let list = WordList {
            id: new_id(),
            user_id: user_id.to_string(),
            name: name.to_string(),
            description: description.map(str::to_string),
            created_at: self.now(),
        };
        self.word_lists.insert(list.id.clone(), list.clone());
        Ok(list)
    }

    pub fn word_list(&self, id: &str) -> Option<&WordList> {
        self.word_lists.get(id)
    }

    /// Lists owned by `user_id`, oldest first.
    pub fn word_lists_by_user(&self, user_id: &str) -> Vec<WordList> {
        let mut lists: Vec<WordList> = self
            .word_lists
            .values()
            .filter(|l| l.user_id == user_id)
            .cloned()
            .collect();
        lists.sort_by_key(|l| l.created_at);
        lists
    }

    /// Deletes a list with its words and every shared list published from it.
    pub fn delete_word_list(&mut self, id: &str) -> Option<(WordList, Vec<Word>, SharedCascade)> {
        let list = self.word_lists.remove(id)?;

        let word_ids: Vec<String> = self
            .words
            .values()
            .filter(|w| w.list_id == id)
            .map(|w| w.id.clone())
            .collect();
        let words = word_ids
            .iter()
            .filter_map(|word_id| self.words.remove(word_id))
            .collect();

        let mut cascade = SharedCascade::default();
        for shared in self.shared_from(id) {
            if let Some(removed) = self.delete_shared(&shared.id) {
                cascade.extend(removed);
            }
        }

        Some((list, words, cascade))
    }

    // == Words ==

    pub fn insert_word(
        &mut self,
        list_id: &str,
        user_id: &str,
        fields: &WordInput,
    ) -> Result<Word, DbError> {
        if !self.word_lists.contains_key(list_id) {
            return Err(DbError::MissingReference("word list".into()));
        }

        let word = Word {
            id: new_id(),
            list_id: list_id.to_string(),
            user_id: user_id.to_string(),
            english: fields.english.trim().to_string(),
            korean: fields.korean.trim().to_string(),
            pronunciation: fields.pronunciation.clone(),
            level: fields.level.clone(),
            example: fields.example.clone(),
            created_at: self.now(),
        };
        self.words.insert(word.id.clone(), word.clone());
        Ok(word)
    }

    pub fn update_word(&mut self, list_id: &str, word_id: &str, fields: &WordInput) -> Option<Word> {
        let word = self
            .words
            .get_mut(word_id)
            .filter(|w| w.list_id == list_id)?;
        word.english = fields.english.trim().to_string();
        word.korean = fields.korean.trim().to_string();
        word.pronunciation = fields.pronunciation.clone();
        word.level = fields.level.clone();
        word.example = fields.example.clone();
        Some(word.clone())
    }

    pub fn delete_word(&mut self, list_id: &str, word_id: &str) -> Option<Word> {
        if self.words.get(word_id)?.list_id != list_id {
            return None;
        }
        self.words.remove(word_id)
    }

    /// Words of a list in insertion order.
    pub fn words_in_list(&self, list_id: &str) -> Vec<Word> {
        let mut words: Vec<Word> = self
            .words
            .values()
            .filter(|w| w.list_id == list_id)
            .cloned()
            .collect();
        words.sort_by_key(|w| w.created_at);
        words
    }

    pub fn word_count(&self, list_id: &str) -> usize {
        self.words.values().filter(|w| w.list_id == list_id).count()
    }

    // == Shared Word Lists ==

    pub fn insert_shared(
        &mut self,
        user_id: &str,
        original_id: &str,
        name: &str,
        description: Option<&str>,
        tags: &[String],
    ) -> Result<SharedWordList, DbError> {
        if !self.word_lists.contains_key(original_id) {
            return Err(DbError::MissingReference("word list".into()));
        }

        let shared = SharedWordList {
            id: new_id(),
            user_id: user_id.to_string(),
            original_id: original_id.to_string(),
            name: name.to_string(),
            description: description.map(str::to_string),
            tags: tags.to_vec(),
            created_at: self.now(),
        };
        self.shared.insert(shared.id.clone(), shared.clone());
        Ok(shared)
    }

    pub fn shared(&self, id: &str) -> Option<&SharedWordList> {
        self.shared.get(id)
    }

    /// Every shared list, newest first.
    pub fn shared_lists(&self) -> Vec<SharedWordList> {
        let mut lists: Vec<SharedWordList> = self.shared.values().cloned().collect();
        newest_first(&mut lists, |l| l.created_at);
        lists
    }

    pub fn shared_by_user(&self, user_id: &str) -> Vec<SharedWordList> {
        let mut lists: Vec<SharedWordList> = self
            .shared
            .values()
            .filter(|l| l.user_id == user_id)
            .cloned()
            .collect();
        newest_first(&mut lists, |l| l.created_at);
        lists
    }

    /// Shared lists published from word list `original_id`.
    pub fn shared_from(&self, original_id: &str) -> Vec<SharedWordList> {
        self.shared
            .values()
            .filter(|l| l.original_id == original_id)
            .cloned()
            .collect()
    }

    /// Deletes a shared list with its stats, comments, likes and bookmarks.
    pub fn delete_shared(&mut self, id: &str) -> Option<SharedCascade> {
        let shared = self.shared.remove(id)?;

        let mut cascade = SharedCascade {
            shared: vec![shared],
            ..SharedCascade::default()
        };
        cascade.stats.extend(self.stats.remove(id));
        self.comments.retain(|_, c| {
            let keep = c.list_id != id;
            if !keep {
                cascade.comments.push(c.clone());
            }
            keep
        });
        self.likes.retain(|_, l| {
            let keep = l.list_id != id;
            if !keep {
                cascade.likes.push(l.clone());
            }
            keep
        });
        self.bookmarks.retain(|_, b| {
            let keep = b.list_id != id;
            if !keep {
                cascade.bookmarks.push(b.clone());
            }
            keep
        });

        Some(cascade)
    }

    // == View Stats ==

    /// Upserts the stats row and adds one view.
    pub fn increment_views(&mut self, list_id: &str) -> Result<SharedListStats, DbError> {
        if !self.shared.contains_key(list_id) {
            return Err(DbError::MissingReference("shared word list".into()));
        }

        let stats = self
            .stats
            .entry(list_id.to_string())
            .or_insert_with(|| SharedListStats {
                list_id: list_id.to_string(),
                view_count: 0,
            });
        stats.view_count += 1;
        Ok(stats.clone())
    }

    pub fn view_count(&self, list_id: &str) -> u64 {
        self.stats.get(list_id).map_or(0, |s| s.view_count)
    }

    // == Comments ==

    pub fn insert_comment(
        &mut self,
        list_id: &str,
        user_id: &str,
        content: &str,
    ) -> Result<Comment, DbError> {
        if !self.shared.contains_key(list_id) {
            return Err(DbError::MissingReference("shared word list".into()));
        }

        let now = self.now();
        let comment = Comment {
            id: new_id(),
            list_id: list_id.to_string(),
            user_id: user_id.to_string(),
            content: content.to_string(),
            created_at: now,
            updated_at: now,
        };
        self.comments.insert(comment.id.clone(), comment.clone());
        Ok(comment)
    }

    /// Comments on a shared list, newest first.
    pub fn comments_for(&self, list_id: &str) -> Vec<Comment> {
        let mut comments: Vec<Comment> = self
            .comments
            .values()
            .filter(|c| c.list_id == list_id)
            .cloned()
            .collect();
        newest_first(&mut comments, |c| c.created_at);
        comments
    }

    /// Updates a comment if `user_id` wrote it.
    pub fn update_comment(&mut self, id: &str, user_id: &str, content: &str) -> Option<Comment> {
        let now = self.now();
        let comment = self.comments.get_mut(id).filter(|c| c.user_id == user_id)?;
        comment.content = content.to_string();
        comment.updated_at = now;
        Some(comment.clone())
    }

    /// Deletes a comment if `user_id` wrote it.
    pub fn delete_comment(&mut self, id: &str, user_id: &str) -> Option<Comment> {
        if self.comments.get(id)?.user_id != user_id {
            return None;
        }
        self.comments.remove(id)
    }

    pub fn comment_count(&self, list_id: &str) -> usize {
        self.comments.values().filter(|c| c.list_id == list_id).count()
    }

    // == Likes ==

    pub fn like(&self, user_id: &str, list_id: &str) -> Option<&Like> {
        self.likes
            .values()
            .find(|l| l.user_id == user_id && l.list_id == list_id)
    }

    pub fn insert_like(&mut self, user_id: &str, list_id: &str) -> Result<Like, DbError> {
        if !self.shared.contains_key(list_id) {
            return Err(DbError::MissingReference("shared word list".into()));
        }
        if self.like(user_id, list_id).is_some() {
            return Err(DbError::Duplicate("like".into()));
        }

        let like = Like {
            id: new_id(),
            user_id: user_id.to_string(),
            list_id: list_id.to_string(),
        };
        self.likes.insert(like.id.clone(), like.clone());
        Ok(like)
    }

    pub fn delete_like(&mut self, id: &str) -> Option<Like> {
        self.likes.remove(id)
    }

    pub fn likes(&self) -> Vec<Like> {
        self.likes.values().cloned().collect()
    }

    pub fn likes_by_user(&self, user_id: &str) -> Vec<Like> {
        self.likes
            .values()
            .filter(|l| l.user_id == user_id)
            .cloned()
            .collect()
    }

    pub fn like_count(&self, list_id: &str) -> usize {
        self.likes.values().filter(|l| l.list_id == list_id).count()
    }

    // == Bookmarks ==

    pub fn bookmark(&self, user_id: &str, list_id: &str) -> Option<&Bookmark> {
        self.bookmarks
            .values()
            .find(|b| b.user_id == user_id && b.list_id == list_id)
    }

    pub fn insert_bookmark(&mut self, user_id: &str, list_id: &str) -> Result<Bookmark, DbError> {
        if !self.shared.contains_key(list_id) {
            return Err(DbError::MissingReference("shared word list".into()));
        }
        if self.bookmark(user_id, list_id).is_some() {
            return Err(DbError::Duplicate("bookmark".into()));
        }

        let bookmark = Bookmark {
            id: new_id(),
            user_id: user_id.to_string(),
            list_id: list_id.to_string(),
        };
        self.bookmarks.insert(bookmark.id.clone(), bookmark.clone());
        Ok(bookmark)
    }

    pub fn delete_bookmark(&mut self, id: &str) -> Option<Bookmark> {
        self.bookmarks.remove(id)
    }

    pub fn bookmarks_by_user(&self, user_id: &str) -> Vec<Bookmark> {
        self.bookmarks
            .values()
            .filter(|b| b.user_id == user_id)
            .cloned()
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn word(english: &str, korean: &str) -> WordInput {
        WordInput {
            english: english.to_string(),
            korean: korean.to_string(),
            pronunciation: None,
            level: None,
            example: None,
        }
    }

    fn setup() -> (Tables, User, WordList) {
        let mut tables = Tables::default();
        let user = tables.link_account("kakao", "1001", "minji", None);
        let list = tables.insert_word_list(&user.id, "TOEIC", None).unwrap();
        (tables, user, list)
    }

    #[test]
    fn test_link_account_is_idempotent() {
        let mut tables = Tables::default();
        let first = tables.link_account("kakao", "1001", "minji", None);
        let second = tables.link_account("kakao", "1001", "minji", None);

        assert_eq!(first.id, second.id);
        assert_eq!(tables.user_id_for_account("1001"), Some(first.id));
        assert_eq!(tables.user_id_for_account("nope"), None);
    }

    #[test]
    fn test_word_list_requires_user() {
        let mut tables = Tables::default();
        let result = tables.insert_word_list("ghost", "list", None);
        assert_eq!(result, Err(DbError::MissingReference("user".into())));
    }

    #[test]
    fn test_words_scoped_to_list() {
        let (mut tables, user, list) = setup();
        let other = tables.insert_word_list(&user.id, "Other", None).unwrap();

        let apple = tables.insert_word(&list.id, &user.id, &word("apple", "사과")).unwrap();
        tables.insert_word(&list.id, &user.id, &word("pear", "배")).unwrap();

        assert_eq!(tables.word_count(&list.id), 2);
        assert_eq!(tables.words_in_list(&list.id)[0].english, "apple");
        // word belongs to another list
        assert!(tables.delete_word(&other.id, &apple.id).is_none());
        assert!(tables.update_word(&other.id, &apple.id, &word("x", "y")).is_none());
        assert!(tables.delete_word(&list.id, &apple.id).is_some());
        assert_eq!(tables.word_count(&list.id), 1);
    }

    #[test]
    fn test_delete_word_list_cascades() {
        let (mut tables, user, list) = setup();
        let reader = tables.link_account("google", "g-7", "junho", None);
        tables.insert_word(&list.id, &user.id, &word("apple", "사과")).unwrap();
        let shared = tables
            .insert_shared(&user.id, &list.id, "TOEIC", None, &["exam".to_string()])
            .unwrap();
        tables.insert_comment(&shared.id, &reader.id, "thanks").unwrap();
        tables.insert_like(&reader.id, &shared.id).unwrap();
        tables.insert_bookmark(&reader.id, &shared.id).unwrap();
        tables.increment_views(&shared.id).unwrap();

        let (removed, words, cascade) = tables.delete_word_list(&list.id).unwrap();

        assert_eq!(removed.id, list.id);
        assert_eq!(words.len(), 1);
        assert_eq!(cascade.shared.len(), 1);
        assert_eq!(cascade.stats.len(), 1);
        assert_eq!(cascade.comments.len(), 1);
        assert_eq!(cascade.likes.len(), 1);
        assert_eq!(cascade.bookmarks.len(), 1);
        assert!(tables.shared_lists().is_empty());
        assert!(tables.bookmarks_by_user(&reader.id).is_empty());
    }

    #[test]
    fn test_like_unique_per_user_and_list() {
        let (mut tables, user, list) = setup();
        let shared = tables.insert_shared(&user.id, &list.id, "s", None, &[]).unwrap();

        tables.insert_like(&user.id, &shared.id).unwrap();
        assert_eq!(
            tables.insert_like(&user.id, &shared.id),
            Err(DbError::Duplicate("like".into()))
        );
        assert_eq!(tables.like_count(&shared.id), 1);
    }

    #[test]
    fn test_comments_newest_first_and_owner_only() {
        let (mut tables, user, list) = setup();
        let other = tables.link_account("google", "g-1", "other", None);
        let shared = tables.insert_shared(&user.id, &list.id, "s", None, &[]).unwrap();

        let first = tables.insert_comment(&shared.id, &user.id, "first").unwrap();
        tables.insert_comment(&shared.id, &user.id, "second").unwrap();

        let comments = tables.comments_for(&shared.id);
        assert_eq!(comments[0].content, "second");
        assert_eq!(comments[1].content, "first");

        assert!(tables.update_comment(&first.id, &other.id, "hijack").is_none());
        assert!(tables.delete_comment(&first.id, &other.id).is_none());
        let updated = tables.update_comment(&first.id, &user.id, "edited").unwrap();
        assert_eq!(updated.content, "edited");
        assert!(updated.updated_at > updated.created_at);
    }

    #[test]
    fn test_increment_views_upserts() {
        let (mut tables, user, list) = setup();
        let shared = tables.insert_shared(&user.id, &list.id, "s", None, &[]).unwrap();

        assert_eq!(tables.view_count(&shared.id), 0);
        assert_eq!(tables.increment_views(&shared.id).unwrap().view_count, 1);
        assert_eq!(tables.increment_views(&shared.id).unwrap().view_count, 2);
        assert!(tables.increment_views("missing").is_err());
    }
}
