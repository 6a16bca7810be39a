//! The public shared space: search, detail pages and view counting.

use tracing::debug;

use crate::cache::{ResourceKind, Tag, TaggedCache};
use crate::db::{Db, SharedWordList, Tables};
use crate::error::{AppError, Result};
use crate::models::{CommentView, SharedListDetail, SharedListSummary, SharedPage, UserSummary};

#[derive(Clone)]
pub struct SharedWordLists {
    db: Db,
    cache: TaggedCache,
    page_size: usize,
}

/// Case-insensitive match on name or description, plus any-of tag match.
fn matches(list: &SharedWordList, search: Option<&str>, tags: &[String]) -> bool {
    let text = search.map_or(true, |q| {
        let q = q.to_lowercase();
        list.name.to_lowercase().contains(&q)
            || list
                .description
                .as_deref()
                .is_some_and(|d| d.to_lowercase().contains(&q))
    });
    let tagged = tags.is_empty() || list.tags.iter().any(|t| tags.contains(t));
    text && tagged
}

fn find_lists(tables: &Tables, search: Option<&str>, tags: &[String]) -> Vec<SharedWordList> {
    tables
        .shared_lists()
        .into_iter()
        .filter(|list| matches(list, search, tags))
        .collect()
}

fn summarize(tables: &Tables, list: SharedWordList) -> SharedListSummary {
    SharedListSummary {
        owner: tables.user(&list.user_id).map(UserSummary::from),
        view_count: tables.view_count(&list.id),
        comment_count: tables.comment_count(&list.id),
        like_count: tables.like_count(&list.id),
        list,
    }
}

pub(crate) fn comment_views(tables: &Tables, list_id: &str) -> Vec<CommentView> {
    tables
        .comments_for(list_id)
        .into_iter()
        .map(|comment| CommentView {
            author: tables.user(&comment.user_id).map(UserSummary::from),
            comment,
        })
        .collect()
}

impl SharedWordLists {
    pub fn new(db: Db, cache: TaggedCache, page_size: usize) -> Self {
        Self {
            db,
            cache,
            page_size: page_size.max(1),
        }
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    /// One page of shared lists, newest first.
    ///
    /// # Arguments
    /// * `search` - Free text matched against name and description
    /// * `tags` - Lists carrying any of these tags; empty means no filter
    /// * `page` - 1-based page number
    pub async fn shared_word_lists(
        &self,
        search: Option<&str>,
        tags: &[String],
        page: usize,
    ) -> Result<SharedPage> {
        let db = self.db.clone();
        let page = page.max(1);
        let page_size = self.page_size;
        let scope = [Tag::global(ResourceKind::SharedWordLists)];

        self.cache
            .get_or_fetch(
                "shared_word_lists",
                &scope,
                (search, tags, page, page_size),
                |(q, tags, page, page_size)| async move {
                    let tables = db.read().await;
                    let found = find_lists(&tables, q, tags);
                    let total_count = found.len();
                    let lists = found
                        .into_iter()
                        .skip((page - 1).saturating_mul(page_size))
                        .take(page_size)
                        .map(|list| summarize(&tables, list))
                        .collect();
                    Ok(SharedPage {
                        lists,
                        total_count,
                        page,
                        page_size,
                    })
                },
            )
            .await
    }

    /// Total number of lists matching the search, for pagination.
    pub async fn shared_word_lists_pages(&self, search: Option<&str>, tags: &[String]) -> Result<usize> {
        let db = self.db.clone();
        let scope = [Tag::global(ResourceKind::SharedWordLists)];

        self.cache
            .get_or_fetch(
                "shared_word_lists_pages",
                &scope,
                (search, tags),
                |(q, tags)| async move {
                    let tables = db.read().await;
                    Ok(find_lists(&tables, q, tags).len())
                },
            )
            .await
    }

    /// Detail page: the publication, the original list's words and its comments.
    pub async fn shared_word_list(&self, id: &str) -> Result<Option<SharedListDetail>> {
        let db = self.db.clone();
        let scope = [Tag::id(id, ResourceKind::SharedWordLists)];

        self.cache
            .get_or_fetch("shared_word_list", &scope, id, |id| async move {
                let tables = db.read().await;
                Ok(tables.shared(id).cloned().map(|list| SharedListDetail {
                    owner: tables.user(&list.user_id).map(UserSummary::from),
                    words: tables.words_in_list(&list.original_id),
                    comments: comment_views(&tables, &list.id),
                    view_count: tables.view_count(&list.id),
                    comment_count: tables.comment_count(&list.id),
                    like_count: tables.like_count(&list.id),
                    list,
                }))
            })
            .await
    }

    /// Counts one view. Returns the new total.
    pub async fn increment_view_count(&self, id: &str) -> Result<u64> {
        let stats = self.db.write().await.increment_views(id)?;
        self.cache.invalidate_for(&stats).await;
        debug!(shared_id = id, views = stats.view_count, "view counted");
        Ok(stats.view_count)
    }

    /// Fails with `NotFound` unless the shared list exists.
    pub async fn ensure_exists(&self, id: &str) -> Result<()> {
        match self.db.read().await.shared(id) {
            Some(_) => Ok(()),
            None => Err(AppError::NotFound("shared word list".into())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::WordInput;

    struct Fixture {
        shared: SharedWordLists,
        cache: TaggedCache,
        db: Db,
        user: String,
        list: String,
    }

    async fn setup(page_size: usize) -> Fixture {
        let db = Db::new();
        let cache = TaggedCache::new(100, None);
        let (user, list) = {
            let mut tables = db.write().await;
            let user = tables.link_account("kakao", "1", "minji", None);
            let list = tables.insert_word_list(&user.id, "TOEIC", None).unwrap();
            (user.id, list.id)
        };
        Fixture {
            shared: SharedWordLists::new(db.clone(), cache.clone(), page_size),
            cache,
            db,
            user,
            list,
        }
    }

    async fn publish(f: &Fixture, name: &str, description: Option<&str>, tags: &[&str]) -> SharedWordList {
        let tags: Vec<String> = tags.iter().map(|t| t.to_string()).collect();
        let shared = f
            .db
            .write()
            .await
            .insert_shared(&f.user, &f.list, name, description, &tags)
            .unwrap();
        f.cache.invalidate_for(&shared).await;
        shared
    }

    #[tokio::test]
    async fn test_search_by_text_and_tags() {
        let f = setup(12).await;
        publish(&f, "TOEIC 900", Some("exam words"), &["exam"]).await;
        publish(&f, "Daily talk", Some("Useful EXAM phrases"), &["daily"]).await;
        publish(&f, "Travel", None, &["daily", "travel"]).await;

        let all = f.shared.shared_word_lists(None, &[], 1).await.unwrap();
        assert_eq!(all.total_count, 3);
        // newest first
        assert_eq!(all.lists[0].list.name, "Travel");

        let by_text = f.shared.shared_word_lists(Some("exam"), &[], 1).await.unwrap();
        assert_eq!(by_text.total_count, 2);

        let by_tag = f
            .shared
            .shared_word_lists(None, &["travel".to_string(), "exam".to_string()], 1)
            .await
            .unwrap();
        assert_eq!(by_tag.total_count, 2);
    }

    #[tokio::test]
    async fn test_pagination() {
        let f = setup(2).await;
        for i in 0..5 {
            publish(&f, &format!("list {}", i), None, &[]).await;
        }

        let page = f.shared.shared_word_lists(None, &[], 3).await.unwrap();
        assert_eq!(page.lists.len(), 1);
        assert_eq!(page.total_count, 5);
        assert_eq!(page.page_size, 2);
        assert_eq!(f.shared.shared_word_lists_pages(None, &[]).await.unwrap(), 5);

        let past_end = f.shared.shared_word_lists(None, &[], 9).await.unwrap();
        assert!(past_end.lists.is_empty());
    }

    #[tokio::test]
    async fn test_huge_page_number_is_empty() {
        let f = setup(12).await;
        publish(&f, "only", None, &[]).await;

        let page = f.shared.shared_word_lists(None, &[], usize::MAX).await.unwrap();
        assert!(page.lists.is_empty());
        assert_eq!(page.total_count, 1);
        assert_eq!(page.page, usize::MAX);
    }

    #[tokio::test]
    async fn test_count_follows_filters() {
        let f = setup(12).await;
        assert_eq!(f.shared.shared_word_lists_pages(None, &[]).await.unwrap(), 0);

        publish(&f, "Verbs", None, &["grammar"]).await;
        publish(&f, "Nouns", None, &[]).await;

        let grammar = vec!["grammar".to_string()];
        assert_eq!(f.shared.shared_word_lists_pages(None, &grammar).await.unwrap(), 1);
        assert_eq!(f.shared.shared_word_lists_pages(Some("NOUN"), &[]).await.unwrap(), 1);
        assert_eq!(f.shared.shared_word_lists_pages(None, &[]).await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_publish_refreshes_cached_search() {
        let f = setup(12).await;
        assert_eq!(f.shared.shared_word_lists(None, &[], 1).await.unwrap().total_count, 0);

        publish(&f, "new", None, &[]).await;

        assert_eq!(f.shared.shared_word_lists(None, &[], 1).await.unwrap().total_count, 1);
    }

    #[tokio::test]
    async fn test_detail_carries_original_words() {
        let f = setup(12).await;
        let input = WordInput {
            english: "apple".into(),
            korean: "사과".into(),
            ..WordInput::default()
        };
        f.db.write().await.insert_word(&f.list, &f.user, &input).unwrap();
        let shared = publish(&f, "fruits", None, &[]).await;

        let detail = f.shared.shared_word_list(&shared.id).await.unwrap().unwrap();
        assert_eq!(detail.words.len(), 1);
        assert_eq!(detail.owner.map(|o| o.name).as_deref(), Some("minji"));
        assert!(f.shared.shared_word_list("missing").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_view_count_refreshes_detail() {
        let f = setup(12).await;
        let shared = publish(&f, "views", None, &[]).await;

        let before = f.shared.shared_word_list(&shared.id).await.unwrap().unwrap();
        assert_eq!(before.view_count, 0);

        assert_eq!(f.shared.increment_view_count(&shared.id).await.unwrap(), 1);
        assert_eq!(f.shared.increment_view_count(&shared.id).await.unwrap(), 2);

        let after = f.shared.shared_word_list(&shared.id).await.unwrap().unwrap();
        assert_eq!(after.view_count, 2);

        let summary = f.shared.shared_word_lists(None, &[], 1).await.unwrap();
        assert_eq!(summary.lists[0].view_count, 2);
    }

    #[tokio::test]
    async fn test_view_count_unknown_list() {
        let f = setup(12).await;
        let result = f.shared.increment_view_count("missing").await;
        assert!(matches!(result, Err(AppError::Db(_))));
        assert!(matches!(
            f.shared.ensure_exists("missing").await,
            Err(AppError::NotFound(_))
        ));
    }
}
