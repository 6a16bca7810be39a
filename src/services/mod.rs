//! Domain services
//!
//! Every read goes through the shared [`TaggedCache`]; every write invalidates
//! the resources of the rows it touched.

pub mod accounts;
pub mod bookmarks;
pub mod comments;
pub mod likes;
pub mod profile;
pub mod shared;
pub mod wordlists;

pub use accounts::Accounts;
pub use bookmarks::Bookmarks;
pub use comments::Comments;
pub use likes::Likes;
pub use profile::Profile;
pub use shared::SharedWordLists;
pub use wordlists::WordLists;

use crate::cache::TaggedCache;
use crate::db::Db;

/// All services over one store and one cache.
#[derive(Clone)]
pub struct Services {
    pub accounts: Accounts,
    pub word_lists: WordLists,
    pub shared: SharedWordLists,
    pub comments: Comments,
    pub likes: Likes,
    pub bookmarks: Bookmarks,
    pub profile: Profile,
}

impl Services {
    pub fn new(db: Db, cache: TaggedCache, page_size: usize) -> Self {
        Self {
            accounts: Accounts::new(db.clone()),
            word_lists: WordLists::new(db.clone(), cache.clone()),
            shared: SharedWordLists::new(db.clone(), cache.clone(), page_size),
            comments: Comments::new(db.clone(), cache.clone()),
            likes: Likes::new(db.clone(), cache.clone()),
            bookmarks: Bookmarks::new(db.clone(), cache.clone()),
            profile: Profile::new(db, cache),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{CreateWordListRequest, LinkAccountRequest, PublishRequest, WordInput};

    async fn setup() -> (Services, TaggedCache, String) {
        let cache = TaggedCache::new(1000, None);
        let services = Services::new(Db::new(), cache.clone(), 12);
        let user = services
            .accounts
            .link_account(&LinkAccountRequest {
                provider: "kakao".into(),
                provider_account_id: "u1".into(),
                name: "minji".into(),
                image: None,
            })
            .await
            .unwrap();
        (services, cache, user.id)
    }

    fn create(title: &str) -> CreateWordListRequest {
        CreateWordListRequest {
            title: title.to_string(),
            description: None,
            words: vec![],
        }
    }

    fn publish(name: &str) -> PublishRequest {
        PublishRequest {
            name: name.to_string(),
            description: None,
            tags: vec![],
        }
    }

    #[tokio::test]
    async fn test_created_list_visible_on_next_read() {
        let (services, _, user) = setup().await;

        assert!(services.word_lists.word_lists(&user).await.unwrap().is_empty());
        assert!(services.profile.word_lists(&user).await.unwrap().is_empty());

        services
            .word_lists
            .create_word_list(&user, &create("TOEIC"))
            .await
            .unwrap();

        assert_eq!(services.word_lists.word_lists(&user).await.unwrap().len(), 1);
        assert_eq!(services.profile.word_lists(&user).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_publish_invalidates_detail_and_index_not_bookmarks() {
        let (services, cache, user) = setup().await;
        let list = services
            .word_lists
            .create_word_list(&user, &create("TOEIC"))
            .await
            .unwrap();
        let other = services
            .word_lists
            .create_word_list(&user, &create("Other"))
            .await
            .unwrap();
        let unrelated = services
            .word_lists
            .publish(&user, &other.id, &publish("Unrelated"))
            .await
            .unwrap();

        // warm both shared reads
        assert_eq!(services.shared.shared_word_lists(None, &[], 1).await.unwrap().total_count, 1);
        assert!(services.shared.shared_word_list(&unrelated.id).await.unwrap().is_some());

        // a bookmark toggle leaves both cached
        let hits = cache.stats().await.hits;
        services
            .bookmarks
            .toggle_bookmark(&user, &unrelated.id)
            .await
            .unwrap();
        services.shared.shared_word_lists(None, &[], 1).await.unwrap();
        services.shared.shared_word_list(&unrelated.id).await.unwrap();
        assert_eq!(cache.stats().await.hits, hits + 2);

        // publishing drops both
        let shared = services
            .word_lists
            .publish(&user, &list.id, &publish("TOEIC 900"))
            .await
            .unwrap();
        let misses = cache.stats().await.misses;
        let page = services.shared.shared_word_lists(None, &[], 1).await.unwrap();
        assert_eq!(page.total_count, 2);
        assert!(services.shared.shared_word_list(&shared.id).await.unwrap().is_some());
        assert_eq!(cache.stats().await.misses, misses + 2);
    }

    #[tokio::test]
    async fn test_word_edit_reaches_published_detail() {
        let (services, _, user) = setup().await;
        let list = services
            .word_lists
            .create_word_list(&user, &create("Fruits"))
            .await
            .unwrap();
        let shared = services
            .word_lists
            .publish(&user, &list.id, &publish("Fruits"))
            .await
            .unwrap();
        assert!(services
            .shared
            .shared_word_list(&shared.id)
            .await
            .unwrap()
            .unwrap()
            .words
            .is_empty());

        let input = WordInput {
            english: "apple".into(),
            korean: "사과".into(),
            ..WordInput::default()
        };
        services.word_lists.add_word(&user, &list.id, &input).await.unwrap();

        let detail = services.shared.shared_word_list(&shared.id).await.unwrap().unwrap();
        assert_eq!(detail.words.len(), 1);
    }

    #[tokio::test]
    async fn test_deleting_list_removes_its_publications() {
        let (services, _, user) = setup().await;
        let list = services
            .word_lists
            .create_word_list(&user, &create("Temp"))
            .await
            .unwrap();
        let shared = services
            .word_lists
            .publish(&user, &list.id, &publish("Temp"))
            .await
            .unwrap();
        services.bookmarks.toggle_bookmark(&user, &shared.id).await.unwrap();

        assert_eq!(services.profile.bookmarks(&user).await.unwrap().len(), 1);
        assert_eq!(services.shared.shared_word_lists(None, &[], 1).await.unwrap().total_count, 1);

        services.word_lists.delete_word_list(&user, &list.id).await.unwrap();

        assert!(services.profile.bookmarks(&user).await.unwrap().is_empty());
        assert!(services.profile.shared_word_lists(&user).await.unwrap().is_empty());
        assert_eq!(services.shared.shared_word_lists(None, &[], 1).await.unwrap().total_count, 0);
        assert!(services.shared.shared_word_list(&shared.id).await.unwrap().is_none());
    }
}
