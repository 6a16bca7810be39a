//! API Handlers
//!
//! HTTP request handlers for each wordbook endpoint. Handlers stay thin:
//! they extract, call one service, and shape the response.

use axum::{
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    Json,
};

use tracing::info;

use super::auth::{account_id, CurrentUser};
use crate::cache::{Tag, TaggedCache};
use crate::config::Config;
use crate::db::{Comment, Db, SharedWordList, User, Word, WordList};
use crate::error::{AppError, CacheError, Result};
use crate::models::{
    CommentRequest, CommentView, CreateWordListRequest, HealthResponse, InvalidateRequest,
    InvalidateResponse, LinkAccountRequest, MessageResponse, ProfileResponse, PublishRequest,
    SharedListDetail, SharedListResponse, SharedQuery, StatsResponse, ToggleResponse, UserIdResponse,
    ViewCountResponse, WordInput, WordListDetail, WordListSummary,
};
use crate::services::Services;

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    pub services: Services,
    /// Same instance the services read through
    pub cache: TaggedCache,
}

impl AppState {
    pub fn new(db: Db, cache: TaggedCache, page_size: usize) -> Self {
        Self {
            services: Services::new(db, cache.clone(), page_size),
            cache,
        }
    }

    /// Creates a fresh store and cache from configuration.
    pub fn from_config(config: &Config) -> Self {
        Self::new(Db::new(), TaggedCache::create(config), config.page_size)
    }
}

// == Accounts ==

/// Handler for POST /api/accounts
pub async fn link_account_handler(
    State(state): State<AppState>,
    Json(req): Json<LinkAccountRequest>,
) -> Result<Json<User>> {
    let user = state.services.accounts.link_account(&req).await?;
    Ok(Json(user))
}

/// Handler for GET /api/user-id
///
/// Unknown or missing accounts resolve to `null` rather than 401.
pub async fn user_id_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Json<UserIdResponse> {
    let user_id = match account_id(&headers) {
        Some(account) => state.services.accounts.user_id(account).await,
        None => None,
    };
    Json(UserIdResponse { user_id })
}

// == Word Lists ==

/// Handler for GET /api/wordlists
pub async fn list_word_lists_handler(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> Result<Json<Vec<WordListSummary>>> {
    Ok(Json(state.services.word_lists.word_lists(&user).await?))
}

/// Handler for POST /api/wordlists
pub async fn create_word_list_handler(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Json(req): Json<CreateWordListRequest>,
) -> Result<(StatusCode, Json<WordList>)> {
    let list = state.services.word_lists.create_word_list(&user, &req).await?;
    Ok((StatusCode::CREATED, Json(list)))
}

/// Handler for GET /api/wordlists/:id
pub async fn get_word_list_handler(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<String>,
) -> Result<Json<WordListDetail>> {
    state
        .services
        .word_lists
        .word_list(&user, &id)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::NotFound("word list".into()))
}

/// Handler for DELETE /api/wordlists/:id
pub async fn delete_word_list_handler(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<String>,
) -> Result<Json<MessageResponse>> {
    state.services.word_lists.delete_word_list(&user, &id).await?;
    Ok(Json(MessageResponse::new("Word list deleted")))
}

/// Handler for POST /api/wordlists/:id/words
///
/// Also used to copy a word out of a shared list.
pub async fn add_word_handler(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<String>,
    Json(input): Json<WordInput>,
) -> Result<(StatusCode, Json<Word>)> {
    let word = state.services.word_lists.copy_word(&user, &id, &input).await?;
    Ok((StatusCode::CREATED, Json(word)))
}

/// Handler for PUT /api/wordlists/:id/words/:word_id
pub async fn update_word_handler(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path((id, word_id)): Path<(String, String)>,
    Json(input): Json<WordInput>,
) -> Result<Json<Word>> {
    let word = state
        .services
        .word_lists
        .update_word(&user, &id, &word_id, &input)
        .await?;
    Ok(Json(word))
}

/// Handler for DELETE /api/wordlists/:id/words/:word_id
pub async fn delete_word_handler(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path((id, word_id)): Path<(String, String)>,
) -> Result<Json<MessageResponse>> {
    state.services.word_lists.delete_word(&user, &id, &word_id).await?;
    Ok(Json(MessageResponse::new("Word deleted")))
}

/// Handler for POST /api/wordlists/:id/share
pub async fn publish_handler(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<String>,
    Json(req): Json<PublishRequest>,
) -> Result<(StatusCode, Json<SharedWordList>)> {
    let shared = state.services.word_lists.publish(&user, &id, &req).await?;
    Ok((StatusCode::CREATED, Json(shared)))
}

/// Handler for DELETE /api/wordlists/:id/share/:shared_id
pub async fn unpublish_handler(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path((id, shared_id)): Path<(String, String)>,
) -> Result<Json<MessageResponse>> {
    state
        .services
        .word_lists
        .unpublish(&user, &id, &shared_id)
        .await?;
    Ok(Json(MessageResponse::new("Shared word list removed")))
}

// == Shared Space ==

/// Handler for GET /api/shared
///
/// `bookmarksOnly` narrows the requested page to the caller's bookmarks.
/// `liked` marks which lists on the page the caller has liked.
pub async fn list_shared_handler(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Query(query): Query<SharedQuery>,
) -> Result<Json<SharedListResponse>> {
    let search = query.search();
    let tags = query.selected_tags();
    let shared = &state.services.shared;

    let (mut page, total_count, likes) = tokio::try_join!(
        shared.shared_word_lists(search.as_deref(), &tags, query.page()),
        shared.shared_word_lists_pages(search.as_deref(), &tags),
        state.services.likes.likes(),
    )?;

    if query.bookmarks_only.unwrap_or(false) {
        let bookmarks = state.services.bookmarks.bookmarks(&user).await?;
        page.lists
            .retain(|summary| bookmarks.iter().any(|b| b.list_id == summary.list.id));
    }

    let liked = page
        .lists
        .iter()
        .filter(|summary| {
            likes
                .iter()
                .any(|like| like.user_id == user && like.list_id == summary.list.id)
        })
        .map(|summary| summary.list.id.clone())
        .collect();

    Ok(Json(SharedListResponse {
        total_pages: total_count.div_ceil(shared.page_size()),
        page,
        liked,
    }))
}

/// Handler for GET /api/shared/:id
pub async fn get_shared_handler(
    State(state): State<AppState>,
    _user: CurrentUser,
    Path(id): Path<String>,
) -> Result<Json<SharedListDetail>> {
    state
        .services
        .shared
        .shared_word_list(&id)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::NotFound("shared word list".into()))
}

/// Handler for POST /api/shared/:id/views
pub async fn view_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ViewCountResponse>> {
    let view_count = state.services.shared.increment_view_count(&id).await?;
    Ok(Json(ViewCountResponse { view_count }))
}

// == Comments ==

/// Handler for GET /api/shared/:id/comments
pub async fn list_comments_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Vec<CommentView>>> {
    state.services.shared.ensure_exists(&id).await?;
    Ok(Json(state.services.comments.comments(&id).await?))
}

/// Handler for POST /api/shared/:id/comments
pub async fn create_comment_handler(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<String>,
    Json(req): Json<CommentRequest>,
) -> Result<(StatusCode, Json<Comment>)> {
    let comment = state.services.comments.create_comment(&user, &id, &req).await?;
    Ok((StatusCode::CREATED, Json(comment)))
}

/// Handler for PUT /api/comments/:id
pub async fn update_comment_handler(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<String>,
    Json(req): Json<CommentRequest>,
) -> Result<Json<Comment>> {
    let comment = state.services.comments.update_comment(&user, &id, &req).await?;
    Ok(Json(comment))
}

/// Handler for DELETE /api/comments/:id
pub async fn delete_comment_handler(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<String>,
) -> Result<Json<MessageResponse>> {
    state.services.comments.delete_comment(&user, &id).await?;
    Ok(Json(MessageResponse::new("Comment deleted")))
}

// == Likes & Bookmarks ==

/// Handler for POST /api/shared/:id/like
pub async fn like_handler(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<String>,
) -> Result<Json<ToggleResponse>> {
    let toggle = state.services.likes.toggle_like(&user, &id).await?;
    Ok(Json(toggle.into()))
}

/// Handler for POST /api/shared/:id/bookmark
pub async fn bookmark_handler(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<String>,
) -> Result<Json<ToggleResponse>> {
    let toggle = state.services.bookmarks.toggle_bookmark(&user, &id).await?;
    Ok(Json(toggle.into()))
}

/// Handler for GET /api/profile
pub async fn profile_handler(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> Result<Json<ProfileResponse>> {
    Ok(Json(state.services.profile.profile(&user).await?))
}

// == Cache Administration ==

/// Handler for GET /cache/stats
pub async fn stats_handler(State(state): State<AppState>) -> Json<StatsResponse> {
    Json(state.cache.stats().await.into())
}

/// Handler for POST /cache/invalidate
///
/// Accepts the textual tag form, e.g. `global:likes` or `user:<id>-bookmarks`.
pub async fn invalidate_handler(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Json(req): Json<InvalidateRequest>,
) -> Result<Json<InvalidateResponse>> {
    let tag: Tag = req
        .tag
        .trim()
        .parse()
        .map_err(|err: CacheError| AppError::InvalidRequest(err.to_string()))?;

    state.cache.invalidate(&tag).await;
    info!(%tag, user = %user, "cache tag invalidated");
    Ok(Json(InvalidateResponse::new(tag.to_string())))
}

/// Handler for DELETE /cache
pub async fn clear_cache_handler(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> Json<MessageResponse> {
    state.cache.clear().await;
    info!(user = %user, "cache cleared");
    Json(MessageResponse::new("Cache cleared"))
}

/// Handler for GET /health
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::healthy())
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn state_with_user() -> (AppState, String) {
        let state = AppState::new(Db::new(), TaggedCache::new(100, None), 12);
        let user = state
            .services
            .accounts
            .link_account(&LinkAccountRequest {
                provider: "kakao".into(),
                provider_account_id: "acc".into(),
                name: "minji".into(),
                image: None,
            })
            .await
            .unwrap();
        (state, user.id)
    }

    #[tokio::test]
    async fn test_create_and_get_word_list_handlers() {
        let (state, user) = state_with_user().await;
        let req = CreateWordListRequest {
            title: "TOEIC".into(),
            description: None,
            words: vec![],
        };

        let (status, Json(list)) =
            create_word_list_handler(State(state.clone()), CurrentUser(user.clone()), Json(req))
                .await
                .unwrap();
        assert_eq!(status, StatusCode::CREATED);

        let Json(detail) =
            get_word_list_handler(State(state), CurrentUser(user), Path(list.id.clone()))
                .await
                .unwrap();
        assert_eq!(detail.list.id, list.id);
    }

    #[tokio::test]
    async fn test_missing_word_list_is_not_found() {
        let (state, user) = state_with_user().await;
        let result =
            get_word_list_handler(State(state), CurrentUser(user), Path("missing".into())).await;
        assert!(matches!(result, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_invalidate_handler_rejects_bad_tag() {
        let (state, user) = state_with_user().await;
        let req = InvalidateRequest {
            tag: "nonsense".into(),
        };
        let result = invalidate_handler(State(state), CurrentUser(user), Json(req)).await;
        assert!(matches!(result, Err(AppError::InvalidRequest(_))));
    }

    #[tokio::test]
    async fn test_invalidate_handler_accepts_user_tag() {
        let (state, user) = state_with_user().await;
        let req = InvalidateRequest {
            tag: format!("user:{}-wordlists", user),
        };
        let Json(resp) = invalidate_handler(State(state), CurrentUser(user.clone()), Json(req))
            .await
            .unwrap();
        assert_eq!(resp.tag, format!("user:{}-wordlists", user));
    }

    #[tokio::test]
    async fn test_stats_handler() {
        let (state, user) = state_with_user().await;
        list_word_lists_handler(State(state.clone()), CurrentUser(user.clone()))
            .await
            .unwrap();
        list_word_lists_handler(State(state.clone()), CurrentUser(user))
            .await
            .unwrap();

        let Json(stats) = stats_handler(State(state)).await;
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.misses, 1);
        assert_eq!(stats.total_entries, 1);
    }

    #[tokio::test]
    async fn test_clear_cache_handler_flushes() {
        let (state, user) = state_with_user().await;
        list_word_lists_handler(State(state.clone()), CurrentUser(user.clone()))
            .await
            .unwrap();
        assert_eq!(state.cache.len().await, 1);

        clear_cache_handler(State(state.clone()), CurrentUser(user)).await;
        assert_eq!(state.cache.len().await, 0);
    }

    #[tokio::test]
    async fn test_list_shared_handler_reports_pages_and_likes() {
        let state = AppState::new(Db::new(), TaggedCache::new(100, None), 2);
        let services = &state.services;
        let user = services
            .accounts
            .link_account(&LinkAccountRequest {
                provider: "kakao".into(),
                provider_account_id: "acc".into(),
                name: "minji".into(),
                image: None,
            })
            .await
            .unwrap()
            .id;
        let list = services
            .word_lists
            .create_word_list(
                &user,
                &CreateWordListRequest {
                    title: "TOEIC".into(),
                    description: None,
                    words: vec![],
                },
            )
            .await
            .unwrap();
        let mut shared = Vec::new();
        for name in ["a", "b", "c"] {
            let req = PublishRequest {
                name: name.into(),
                description: None,
                tags: vec![],
            };
            shared.push(services.word_lists.publish(&user, &list.id, &req).await.unwrap());
        }
        for list in &shared {
            services.likes.toggle_like(&user, &list.id).await.unwrap();
        }

        let Json(resp) = list_shared_handler(
            State(state.clone()),
            CurrentUser(user),
            Query(SharedQuery::default()),
        )
        .await
        .unwrap();

        assert_eq!(resp.page.total_count, 3);
        assert_eq!(resp.page.lists.len(), 2);
        assert_eq!(resp.total_pages, 2);
        // only lists on the returned page are reported
        assert_eq!(resp.liked.len(), 2);
        assert!(resp
            .liked
            .iter()
            .all(|id| resp.page.lists.iter().any(|summary| &summary.list.id == id)));
    }

    #[tokio::test]
    async fn test_health_handler() {
        let response = health_handler().await;
        assert_eq!(response.status, "healthy");
    }
}
