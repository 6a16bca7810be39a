//! API Routes
//!
//! Configures the Axum router with all wordbook endpoints.

use axum::{
    routing::{delete, get, post, put},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use super::handlers::*;

/// Creates the main router with all endpoints configured.
///
/// # Middleware
/// - CORS: Allows any origin (configurable for production)
/// - Tracing: Logs all requests for debugging
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let api = Router::new()
        .route("/accounts", post(link_account_handler))
        .route("/user-id", get(user_id_handler))
        .route(
            "/wordlists",
            get(list_word_lists_handler).post(create_word_list_handler),
        )
        .route(
            "/wordlists/:id",
            get(get_word_list_handler).delete(delete_word_list_handler),
        )
        .route("/wordlists/:id/words", post(add_word_handler))
        .route(
            "/wordlists/:id/words/:word_id",
            put(update_word_handler).delete(delete_word_handler),
        )
        .route("/wordlists/:id/share", post(publish_handler))
        .route(
            "/wordlists/:id/share/:shared_id",
            delete(unpublish_handler),
        )
        .route("/shared", get(list_shared_handler))
        .route("/shared/:id", get(get_shared_handler))
        .route("/shared/:id/views", post(view_handler))
        .route(
            "/shared/:id/comments",
            get(list_comments_handler).post(create_comment_handler),
        )
        .route(
            "/comments/:id",
            put(update_comment_handler).delete(delete_comment_handler),
        )
        .route("/shared/:id/like", post(like_handler))
        .route("/shared/:id/bookmark", post(bookmark_handler))
        .route("/profile", get(profile_handler));

    Router::new()
        .route("/health", get(health_handler))
        .route("/cache", delete(clear_cache_handler))
        .route("/cache/stats", get(stats_handler))
        .route("/cache/invalidate", post(invalidate_handler))
        .nest("/api", api)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        body::Body,
        http::{Request, StatusCode},
    };
    use tower::util::ServiceExt;

    fn create_test_app() -> Router {
        create_router(AppState::new(
            crate::db::Db::new(),
            crate::cache::TaggedCache::new(100, None),
            12,
        ))
    }

    #[tokio::test]
    async fn test_health_endpoint() {
        let app = create_test_app();

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/health")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_stats_endpoint() {
        let app = create_test_app();

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/cache/stats")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_api_requires_account_header() {
        let app = create_test_app();

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/api/wordlists")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_unknown_account_is_unauthorized() {
        let app = create_test_app();

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/api/profile")
                    .header("x-account-id", "nobody")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_clear_cache_requires_account() {
        let app = create_test_app();

        let response = app
            .oneshot(
                Request::builder()
                    .method("DELETE")
                    .uri("/cache")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }
}
