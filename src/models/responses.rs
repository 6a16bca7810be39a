//! Response DTOs for the wordbook API
//!
//! Defines the structure of outgoing HTTP response bodies.

use serde::Serialize;

use crate::cache::CacheStats;
use crate::models::views::{BookmarkView, SharedPage, Toggle};
use crate::db::{Like, SharedWordList, WordList};

/// Generic acknowledgement
#[derive(Debug, Clone, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Response body for GET /api/user-id
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserIdResponse {
    pub user_id: Option<String>,
}

/// Response body for GET /api/shared
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SharedListResponse {
    #[serde(flatten)]
    pub page: SharedPage,
    pub total_pages: usize,
    /// Ids of the lists on this page the caller has liked
    pub liked: Vec<String>,
}

/// Response body for like and bookmark toggles
#[derive(Debug, Clone, Serialize)]
pub struct ToggleResponse {
    pub active: bool,
    pub message: String,
}

impl From<Toggle> for ToggleResponse {
    fn from(toggle: Toggle) -> Self {
        Self {
            active: toggle.active,
            message: toggle.message,
        }
    }
}

/// Response body for POST /api/shared/:id/views
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewCountResponse {
    pub view_count: u64,
}

/// Response body for GET /api/profile
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileResponse {
    pub word_lists: Vec<WordList>,
    pub shared_word_lists: Vec<SharedWordList>,
    pub bookmarks: Vec<BookmarkView>,
    pub likes: Vec<Like>,
}

/// Response body for the cache stats endpoint (GET /cache/stats)
#[derive(Debug, Clone, Serialize)]
pub struct StatsResponse {
    pub hits: u64,
    pub misses: u64,
    pub fetch_errors: u64,
    pub invalidations: u64,
    pub evictions: u64,
    pub stale_discards: u64,
    pub total_entries: usize,
    /// Hit rate (hits / (hits + misses))
    pub hit_rate: f64,
}

impl From<CacheStats> for StatsResponse {
    fn from(stats: CacheStats) -> Self {
        Self {
            hit_rate: stats.hit_rate(),
            hits: stats.hits,
            misses: stats.misses,
            fetch_errors: stats.fetch_errors,
            invalidations: stats.invalidations,
            evictions: stats.evictions,
            stale_discards: stats.stale_discards,
            total_entries: stats.total_entries,
        }
    }
}

/// Response body for POST /cache/invalidate
#[derive(Debug, Clone, Serialize)]
pub struct InvalidateResponse {
    pub tag: String,
    pub message: String,
}

impl InvalidateResponse {
    pub fn new(tag: impl Into<String>) -> Self {
        let tag = tag.into();
        Self {
            message: format!("Tag '{}' invalidated", tag),
            tag,
        }
    }
}

/// Response body for the health endpoint (GET /health)
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    /// Health status (e.g., "healthy")
    pub status: String,
    /// Current timestamp in ISO 8601 format
    pub timestamp: String,
}

impl HealthResponse {
    /// Creates a new HealthResponse with current timestamp
    pub fn healthy() -> Self {
        Self {
            status: "healthy".to_string(),
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stats_response_from_cache_stats() {
        let stats = CacheStats {
            hits: 80,
            misses: 20,
            invalidations: 3,
            total_entries: 10,
            ..CacheStats::default()
        };
        let resp = StatsResponse::from(stats);
        assert!((resp.hit_rate - 0.8).abs() < 0.001);
        assert_eq!(resp.invalidations, 3);
    }

    #[test]
    fn test_user_id_response_camel_case() {
        let resp = UserIdResponse { user_id: None };
        let json = serde_json::to_string(&resp).unwrap();
        assert_eq!(json, r#"{"userId":null}"#);
    }

    #[test]
    fn test_invalidate_response_serialize() {
        let resp = InvalidateResponse::new("global:likes");
        let json = serde_json::to_string(&resp).unwrap();
        assert!(json.contains("global:likes"));
        assert!(json.contains("invalidated"));
    }

    #[test]
    fn test_health_response_serialize() {
        let resp = HealthResponse::healthy();
        let json = serde_json::to_string(&resp).unwrap();
        assert!(json.contains("healthy"));
        assert!(json.contains("timestamp"));
    }
}
