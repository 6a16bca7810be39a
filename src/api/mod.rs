//! API Module
//!
//! HTTP handlers and routing for the wordbook REST API.
//!
//! # Endpoints
//! - `/api/...` - Word lists, shared space, comments, likes, bookmarks, profile
//! - `GET /cache/stats` - Read-through cache statistics
//! - `POST /cache/invalidate` - Invalidate one tag
//! - `DELETE /cache` - Flush the cache
//! - `GET /health` - Health check endpoint

pub mod auth;
pub mod handlers;
pub mod routes;

pub use auth::{CurrentUser, ACCOUNT_HEADER};
pub use handlers::*;
pub use routes::create_router;
