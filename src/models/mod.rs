//! Request, response and read models
//!
//! DTOs for HTTP bodies plus the view types services return (and the cache
//! memoizes).

pub mod requests;
pub mod responses;
pub mod views;

// Re-export commonly used types
pub use requests::{
    CommentRequest, CreateWordListRequest, DraftWord, InvalidateRequest, LinkAccountRequest,
    PublishRequest, SharedQuery, WordInput, MAX_COMMENT_LENGTH,
};
pub use responses::{
    HealthResponse, InvalidateResponse, MessageResponse, ProfileResponse, SharedListResponse,
    StatsResponse, ToggleResponse, UserIdResponse, ViewCountResponse,
};
pub use views::{
    BookmarkView, CommentView, SharedListDetail, SharedListSummary, SharedPage, Toggle,
    UserSummary, WordListDetail, WordListSummary,
};
