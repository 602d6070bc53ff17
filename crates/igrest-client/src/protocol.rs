//! Wire types for the automation gateway.
//!
//! Every operation is a JSON `POST` to `<gateway>/<path>`. Client settings
//! travel as headers; failures come back as a non-2xx status with an
//! [`ErrorBody`].

use igrest_core::{ClientError, Credentials};
use serde::{Deserialize, Serialize};

/// Header carrying the timezone offset in seconds.
pub const TIMEZONE_HEADER: &str = "x-timezone-offset";

/// Gateway operation paths.
pub mod paths {
    pub const LOGIN: &str = "auth/login";
    pub const LOGOUT: &str = "auth/logout";
    pub const MEDIA_INFO: &str = "media/info";
    pub const USER_INFO: &str = "user/info";
    pub const USER_INFO_BY_USERNAME: &str = "user/info_by_username";
    pub const USER_ID_FROM_USERNAME: &str = "user/id_from_username";
    pub const USERNAME_FROM_USER_ID: &str = "user/username_from_user_id";
    pub const USER_FOLLOWERS: &str = "user/followers";
    pub const USER_FOLLOWING: &str = "user/following";
    pub const USER_FOLLOW: &str = "user/follow";
    pub const USER_UNFOLLOW: &str = "user/unfollow";
    pub const USER_REMOVE_FOLLOWER: &str = "user/remove_follower";
    pub const MUTE_POSTS_FROM_FOLLOW: &str = "user/mute_posts_from_follow";
    pub const MUTE_STORIES_FROM_FOLLOW: &str = "user/mute_stories_from_follow";
    pub const USER_STORIES: &str = "story/user_stories";
    pub const STORY_INFO: &str = "story/info";
    pub const STORY_DELETE: &str = "story/delete";
    pub const STORY_SEEN: &str = "story/seen";
    pub const STORY_LIKE: &str = "story/like";
    pub const INSIGHTS_MEDIA_FEED_ALL: &str = "insights/media_feed_all";
    pub const INSIGHTS_ACCOUNT: &str = "insights/account";
    pub const INSIGHTS_MEDIA: &str = "insights/media";
}

/// Login request body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub verification_code: String,
}

impl From<&Credentials> for LoginRequest {
    fn from(credentials: &Credentials) -> Self {
        Self {
            username: credentials.username.clone(),
            password: credentials.password.clone(),
            verification_code: credentials.verification_code.clone(),
        }
    }
}

/// Login response. A missing `sessionid` means the credentials were rejected.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LoginResponse {
    #[serde(default)]
    pub sessionid: Option<String>,
}

/// Lookup by media primary key.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MediaRequest {
    pub pk: u64,
}

/// Lookup by user id.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserRequest {
    pub user_id: u64,
    #[serde(default = "default_true")]
    pub use_cache: bool,
}

/// Lookup by username.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UsernameRequest {
    pub username: String,
    #[serde(default = "default_true")]
    pub use_cache: bool,
}

/// Follower/following listing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RelationsRequest {
    pub user_id: u64,
    #[serde(default = "default_true")]
    pub use_cache: bool,
    /// Maximum entries; 0 means all.
    #[serde(default)]
    pub amount: u32,
}

/// Mute or unmute a followed account.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MuteRequest {
    pub user_id: u64,
    #[serde(default)]
    pub revert: bool,
}

/// Active stories of a user.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserStoriesRequest {
    pub user_id: u64,
    /// Maximum entries; 0 means all.
    #[serde(default)]
    pub amount: u32,
}

/// Lookup or action by story primary key.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoryRequest {
    pub story_pk: u64,
    #[serde(default = "default_true")]
    pub use_cache: bool,
}

/// Mark stories as seen.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorySeenRequest {
    pub story_pks: Vec<u64>,
    #[serde(default)]
    pub skipped_story_pks: Vec<u64>,
}

/// Like or unlike a story.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoryLikeRequest {
    pub story_id: String,
    #[serde(default)]
    pub revert: bool,
}

const fn default_true() -> bool {
    true
}

/// Error payload returned with a non-2xx status.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ErrorBody {
    #[serde(default)]
    pub detail: String,
    /// Machine-readable error kind, e.g. `challenge_required`.
    #[serde(default)]
    pub kind: Option<String>,
}

impl ErrorBody {
    /// Map a failed gateway response onto a client error.
    #[must_use]
    pub fn into_client_error(self, status: u16) -> ClientError {
        match (status, self.kind.as_deref()) {
            (_, Some("challenge_required")) => ClientError::ChallengeRequired(self.detail),
            (_, Some("login_required")) | (401, _) => ClientError::LoginRequired,
            (404, _) => ClientError::NotFound(self.detail),
            (408 | 504, _) => ClientError::Timeout,
            _ => ClientError::Upstream {
                status,
                message: self.detail,
            },
        }
    }
}
