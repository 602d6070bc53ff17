//! Core traits for automation clients and their factories.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::insights::InsightsFeedQuery;

/// Login credentials forwarded to the automation client.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Credentials {
    /// Account username.
    pub username: String,
    /// Account password.
    pub password: String,
    /// Two-factor verification code (empty when 2FA is off).
    #[serde(default)]
    pub verification_code: String,
}

impl Credentials {
    /// Create credentials without a verification code.
    #[must_use]
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
            verification_code: String::new(),
        }
    }

    /// Attach a two-factor verification code.
    #[must_use]
    pub fn with_verification_code(mut self, code: impl Into<String>) -> Self {
        self.verification_code = code.into();
        self
    }
}

/// Configuration error.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Invalid proxy URL '{url}': {reason}")]
    InvalidProxy { url: String, reason: String },
    #[error("Invalid locale '{0}', expected a code like en_US")]
    InvalidLocale(String),
    #[error("Invalid timezone offset {0}s, must be within ±14 hours")]
    InvalidTimezoneOffset(i32),
    #[error("Request timeout must be greater than zero")]
    InvalidTimeout,
    #[error("Client setup failed: {0}")]
    Build(String),
}

/// Error reported by the automation client.
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("Login required")]
    LoginRequired,
    #[error("Challenge required: {0}")]
    ChallengeRequired(String),
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Request timed out")]
    Timeout,
    #[error("Transport error: {0}")]
    Transport(String),
    #[error("Upstream error ({status}): {message}")]
    Upstream { status: u16, message: String },
    #[error("Invalid upstream response: {0}")]
    Decode(String),
}

/// Trait for an authenticated (or pending-authentication) automation client.
///
/// A single client is not reentrant: callers must not issue two network
/// operations against the same value concurrently.
#[async_trait]
pub trait AutomationClient: Send + Sync + 'static {
    /// Route all traffic through a proxy.
    fn set_proxy(&mut self, url: &str) -> Result<(), ConfigError>;

    /// Set the locale sent with every request.
    fn set_locale(&mut self, locale: &str) -> Result<(), ConfigError>;

    /// Set the timezone offset in seconds east of UTC.
    fn set_timezone_offset(&mut self, offset: i32) -> Result<(), ConfigError>;

    /// Set the per-request timeout budget.
    fn set_request_timeout(&mut self, timeout: Duration) -> Result<(), ConfigError>;

    /// Session identifier once authenticated.
    fn session_id(&self) -> Option<&str>;

    /// Authenticate.
    ///
    /// Returns `Ok(None)` when the credentials are rejected.
    async fn login(&mut self, credentials: &Credentials) -> Result<Option<String>, ClientError>;

    /// Terminate the upstream session.
    async fn logout(&mut self) -> Result<bool, ClientError>;

    /// Media details by primary key.
    async fn media_info(&self, pk: u64) -> Result<Value, ClientError>;

    /// User details by user id.
    async fn user_info(&self, user_id: u64, use_cache: bool) -> Result<Value, ClientError>;

    /// User details by username.
    async fn user_info_by_username(
        &self,
        username: &str,
        use_cache: bool,
    ) -> Result<Value, ClientError>;

    /// Resolve a username to a user id.
    async fn user_id_from_username(&self, username: &str) -> Result<u64, ClientError>;

    /// Resolve a user id to a username.
    async fn username_from_user_id(&self, user_id: u64) -> Result<String, ClientError>;

    /// Followers keyed by user id. `amount == 0` means all.
    async fn user_followers(
        &self,
        user_id: u64,
        use_cache: bool,
        amount: u32,
    ) -> Result<Value, ClientError>;

    /// Followed accounts keyed by user id. `amount == 0` means all.
    async fn user_following(
        &self,
        user_id: u64,
        use_cache: bool,
        amount: u32,
    ) -> Result<Value, ClientError>;

    /// Follow a user.
    async fn user_follow(&self, user_id: u64) -> Result<bool, ClientError>;

    /// Unfollow a user.
    async fn user_unfollow(&self, user_id: u64) -> Result<bool, ClientError>;

    /// Remove a user from the logged-in account's followers.
    async fn user_remove_follower(&self, user_id: u64) -> Result<bool, ClientError>;

    /// Mute posts from a followed account; `revert` unmutes.
    async fn mute_posts_from_follow(
        &self,
        user_id: u64,
        revert: bool,
    ) -> Result<bool, ClientError>;

    async fn unmute_posts_from_follow(&self, user_id: u64) -> Result<bool, ClientError> {
        self.mute_posts_from_follow(user_id, true).await
    }

    /// Mute stories from a followed account; `revert` unmutes.
    async fn mute_stories_from_follow(
        &self,
        user_id: u64,
        revert: bool,
    ) -> Result<bool, ClientError>;

    async fn unmute_stories_from_follow(&self, user_id: u64) -> Result<bool, ClientError> {
        self.mute_stories_from_follow(user_id, true).await
    }

    /// Active stories of a user. `amount == 0` means all.
    async fn user_stories(&self, user_id: u64, amount: u32) -> Result<Value, ClientError>;

    /// Story details by primary key.
    async fn story_info(&self, story_pk: u64, use_cache: bool) -> Result<Value, ClientError>;

    /// Delete one of the logged-in account's stories.
    async fn story_delete(&self, story_pk: u64) -> Result<bool, ClientError>;

    /// Mark stories as seen.
    async fn story_seen(
        &self,
        story_pks: &[u64],
        skipped_story_pks: &[u64],
    ) -> Result<bool, ClientError>;

    /// Like a story by its `<pk>_<owner id>` identifier; `revert` unlikes.
    async fn story_like(&self, story_id: &str, revert: bool) -> Result<bool, ClientError>;

    async fn story_unlike(&self, story_id: &str) -> Result<bool, ClientError> {
        self.story_like(story_id, true).await
    }

    /// Media of the logged-in account with their insights.
    async fn insights_media_feed_all(
        &self,
        query: &InsightsFeedQuery,
    ) -> Result<Value, ClientError>;

    /// Account-level insights of the logged-in account.
    async fn insights_account(&self) -> Result<Value, ClientError>;

    /// Insights for a single media.
    async fn insights_media(&self, media_pk: u64) -> Result<Value, ClientError>;
}

/// Trait for constructing fresh, unauthenticated clients.
pub trait ClientFactory: Send + Sync + 'static {
    /// Client type produced by this factory.
    type Client: AutomationClient;

    /// Create a client with baseline configuration applied.
    ///
    /// # Errors
    /// Returns error if the configured proxy, locale or timezone is rejected.
    fn create(&self) -> Result<Self::Client, ConfigError>;
}
