//! In-process automation client for tests.
//!
//! `MockClient` answers from a shared directory of fake accounts instead of
//! the network. It is compiled for all builds (behind the default `mock`
//! feature) so that downstream crates can drive the registry and the HTTP
//! layer end to end without credentials.

use std::{
    collections::{BTreeMap, BTreeSet},
    sync::{
        Arc, Mutex, PoisonError,
        atomic::{AtomicUsize, Ordering},
    },
    time::Duration,
};

use async_trait::async_trait;
use serde_json::{Map, Value, json};

use crate::{
    config::{ClientConfig, validate_locale, validate_proxy, validate_timezone_offset},
    insights::InsightsFeedQuery,
    traits::{AutomationClient, ClientError, ClientFactory, ConfigError, Credentials},
};

/// A fake account known to the mock directory.
#[derive(Debug, Clone)]
pub struct MockAccount {
    pub user_id: u64,
    pub username: String,
    pub password: String,
    /// When set, login requires this verification code.
    pub verification_code: Option<String>,
}

impl MockAccount {
    /// Create an account without two-factor authentication.
    #[must_use]
    pub fn new(user_id: u64, username: &str, password: &str) -> Self {
        Self {
            user_id,
            username: username.to_string(),
            password: password.to_string(),
            verification_code: None,
        }
    }
}

#[derive(Debug, Default)]
struct DirectoryState {
    follows: BTreeSet<(u64, u64)>,
    muted_posts: BTreeSet<(u64, u64)>,
    muted_stories: BTreeSet<(u64, u64)>,
    /// Story pk -> owner id.
    stories: BTreeMap<u64, u64>,
    seen: BTreeSet<(u64, u64)>,
    story_likes: BTreeSet<(u64, u64)>,
    logins: usize,
    logouts: usize,
}

/// Shared set of accounts and recorded side effects.
#[derive(Debug, Default)]
pub struct MockDirectory {
    accounts: Vec<MockAccount>,
    /// Simulate an unreachable upstream.
    pub unreachable: bool,
    state: Mutex<DirectoryState>,
}

impl MockDirectory {
    /// Create a directory with the given accounts.
    #[must_use]
    pub fn new(accounts: Vec<MockAccount>) -> Self {
        Self {
            accounts,
            ..Self::default()
        }
    }

    /// Create a directory whose upstream is unreachable.
    #[must_use]
    pub fn unreachable() -> Self {
        Self {
            unreachable: true,
            ..Self::default()
        }
    }

    /// Number of successful logins so far.
    #[must_use]
    pub fn login_count(&self) -> usize {
        self.state().logins
    }

    /// Number of logouts so far.
    #[must_use]
    pub fn logout_count(&self) -> usize {
        self.state().logouts
    }

    /// Whether `follower` currently follows `target`.
    #[must_use]
    pub fn is_following(&self, follower: u64, target: u64) -> bool {
        self.state().follows.contains(&(follower, target))
    }

    /// Whether `muter` has muted posts from `target`.
    #[must_use]
    pub fn is_muting_posts(&self, muter: u64, target: u64) -> bool {
        self.state().muted_posts.contains(&(muter, target))
    }

    /// Whether `muter` has muted stories from `target`.
    #[must_use]
    pub fn is_muting_stories(&self, muter: u64, target: u64) -> bool {
        self.state().muted_stories.contains(&(muter, target))
    }

    /// Publish a story owned by `owner`.
    pub fn add_story(&self, owner: u64, story_pk: u64) {
        self.state().stories.insert(story_pk, owner);
    }

    /// Whether a story still exists.
    #[must_use]
    pub fn has_story(&self, story_pk: u64) -> bool {
        self.state().stories.contains_key(&story_pk)
    }

    /// Whether `viewer` marked the story as seen.
    #[must_use]
    pub fn has_seen(&self, viewer: u64, story_pk: u64) -> bool {
        self.state().seen.contains(&(viewer, story_pk))
    }

    /// Whether `liker` currently likes the story.
    #[must_use]
    pub fn likes_story(&self, liker: u64, story_pk: u64) -> bool {
        self.state().story_likes.contains(&(liker, story_pk))
    }

    fn state(&self) -> std::sync::MutexGuard<'_, DirectoryState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn by_id(&self, user_id: u64) -> Option<&MockAccount> {
        self.accounts.iter().find(|a| a.user_id == user_id)
    }

    fn by_username(&self, username: &str) -> Option<&MockAccount> {
        self.accounts.iter().find(|a| a.username == username)
    }
}

fn user_json(account: &MockAccount) -> Value {
    json!({
        "pk": account.user_id.to_string(),
        "username": account.username,
        "full_name": format!("{} (mock)", account.username),
    })
}

fn story_json(story_pk: u64, owner: u64) -> Value {
    json!({
        "pk": story_pk.to_string(),
        "id": format!("{story_pk}_{owner}"),
        "user": { "pk": owner.to_string() },
    })
}

fn limit(amount: u32) -> usize {
    if amount == 0 {
        usize::MAX
    } else {
        usize::try_from(amount).unwrap_or(usize::MAX)
    }
}

/// Mock automation client.
#[derive(Debug)]
pub struct MockClient {
    directory: Arc<MockDirectory>,
    session_id: Option<String>,
    user_id: Option<u64>,
    pub proxy: Option<String>,
    pub locale: Option<String>,
    pub timezone_offset: Option<i32>,
    pub request_timeout: Option<Duration>,
}

impl MockClient {
    /// Create an unauthenticated client backed by `directory`.
    #[must_use]
    pub const fn new(directory: Arc<MockDirectory>) -> Self {
        Self {
            directory,
            session_id: None,
            user_id: None,
            proxy: None,
            locale: None,
            timezone_offset: None,
            request_timeout: None,
        }
    }

    /// Create a client that already carries a session identifier.
    #[must_use]
    pub fn with_session(directory: Arc<MockDirectory>, session_id: &str, user_id: u64) -> Self {
        let mut client = Self::new(directory);
        client.session_id = Some(session_id.to_string());
        client.user_id = Some(user_id);
        client
    }

    /// User id of the logged-in account.
    #[must_use]
    pub const fn user_id(&self) -> Option<u64> {
        self.user_id
    }

    fn reachable(&self) -> Result<(), ClientError> {
        if self.directory.unreachable {
            Err(ClientError::Transport("connection refused".to_string()))
        } else {
            Ok(())
        }
    }

    fn authenticated(&self) -> Result<u64, ClientError> {
        self.reachable()?;
        self.user_id.ok_or(ClientError::LoginRequired)
    }

    fn lookup(&self, user_id: u64) -> Result<&MockAccount, ClientError> {
        self.directory
            .by_id(user_id)
            .ok_or_else(|| ClientError::NotFound(format!("user {user_id}")))
    }

    fn lookup_name(&self, username: &str) -> Result<&MockAccount, ClientError> {
        self.directory
            .by_username(username)
            .ok_or_else(|| ClientError::NotFound(format!("user {username}")))
    }

    fn story_owner(&self, story_pk: u64) -> Result<u64, ClientError> {
        self.directory
            .state()
            .stories
            .get(&story_pk)
            .copied()
            .ok_or_else(|| ClientError::NotFound(format!("story {story_pk}")))
    }

    fn user_map<'a>(accounts: impl Iterator<Item = &'a MockAccount>, amount: u32) -> Value {
        let map: Map<String, Value> = accounts
            .take(limit(amount))
            .map(|a| (a.user_id.to_string(), user_json(a)))
            .collect();
        Value::Object(map)
    }
}

#[async_trait]
impl AutomationClient for MockClient {
    fn set_proxy(&mut self, url: &str) -> Result<(), ConfigError> {
        self.proxy = Some(validate_proxy(url)?.to_string());
        Ok(())
    }

    fn set_locale(&mut self, locale: &str) -> Result<(), ConfigError> {
        validate_locale(locale)?;
        self.locale = Some(locale.to_string());
        Ok(())
    }

    fn set_timezone_offset(&mut self, offset: i32) -> Result<(), ConfigError> {
        validate_timezone_offset(offset)?;
        self.timezone_offset = Some(offset);
        Ok(())
    }

    fn set_request_timeout(&mut self, timeout: Duration) -> Result<(), ConfigError> {
        if timeout.is_zero() {
            return Err(ConfigError::InvalidTimeout);
        }
        self.request_timeout = Some(timeout);
        Ok(())
    }

    fn session_id(&self) -> Option<&str> {
        self.session_id.as_deref()
    }

    async fn login(&mut self, credentials: &Credentials) -> Result<Option<String>, ClientError> {
        self.reachable()?;

        let Some(account) = self
            .directory
            .by_username(&credentials.username)
            .filter(|a| a.password == credentials.password)
        else {
            return Ok(None);
        };

        if let Some(expected) = &account.verification_code {
            if credentials.verification_code != *expected {
                return Err(ClientError::ChallengeRequired(
                    "two-factor verification code required".to_string(),
                ));
            }
        }

        // Real session ids arrive percent-encoded, e.g. "1234%3Aabc%3A12".
        let session_id = format!("{}%3A{}", account.user_id, uuid::Uuid::new_v4().simple());
        self.user_id = Some(account.user_id);
        self.session_id = Some(session_id.clone());
        self.directory.state().logins += 1;

        Ok(Some(session_id))
    }

    async fn logout(&mut self) -> Result<bool, ClientError> {
        self.authenticated()?;
        self.user_id = None;
        self.directory.state().logouts += 1;
        Ok(true)
    }

    async fn media_info(&self, pk: u64) -> Result<Value, ClientError> {
        let owner = self.authenticated()?;
        Ok(json!({
            "pk": pk.to_string(),
            "code": crate::media_code::media_code_from_pk(pk),
            "user": { "pk": owner.to_string() },
        }))
    }

    async fn user_info(&self, user_id: u64, _use_cache: bool) -> Result<Value, ClientError> {
        self.authenticated()?;
        self.lookup(user_id).map(user_json)
    }

    async fn user_info_by_username(
        &self,
        username: &str,
        _use_cache: bool,
    ) -> Result<Value, ClientError> {
        self.authenticated()?;
        self.lookup_name(username).map(user_json)
    }

    async fn user_id_from_username(&self, username: &str) -> Result<u64, ClientError> {
        self.authenticated()?;
        self.lookup_name(username).map(|a| a.user_id)
    }

    async fn username_from_user_id(&self, user_id: u64) -> Result<String, ClientError> {
        self.authenticated()?;
        self.lookup(user_id).map(|a| a.username.clone())
    }

    async fn user_followers(
        &self,
        user_id: u64,
        _use_cache: bool,
        amount: u32,
    ) -> Result<Value, ClientError> {
        self.authenticated()?;
        self.lookup(user_id)?;
        let follows = self.directory.state().follows.clone();
        let followers = self
            .directory
            .accounts
            .iter()
            .filter(|a| follows.contains(&(a.user_id, user_id)));
        Ok(Self::user_map(followers, amount))
    }

    async fn user_following(
        &self,
        user_id: u64,
        _use_cache: bool,
        amount: u32,
    ) -> Result<Value, ClientError> {
        self.authenticated()?;
        self.lookup(user_id)?;
        let follows = self.directory.state().follows.clone();
        let following = self
            .directory
            .accounts
            .iter()
            .filter(|a| follows.contains(&(user_id, a.user_id)));
        Ok(Self::user_map(following, amount))
    }

    async fn user_follow(&self, user_id: u64) -> Result<bool, ClientError> {
        let me = self.authenticated()?;
        self.lookup(user_id)?;
        self.directory.state().follows.insert((me, user_id));
        Ok(true)
    }

    async fn user_unfollow(&self, user_id: u64) -> Result<bool, ClientError> {
        let me = self.authenticated()?;
        self.lookup(user_id)?;
        Ok(self.directory.state().follows.remove(&(me, user_id)))
    }

    async fn user_remove_follower(&self, user_id: u64) -> Result<bool, ClientError> {
        let me = self.authenticated()?;
        self.lookup(user_id)?;
        Ok(self.directory.state().follows.remove(&(user_id, me)))
    }

    async fn mute_posts_from_follow(
        &self,
        user_id: u64,
        revert: bool,
    ) -> Result<bool, ClientError> {
        let me = self.authenticated()?;
        self.lookup(user_id)?;
        let mut state = self.directory.state();
        if revert {
            state.muted_posts.remove(&(me, user_id));
        } else {
            state.muted_posts.insert((me, user_id));
        }
        Ok(true)
    }

    async fn mute_stories_from_follow(
        &self,
        user_id: u64,
        revert: bool,
    ) -> Result<bool, ClientError> {
        let me = self.authenticated()?;
        self.lookup(user_id)?;
        let mut state = self.directory.state();
        if revert {
            state.muted_stories.remove(&(me, user_id));
        } else {
            state.muted_stories.insert((me, user_id));
        }
        Ok(true)
    }

    async fn user_stories(&self, user_id: u64, amount: u32) -> Result<Value, ClientError> {
        self.authenticated()?;
        self.lookup(user_id)?;
        let stories: Vec<Value> = self
            .directory
            .state()
            .stories
            .iter()
            .filter(|&(_, &owner)| owner == user_id)
            .take(limit(amount))
            .map(|(&pk, &owner)| story_json(pk, owner))
            .collect();
        Ok(Value::Array(stories))
    }

    async fn story_info(&self, story_pk: u64, _use_cache: bool) -> Result<Value, ClientError> {
        self.authenticated()?;
        let owner = self.story_owner(story_pk)?;
        Ok(story_json(story_pk, owner))
    }

    async fn story_delete(&self, story_pk: u64) -> Result<bool, ClientError> {
        let me = self.authenticated()?;
        if self.story_owner(story_pk)? != me {
            return Ok(false);
        }
        Ok(self.directory.state().stories.remove(&story_pk).is_some())
    }

    async fn story_seen(
        &self,
        story_pks: &[u64],
        _skipped_story_pks: &[u64],
    ) -> Result<bool, ClientError> {
        let me = self.authenticated()?;
        for &story_pk in story_pks {
            self.story_owner(story_pk)?;
        }
        self.directory
            .state()
            .seen
            .extend(story_pks.iter().map(|&pk| (me, pk)));
        Ok(true)
    }

    async fn story_like(&self, story_id: &str, revert: bool) -> Result<bool, ClientError> {
        let me = self.authenticated()?;
        let story_pk = story_id
            .split('_')
            .next()
            .and_then(|pk| pk.parse::<u64>().ok())
            .ok_or_else(|| ClientError::NotFound(format!("story {story_id}")))?;
        self.story_owner(story_pk)?;

        let mut state = self.directory.state();
        if revert {
            state.story_likes.remove(&(me, story_pk));
        } else {
            state.story_likes.insert((me, story_pk));
        }
        Ok(true)
    }

    async fn insights_media_feed_all(
        &self,
        query: &InsightsFeedQuery,
    ) -> Result<Value, ClientError> {
        let me = self.authenticated()?;
        let medias: Vec<Value> = self
            .directory
            .state()
            .stories
            .iter()
            .filter(|&(_, &owner)| owner == me)
            .take(limit(query.count))
            .map(|(&pk, _)| {
                json!({
                    "pk": pk.to_string(),
                    "post_type": query.post_type,
                    "time_frame": query.time_frame,
                    "data_ordering": query.data_ordering,
                })
            })
            .collect();
        Ok(Value::Array(medias))
    }

    async fn insights_account(&self) -> Result<Value, ClientError> {
        let me = self.authenticated()?;
        let state = self.directory.state();
        let followers = state.follows.iter().filter(|&&(_, target)| target == me).count();
        let following = state.follows.iter().filter(|&&(source, _)| source == me).count();
        Ok(json!({
            "user_id": me.to_string(),
            "followers_count": followers,
            "following_count": following,
        }))
    }

    async fn insights_media(&self, media_pk: u64) -> Result<Value, ClientError> {
        self.authenticated()?;
        Ok(json!({
            "media_pk": media_pk.to_string(),
            "code": crate::media_code::media_code_from_pk(media_pk),
            "reach_count": 0,
        }))
    }
}

/// Factory producing `MockClient`s over one shared directory.
#[derive(Debug)]
pub struct MockFactory {
    directory: Arc<MockDirectory>,
    config: ClientConfig,
    created: AtomicUsize,
}

impl MockFactory {
    /// Create a factory with default client configuration.
    #[must_use]
    pub fn new(directory: Arc<MockDirectory>) -> Self {
        Self::with_config(directory, ClientConfig::default())
    }

    /// Create a factory applying `config` to every client.
    #[must_use]
    pub const fn with_config(directory: Arc<MockDirectory>, config: ClientConfig) -> Self {
        Self {
            directory,
            config,
            created: AtomicUsize::new(0),
        }
    }

    /// Shared directory behind every client.
    #[must_use]
    pub fn directory(&self) -> Arc<MockDirectory> {
        Arc::clone(&self.directory)
    }

    /// Number of clients created so far.
    #[must_use]
    pub fn created(&self) -> usize {
        self.created.load(Ordering::Relaxed)
    }
}

impl ClientFactory for MockFactory {
    type Client = MockClient;

    fn create(&self) -> Result<MockClient, ConfigError> {
        let mut client = MockClient::new(Arc::clone(&self.directory));
        self.config.apply(&mut client)?;
        self.created.fetch_add(1, Ordering::Relaxed);
        Ok(client)
    }
}
