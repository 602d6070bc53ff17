//! Gateway-backed automation client.

use std::time::Duration;

use async_trait::async_trait;
use igrest_core::{
    AutomationClient, ClientError, ConfigError, Credentials, DEFAULT_REQUEST_TIMEOUT,
    InsightsFeedQuery,
    config::{validate_locale, validate_proxy, validate_timezone_offset},
};
use reqwest::header::{ACCEPT_LANGUAGE, COOKIE};
use serde::{Serialize, de::DeserializeOwned};
use serde_json::Value;
use url::Url;

use crate::protocol::{
    ErrorBody, LoginRequest, LoginResponse, MediaRequest, MuteRequest, RelationsRequest,
    StoryLikeRequest, StoryRequest, StorySeenRequest, TIMEZONE_HEADER, UserRequest,
    UserStoriesRequest, UsernameRequest, paths,
};

#[derive(Debug, Clone)]
struct Settings {
    proxy: Option<Url>,
    locale: Option<String>,
    timezone_offset: Option<i32>,
    timeout: Duration,
}

/// Automation client that forwards every operation to a gateway.
///
/// Proxy and timeout live in the underlying `reqwest::Client`, which is
/// rebuilt whenever one of them changes. Locale, timezone and the session
/// cookie are sent as headers on each call.
#[derive(Debug)]
pub struct GatewayClient {
    base_url: Url,
    http: reqwest::Client,
    settings: Settings,
    session_id: Option<String>,
}

impl GatewayClient {
    /// Create an unauthenticated client for the gateway at `base_url`.
    ///
    /// # Errors
    /// Returns error if the HTTP client cannot be built.
    pub fn new(mut base_url: Url) -> Result<Self, ConfigError> {
        // `Url::join` replaces the last segment unless the path ends in '/'.
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }

        let settings = Settings {
            proxy: None,
            locale: None,
            timezone_offset: None,
            timeout: DEFAULT_REQUEST_TIMEOUT,
        };
        let http = build_http(&settings)?;

        Ok(Self {
            base_url,
            http,
            settings,
            session_id: None,
        })
    }

    /// Gateway base URL.
    #[must_use]
    pub const fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Configured per-request timeout.
    #[must_use]
    pub const fn request_timeout(&self) -> Duration {
        self.settings.timeout
    }

    fn rebuild(&mut self, settings: Settings) -> Result<(), ConfigError> {
        self.http = build_http(&settings)?;
        self.settings = settings;
        Ok(())
    }

    async fn call<B, T>(&self, path: &str, body: &B) -> Result<T, ClientError>
    where
        B: Serialize + Sync,
        T: DeserializeOwned,
    {
        let url = self
            .base_url
            .join(path)
            .map_err(|e| ClientError::Transport(e.to_string()))?;

        let mut request = self.http.post(url).json(body);
        if let Some(locale) = &self.settings.locale {
            request = request.header(ACCEPT_LANGUAGE, locale.replace('_', "-"));
        }
        if let Some(offset) = self.settings.timezone_offset {
            request = request.header(TIMEZONE_HEADER, offset.to_string());
        }
        if let Some(session_id) = &self.session_id {
            request = request.header(COOKIE, format!("sessionid={session_id}"));
        }

        let response = request.send().await.map_err(transport_error)?;
        let status = response.status();
        if status.is_success() {
            return response
                .json::<T>()
                .await
                .map_err(|e| ClientError::Decode(e.to_string()));
        }

        let body = response.json::<ErrorBody>().await.unwrap_or_default();
        tracing::debug!(%status, path, detail = %body.detail, "Gateway call failed");
        Err(body.into_client_error(status.as_u16()))
    }
}

fn build_http(settings: &Settings) -> Result<reqwest::Client, ConfigError> {
    let mut builder = reqwest::Client::builder()
        .timeout(settings.timeout)
        .user_agent(concat!("igrest/", env!("CARGO_PKG_VERSION")));

    if let Some(proxy) = &settings.proxy {
        let proxy = reqwest::Proxy::all(proxy.as_str()).map_err(|e| ConfigError::InvalidProxy {
            url: proxy.to_string(),
            reason: e.to_string(),
        })?;
        builder = builder.proxy(proxy);
    }

    builder.build().map_err(|e| ConfigError::Build(e.to_string()))
}

fn transport_error(err: reqwest::Error) -> ClientError {
    if err.is_timeout() {
        ClientError::Timeout
    } else {
        ClientError::Transport(err.to_string())
    }
}

#[async_trait]
impl AutomationClient for GatewayClient {
    fn set_proxy(&mut self, url: &str) -> Result<(), ConfigError> {
        let proxy = validate_proxy(url)?;
        let settings = Settings {
            proxy: Some(proxy),
            ..self.settings.clone()
        };
        self.rebuild(settings)
    }

    fn set_locale(&mut self, locale: &str) -> Result<(), ConfigError> {
        validate_locale(locale)?;
        self.settings.locale = Some(locale.to_string());
        Ok(())
    }

    fn set_timezone_offset(&mut self, offset: i32) -> Result<(), ConfigError> {
        validate_timezone_offset(offset)?;
        self.settings.timezone_offset = Some(offset);
        Ok(())
    }

    fn set_request_timeout(&mut self, timeout: Duration) -> Result<(), ConfigError> {
        if timeout.is_zero() {
            return Err(ConfigError::InvalidTimeout);
        }
        let settings = Settings {
            timeout,
            ..self.settings.clone()
        };
        self.rebuild(settings)
    }

    fn session_id(&self) -> Option<&str> {
        self.session_id.as_deref()
    }

    async fn login(&mut self, credentials: &Credentials) -> Result<Option<String>, ClientError> {
        let request = LoginRequest::from(credentials);
        let response: LoginResponse = match self.call(paths::LOGIN, &request).await {
            Ok(response) => response,
            Err(ClientError::LoginRequired) => LoginResponse::default(),
            Err(e) => return Err(e),
        };

        let session_id = response.sessionid.filter(|id| !id.trim().is_empty());
        if session_id.is_some() {
            self.session_id.clone_from(&session_id);
        }
        Ok(session_id)
    }

    async fn logout(&mut self) -> Result<bool, ClientError> {
        let done: bool = self.call(paths::LOGOUT, &Value::Null).await?;
        if done {
            self.session_id = None;
        }
        Ok(done)
    }

    async fn media_info(&self, pk: u64) -> Result<Value, ClientError> {
        self.call(paths::MEDIA_INFO, &MediaRequest { pk }).await
    }

    async fn user_info(&self, user_id: u64, use_cache: bool) -> Result<Value, ClientError> {
        self.call(paths::USER_INFO, &UserRequest { user_id, use_cache })
            .await
    }

    async fn user_info_by_username(
        &self,
        username: &str,
        use_cache: bool,
    ) -> Result<Value, ClientError> {
        let request = UsernameRequest {
            username: username.to_string(),
            use_cache,
        };
        self.call(paths::USER_INFO_BY_USERNAME, &request).await
    }

    async fn user_id_from_username(&self, username: &str) -> Result<u64, ClientError> {
        let request = UsernameRequest {
            username: username.to_string(),
            use_cache: true,
        };
        self.call(paths::USER_ID_FROM_USERNAME, &request).await
    }

    async fn username_from_user_id(&self, user_id: u64) -> Result<String, ClientError> {
        let request = UserRequest {
            user_id,
            use_cache: true,
        };
        self.call(paths::USERNAME_FROM_USER_ID, &request).await
    }

    async fn user_followers(
        &self,
        user_id: u64,
        use_cache: bool,
        amount: u32,
    ) -> Result<Value, ClientError> {
        let request = RelationsRequest {
            user_id,
            use_cache,
            amount,
        };
        self.call(paths::USER_FOLLOWERS, &request).await
    }

    async fn user_following(
        &self,
        user_id: u64,
        use_cache: bool,
        amount: u32,
    ) -> Result<Value, ClientError> {
        let request = RelationsRequest {
            user_id,
            use_cache,
            amount,
        };
        self.call(paths::USER_FOLLOWING, &request).await
    }

    async fn user_follow(&self, user_id: u64) -> Result<bool, ClientError> {
        let request = UserRequest {
            user_id,
            use_cache: false,
        };
        self.call(paths::USER_FOLLOW, &request).await
    }

    async fn user_unfollow(&self, user_id: u64) -> Result<bool, ClientError> {
        let request = UserRequest {
            user_id,
            use_cache: false,
        };
        self.call(paths::USER_UNFOLLOW, &request).await
    }

    async fn user_remove_follower(&self, user_id: u64) -> Result<bool, ClientError> {
        let request = UserRequest {
            user_id,
            use_cache: false,
        };
        self.call(paths::USER_REMOVE_FOLLOWER, &request).await
    }

    async fn mute_posts_from_follow(
        &self,
        user_id: u64,
        revert: bool,
    ) -> Result<bool, ClientError> {
        self.call(paths::MUTE_POSTS_FROM_FOLLOW, &MuteRequest { user_id, revert })
            .await
    }

    async fn mute_stories_from_follow(
        &self,
        user_id: u64,
        revert: bool,
    ) -> Result<bool, ClientError> {
        self.call(paths::MUTE_STORIES_FROM_FOLLOW, &MuteRequest { user_id, revert })
            .await
    }

    async fn user_stories(&self, user_id: u64, amount: u32) -> Result<Value, ClientError> {
        self.call(paths::USER_STORIES, &UserStoriesRequest { user_id, amount })
            .await
    }

    async fn story_info(&self, story_pk: u64, use_cache: bool) -> Result<Value, ClientError> {
        self.call(paths::STORY_INFO, &StoryRequest { story_pk, use_cache })
            .await
    }

    async fn story_delete(&self, story_pk: u64) -> Result<bool, ClientError> {
        let request = StoryRequest {
            story_pk,
            use_cache: false,
        };
        self.call(paths::STORY_DELETE, &request).await
    }

    async fn story_seen(
        &self,
        story_pks: &[u64],
        skipped_story_pks: &[u64],
    ) -> Result<bool, ClientError> {
        let request = StorySeenRequest {
            story_pks: story_pks.to_vec(),
            skipped_story_pks: skipped_story_pks.to_vec(),
        };
        self.call(paths::STORY_SEEN, &request).await
    }

    async fn story_like(&self, story_id: &str, revert: bool) -> Result<bool, ClientError> {
        let request = StoryLikeRequest {
            story_id: story_id.to_string(),
            revert,
        };
        self.call(paths::STORY_LIKE, &request).await
    }

    async fn insights_media_feed_all(
        &self,
        query: &InsightsFeedQuery,
    ) -> Result<Value, ClientError> {
        self.call(paths::INSIGHTS_MEDIA_FEED_ALL, query).await
    }

    async fn insights_account(&self) -> Result<Value, ClientError> {
        self.call(paths::INSIGHTS_ACCOUNT, &Value::Null).await
    }

    async fn insights_media(&self, media_pk: u64) -> Result<Value, ClientError> {
        self.call(paths::INSIGHTS_MEDIA, &MediaRequest { pk: media_pk })
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use axum::{
        Json, Router,
        http::{HeaderMap, StatusCode},
        routing::post,
    };
    use serde_json::json;

    async fn spawn_gateway() -> Url {
        async fn login(Json(request): Json<LoginRequest>) -> Json<Value> {
            if request.password == "wonderland" {
                Json(json!({ "sessionid": "1%3Aabc" }))
            } else {
                Json(json!({ "sessionid": null }))
            }
        }

        async fn user_info(headers: HeaderMap, Json(request): Json<UserRequest>) -> (StatusCode, Json<Value>) {
            let cookie = headers
                .get(COOKIE)
                .and_then(|v| v.to_str().ok())
                .unwrap_or_default();
            if cookie != "sessionid=1%3Aabc" {
                return (
                    StatusCode::UNAUTHORIZED,
                    Json(json!({ "detail": "login_required" })),
                );
            }
            if request.user_id != 2 {
                return (StatusCode::NOT_FOUND, Json(json!({ "detail": "no such user" })));
            }
            let locale = headers
                .get(ACCEPT_LANGUAGE)
                .and_then(|v| v.to_str().ok())
                .unwrap_or_default();
            let offset = headers
                .get(TIMEZONE_HEADER)
                .and_then(|v| v.to_str().ok())
                .unwrap_or_default();
            (
                StatusCode::OK,
                Json(json!({ "pk": "2", "locale": locale, "offset": offset })),
            )
        }

        async fn story_like(Json(request): Json<StoryLikeRequest>) -> Json<bool> {
            Json(request.story_id == "900_2" && request.revert)
        }

        async fn media_feed_all(Json(query): Json<InsightsFeedQuery>) -> Json<Value> {
            Json(json!([{ "count": query.count, "time_frame": query.time_frame }]))
        }

        let app = Router::new()
            .route("/gw/auth/login", post(login))
            .route("/gw/user/info", post(user_info))
            .route("/gw/story/like", post(story_like))
            .route("/gw/insights/media_feed_all", post(media_feed_all));

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Url::parse(&format!("http://{addr}/gw")).unwrap()
    }

    #[test]
    fn test_base_url_gets_trailing_slash() {
        let client = GatewayClient::new(Url::parse("http://gateway.local/api").unwrap()).unwrap();
        assert_eq!(client.base_url().as_str(), "http://gateway.local/api/");
        assert_eq!(client.request_timeout(), DEFAULT_REQUEST_TIMEOUT);
    }

    #[test]
    fn test_setters_validate() {
        let mut client = GatewayClient::new(Url::parse("http://gateway.local/").unwrap()).unwrap();

        assert!(client.set_proxy("socks5://127.0.0.1:1080").is_ok());
        assert!(matches!(
            client.set_proxy("gopher://proxy"),
            Err(ConfigError::InvalidProxy { .. })
        ));
        assert!(client.set_locale("en_US").is_ok());
        assert!(client.set_locale("nope").is_err());
        assert!(client.set_timezone_offset(99_999).is_err());
        assert_eq!(
            client.set_request_timeout(Duration::ZERO),
            Err(ConfigError::InvalidTimeout)
        );
        assert!(client.set_request_timeout(Duration::from_millis(250)).is_ok());
        assert_eq!(client.request_timeout(), Duration::from_millis(250));
    }

    #[tokio::test]
    async fn test_login_and_call_through_gateway() {
        let base = spawn_gateway().await;
        let mut client = GatewayClient::new(base).unwrap();
        client.set_locale("en_US").unwrap();
        client.set_timezone_offset(-14_400).unwrap();

        let rejected = client
            .login(&Credentials::new("alice", "wrong"))
            .await
            .unwrap();
        assert!(rejected.is_none());
        assert!(client.session_id().is_none());

        let session = client
            .login(&Credentials::new("alice", "wonderland"))
            .await
            .unwrap();
        assert_eq!(session.as_deref(), Some("1%3Aabc"));
        assert_eq!(client.session_id(), Some("1%3Aabc"));

        let info = client.user_info(2, true).await.unwrap();
        assert_eq!(info["locale"], "en-US");
        assert_eq!(info["offset"], "-14400");

        assert!(matches!(
            client.user_info(3, true).await,
            Err(ClientError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_unlike_and_insights_bodies() {
        let base = spawn_gateway().await;
        let client = GatewayClient::new(base).unwrap();

        assert!(client.story_unlike("900_2").await.unwrap());
        assert!(!client.story_like("900_2", false).await.unwrap());

        let query = InsightsFeedQuery {
            time_frame: igrest_core::insights::TimeFrame::OneWeek,
            count: 3,
            ..InsightsFeedQuery::default()
        };
        let feed = client.insights_media_feed_all(&query).await.unwrap();
        assert_eq!(feed[0]["count"], 3);
        assert_eq!(feed[0]["time_frame"], "ONE_WEEK");
    }

    #[tokio::test]
    async fn test_calls_without_session_need_login() {
        let base = spawn_gateway().await;
        let client = GatewayClient::new(base).unwrap();

        assert!(matches!(
            client.user_info(2, true).await,
            Err(ClientError::LoginRequired)
        ));
    }

    #[tokio::test]
    async fn test_unreachable_gateway_is_transport_error() {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let client = GatewayClient::new(Url::parse(&format!("http://{addr}/")).unwrap()).unwrap();
        assert!(matches!(
            client.media_info(1).await,
            Err(ClientError::Transport(_) | ClientError::Timeout)
        ));
    }
}
