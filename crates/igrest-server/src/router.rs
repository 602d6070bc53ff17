//! HTTP router assembly.

use std::{collections::BTreeMap, sync::Arc};

use axum::{Json, Router, routing::get};
use igrest_core::ClientFactory;
use igrest_session::SessionRegistry;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::{routes, state::AppState};

/// Create the application router over a session registry.
///
/// # Example
/// ```ignore
/// let registry = Arc::new(SessionRegistry::new(factory));
/// let app = create_router(Arc::clone(&registry));
/// axum::serve(listener, app).await?;
/// ```
pub fn create_router<F: ClientFactory>(registry: Arc<SessionRegistry<F>>) -> Router {
    Router::new()
        .route("/", get(root))
        .route("/version", get(version))
        .nest("/auth", routes::auth::router())
        .nest("/media", routes::media::router())
        .nest("/user", routes::user::router())
        .nest("/story", routes::story::router())
        .nest("/insights", routes::insights::router())
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(AppState::new(registry))
}

async fn root() -> Json<&'static str> {
    Json("igrest is running; POST /auth/login to open a session")
}

async fn version() -> Json<BTreeMap<&'static str, &'static str>> {
    Json(BTreeMap::from([
        ("igrest", env!("CARGO_PKG_VERSION")),
        ("igrest-core", igrest_core::VERSION),
    ]))
}

#[cfg(test)]
mod tests {
    use std::{sync::Arc, time::Duration};

    use axum::{
        body::Body,
        http::{Request, StatusCode, header},
    };
    use igrest_core::mock::{MockAccount, MockDirectory, MockFactory};
    use serde_json::Value;
    use tower::ServiceExt;

    use super::*;

    struct Harness {
        registry: Arc<SessionRegistry<MockFactory>>,
        app: Router,
    }

    impl Harness {
        fn new() -> Self {
            Self::with_directory(MockDirectory::new(vec![
                MockAccount::new(1, "alice", "wonderland"),
                MockAccount::new(2, "bob", "builder"),
            ]))
        }

        fn with_directory(directory: MockDirectory) -> Self {
            let registry = Arc::new(SessionRegistry::new(MockFactory::new(Arc::new(directory))));
            let app = create_router(Arc::clone(&registry));
            Self { registry, app }
        }

        async fn send(&self, request: Request<Body>) -> (StatusCode, String) {
            let response = self.app.clone().oneshot(request).await.unwrap();
            let status = response.status();
            let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
                .await
                .unwrap();
            (status, String::from_utf8(bytes.to_vec()).unwrap())
        }

        async fn post(&self, path: &str, form: &str) -> (StatusCode, String) {
            let request = Request::post(path)
                .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
                .body(Body::from(form.to_string()))
                .unwrap();
            self.send(request).await
        }

        async fn get(&self, path: &str) -> (StatusCode, String) {
            self.send(Request::get(path).body(Body::empty()).unwrap())
                .await
        }

        /// Log in and return the session id escaped for a form body.
        async fn form_session(&self, username: &str, password: &str) -> String {
            self.login(username, password).await.replace('%', "%25")
        }

        async fn login(&self, username: &str, password: &str) -> String {
            let (status, body) = self
                .post("/auth/login", &format!("username={username}&password={password}"))
                .await;
            assert_eq!(status, StatusCode::OK, "{body}");
            serde_json::from_str(&body).unwrap()
        }
    }

    fn detail(body: &str) -> String {
        let value: Value = serde_json::from_str(body).unwrap();
        value["detail"].as_str().unwrap_or_default().to_string()
    }

    #[tokio::test]
    async fn test_pk_from_code_is_exact() {
        let harness = Harness::new();
        let (status, body) = harness.get("/media/pk_from_code?code=B1LbfVPlwIA").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, "2110901750722920960");

        let (status, body) = harness.get("/media/code_from_pk?pk=2110901750722920960").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, "\"B1LbfVPlwIA\"");

        let (status, _) = harness.get("/media/pk_from_code?code=bad%21").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_pk_from_url() {
        let harness = Harness::new();
        let (status, body) = harness
            .get("/media/pk_from_url?url=https%3A%2F%2Fwww.instagram.com%2Fp%2FB1LbfVPlwIA%2F")
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, "2110901750722920960");
    }

    #[tokio::test]
    async fn test_login_stores_session() {
        let harness = Harness::new();
        let session_id = harness.login("alice", "wonderland").await;

        assert!(session_id.starts_with("1%3A"));
        assert!(harness.registry.contains(&session_id));
        assert_eq!(harness.registry.len(), 1);
    }

    #[tokio::test]
    async fn test_rejected_login_stores_nothing() {
        let harness = Harness::new();
        let (status, body) = harness
            .post("/auth/login", "username=alice&password=wrong")
            .await;

        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert!(detail(&body).contains("Login rejected"));
        assert!(harness.registry.is_empty());
    }

    #[tokio::test]
    async fn test_login_with_bad_override_is_bad_request() {
        let harness = Harness::new();
        let (status, body) = harness
            .post(
                "/auth/login",
                "username=alice&password=wonderland&locale=klingon",
            )
            .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(detail(&body).contains("klingon"));
        assert!(harness.registry.is_empty());
    }

    #[tokio::test]
    async fn test_unreachable_upstream_is_bad_gateway() {
        let harness = Harness::with_directory(MockDirectory::unreachable());
        let (status, _) = harness
            .post("/auth/login", "username=alice&password=wonderland")
            .await;

        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert!(harness.registry.is_empty());
    }

    #[tokio::test]
    async fn test_unknown_session_asks_for_login() {
        let harness = Harness::new();
        let (status, body) = harness
            .post("/user/user_info", "sessionid=missing&user_id=2")
            .await;

        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert!(detail(&body).contains("log in again"));
    }

    #[tokio::test]
    async fn test_session_id_accepted_decoded_and_padded() {
        let harness = Harness::new();
        let session_id = harness.login("alice", "wonderland").await;
        let decoded = session_id.replace("%3A", ":");

        // "%20" decodes to padding around the key; "%25" keeps the raw escape.
        for form_value in [
            session_id.replace('%', "%25"),
            decoded.clone(),
            format!("%20{decoded}%20"),
        ] {
            let (status, body) = harness
                .post(
                    "/user/user_info",
                    &format!("sessionid={form_value}&user_id=2"),
                )
                .await;
            assert_eq!(status, StatusCode::OK, "sessionid={form_value}: {body}");
            let user: Value = serde_json::from_str(&body).unwrap();
            assert_eq!(user["username"], "bob");
        }
    }

    #[tokio::test]
    async fn test_user_routes() {
        let harness = Harness::new();
        let session_id = harness.login("alice", "wonderland").await;
        let sid = session_id.replace('%', "%25");

        let (status, body) = harness
            .post("/user/user_follow", &format!("sessionid={sid}&user_id=2"))
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, "true");

        let (_, body) = harness
            .post("/user/user_followers", &format!("sessionid={sid}&user_id=2"))
            .await;
        let followers: Value = serde_json::from_str(&body).unwrap();
        assert_eq!(followers["1"]["username"], "alice");

        let (_, body) = harness
            .post("/user/user_following", &format!("sessionid={sid}&user_id=1&amount=1"))
            .await;
        let following: Value = serde_json::from_str(&body).unwrap();
        assert_eq!(following.as_object().map(serde_json::Map::len), Some(1));

        let (_, body) = harness
            .post(
                "/user/user_id_from_username",
                &format!("sessionid={sid}&username=bob"),
            )
            .await;
        assert_eq!(body, "2");

        let (_, body) = harness
            .post(
                "/user/username_from_user_id",
                &format!("sessionid={sid}&user_id=2"),
            )
            .await;
        assert_eq!(body, "\"bob\"");

        let (_, body) = harness
            .post(
                "/user/user_info_by_username",
                &format!("sessionid={sid}&username=bob&use_cache=false"),
            )
            .await;
        let user: Value = serde_json::from_str(&body).unwrap();
        assert_eq!(user["pk"], "2");

        let (status, _) = harness
            .post("/user/user_info", &format!("sessionid={sid}&user_id=99"))
            .await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (_, body) = harness
            .post("/user/user_unfollow", &format!("sessionid={sid}&user_id=2"))
            .await;
        assert_eq!(body, "true");
    }

    #[tokio::test]
    async fn test_media_info_requires_session() {
        let harness = Harness::new();
        let session_id = harness.login("bob", "builder").await;
        let sid = session_id.replace('%', "%25");

        let (status, body) = harness
            .post("/media/info", &format!("sessionid={sid}&pk=2110901750722920960"))
            .await;
        assert_eq!(status, StatusCode::OK);
        let media: Value = serde_json::from_str(&body).unwrap();
        assert_eq!(media["code"], "B1LbfVPlwIA");

        let (status, _) = harness
            .post("/media/info", "sessionid=nope&pk=1")
            .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_logout_removes_session() {
        let harness = Harness::new();
        let session_id = harness.login("alice", "wonderland").await;
        let sid = session_id.replace('%', "%25");

        let (status, body) = harness
            .post("/auth/logout", &format!("sessionid={sid}"))
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, "true");
        assert!(harness.registry.is_empty());
        assert_eq!(harness.registry.factory().directory().logout_count(), 1);

        let (status, _) = harness
            .post("/auth/logout", &format!("sessionid={sid}"))
            .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_follow_management_routes() {
        let harness = Harness::new();
        let alice = harness.form_session("alice", "wonderland").await;
        let bob = harness.form_session("bob", "builder").await;
        let directory = harness.registry.factory().directory();

        harness
            .post("/user/user_follow", &format!("sessionid={bob}&user_id=1"))
            .await;
        assert!(directory.is_following(2, 1));

        for (path, muted) in [
            ("/user/mute_posts_from_follow", true),
            ("/user/unmute_posts_from_follow", false),
        ] {
            let (status, body) = harness
                .post(path, &format!("sessionid={alice}&user_id=2"))
                .await;
            assert_eq!(status, StatusCode::OK, "{path}: {body}");
            assert_eq!(directory.is_muting_posts(1, 2), muted, "{path}");
        }

        harness
            .post(
                "/user/mute_stories_from_follow",
                &format!("sessionid={alice}&user_id=2"),
            )
            .await;
        assert!(directory.is_muting_stories(1, 2));
        harness
            .post(
                "/user/mute_stories_from_follow",
                &format!("sessionid={alice}&user_id=2&revert=true"),
            )
            .await;
        assert!(!directory.is_muting_stories(1, 2));
        harness
            .post(
                "/user/unmute_stories_from_follow",
                &format!("sessionid={alice}&user_id=2"),
            )
            .await;
        assert!(!directory.is_muting_stories(1, 2));

        let (status, body) = harness
            .post(
                "/user/user_remove_follower",
                &format!("sessionid={alice}&user_id=2"),
            )
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, "true");
        assert!(!directory.is_following(2, 1));
    }

    #[tokio::test]
    async fn test_story_routes() {
        let harness = Harness::new();
        let alice = harness.form_session("alice", "wonderland").await;
        let directory = harness.registry.factory().directory();
        directory.add_story(2, 900);
        directory.add_story(2, 901);
        directory.add_story(1, 800);

        let (status, body) = harness
            .post(
                "/story/user_stories",
                &format!("sessionid={alice}&user_id=2"),
            )
            .await;
        assert_eq!(status, StatusCode::OK);
        let stories: Value = serde_json::from_str(&body).unwrap();
        assert_eq!(stories.as_array().map(Vec::len), Some(2));

        let (_, body) = harness
            .post("/story/info", &format!("sessionid={alice}&story_pk=901"))
            .await;
        let story: Value = serde_json::from_str(&body).unwrap();
        assert_eq!(story["id"], "901_2");

        let (status, body) = harness
            .post(
                "/story/seen",
                &format!("sessionid={alice}&story_pks=900%2C901"),
            )
            .await;
        assert_eq!(status, StatusCode::OK, "{body}");
        assert!(directory.has_seen(1, 900) && directory.has_seen(1, 901));

        harness
            .post("/story/like", &format!("sessionid={alice}&story_id=900_2"))
            .await;
        assert!(directory.likes_story(1, 900));
        let (_, body) = harness
            .post("/story/unlike", &format!("sessionid={alice}&story_id=900_2"))
            .await;
        assert_eq!(body, "true");
        assert!(!directory.likes_story(1, 900));

        let (_, body) = harness
            .post("/story/delete", &format!("sessionid={alice}&story_pk=900"))
            .await;
        assert_eq!(body, "false");
        let (_, body) = harness
            .post("/story/delete", &format!("sessionid={alice}&story_pk=800"))
            .await;
        assert_eq!(body, "true");

        let (status, _) = harness
            .post("/story/info", &format!("sessionid={alice}&story_pk=800"))
            .await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, _) = harness
            .post("/story/info", "sessionid=nope&story_pk=901")
            .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_story_pk_from_url() {
        let harness = Harness::new();
        let (status, body) = harness
            .get("/story/pk_from_url?url=https%3A%2F%2Fwww.instagram.com%2Fstories%2Fbob%2F2581281926631793076%2F")
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, "2581281926631793076");

        let (status, _) = harness
            .get("/story/pk_from_url?url=https%3A%2F%2Fwww.instagram.com%2Fbob%2F")
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_insights_routes() {
        let harness = Harness::new();
        let alice = harness.form_session("alice", "wonderland").await;
        let directory = harness.registry.factory().directory();
        directory.add_story(1, 800);
        directory.add_story(1, 801);

        let (status, body) = harness
            .post(
                "/insights/media_feed_all",
                &format!("sessionid={alice}&time_frame=ONE_WEEK&count=1"),
            )
            .await;
        assert_eq!(status, StatusCode::OK, "{body}");
        let feed: Value = serde_json::from_str(&body).unwrap();
        assert_eq!(feed.as_array().map(Vec::len), Some(1));
        assert_eq!(feed[0]["time_frame"], "ONE_WEEK");
        assert_eq!(feed[0]["post_type"], "ALL");

        let (status, body) = harness
            .post("/insights/account", &format!("sessionid={alice}"))
            .await;
        assert_eq!(status, StatusCode::OK);
        let account: Value = serde_json::from_str(&body).unwrap();
        assert_eq!(account["user_id"], "1");

        let (_, body) = harness
            .post(
                "/insights/media",
                &format!("sessionid={alice}&media_pk=2110901750722920960"),
            )
            .await;
        let media: Value = serde_json::from_str(&body).unwrap();
        assert_eq!(media["code"], "B1LbfVPlwIA");

        let (status, _) = harness
            .post(
                "/insights/media_feed_all",
                &format!("sessionid={alice}&data_ordering=LOUDNESS"),
            )
            .await;
        assert!(status.is_client_error());
    }

    #[tokio::test]
    async fn test_one_session_serves_one_request_at_a_time() {
        let harness = Harness::new();
        let alice_raw = harness.login("alice", "wonderland").await;
        let alice = alice_raw.replace('%', "%25");
        let bob = harness.form_session("bob", "builder").await;

        let handle = harness.registry.get(&alice_raw).unwrap();
        let guard = handle.lock().await;

        // Waits for the handle rather than running alongside the holder.
        let blocked = tokio::time::timeout(
            Duration::from_millis(100),
            harness.post("/user/user_info", &format!("sessionid={alice}&user_id=2")),
        )
        .await;
        assert!(blocked.is_err());

        let queued = {
            let request = Request::post("/user/user_info")
                .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
                .body(Body::from(format!("sessionid={alice}&user_id=2")))
                .unwrap();
            let app = harness.app.clone();
            tokio::spawn(async move { app.oneshot(request).await.unwrap().status() })
        };
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert!(!queued.is_finished());

        let (status, _) = tokio::time::timeout(
            Duration::from_secs(5),
            harness.post("/user/user_info", &format!("sessionid={bob}&user_id=1")),
        )
        .await
        .unwrap();
        assert_eq!(status, StatusCode::OK);

        drop(guard);
        let status = tokio::time::timeout(Duration::from_secs(5), queued)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(status, StatusCode::OK);
    }

    #[tokio::test]
    async fn test_version() {
        let harness = Harness::new();
        let (status, body) = harness.get("/version").await;
        assert_eq!(status, StatusCode::OK);
        let versions: Value = serde_json::from_str(&body).unwrap();
        assert_eq!(versions["igrest"], env!("CARGO_PKG_VERSION"));
    }
}
