use std::sync::{Arc, Mutex};

use axum::http::{HeaderName, HeaderValue, StatusCode};
use axum_test::TestServer;
use serde_json::{json, Value};

use melodeck_api::{
    config::Config,
    db::Store,
    error::{AppError, AppResult},
    models::{ArtistCatalog, CatalogArtistRef, CatalogShelf, CatalogTrack, StreamSource, Thumbnail},
    routes::{create_router, AppState},
    services::{ExternalCatalog, Mailer, PasswordHashing},
};

// ============================================================================
// Fakes
// ============================================================================

/// Catalog with a fixed, tiny library. `failing` turns every call into an error.
struct FakeCatalog {
    failing: bool,
}

fn catalog_song(video_id: &str, artist: &str, artist_id: Option<&str>) -> CatalogTrack {
    CatalogTrack {
        video_id: Some(video_id.to_string()),
        title: format!("Song {}", video_id),
        artists: vec![CatalogArtistRef {
            name: artist.to_string(),
            id: artist_id.map(str::to_string),
        }],
        thumbnails: vec![Thumbnail {
            url: format!("https://img.example/{}.jpg", video_id),
            width: Some(120),
            height: Some(120),
        }],
    }
}

#[async_trait::async_trait]
impl ExternalCatalog for FakeCatalog {
    async fn search_songs(&self, query: &str, limit: usize) -> AppResult<Vec<CatalogTrack>> {
        if self.failing {
            return Err(AppError::ExternalApi("gateway down".to_string()));
        }
        let songs = if query == "Hits Poland Rap Pop" {
            vec![
                catalog_song("hit1", "Quebonafide", None),
                catalog_song("hit2", "Mata", None),
            ]
        } else {
            vec![
                catalog_song("melo1", "Sanah", Some("UC-sanah")),
                CatalogTrack {
                    video_id: None,
                    title: "Podcast episode".to_string(),
                    ..Default::default()
                },
            ]
        };
        Ok(songs.into_iter().take(limit).collect())
    }

    async fn artist(&self, artist_id: &str) -> AppResult<ArtistCatalog> {
        if self.failing || artist_id != "UC-sanah" {
            return Err(AppError::ExternalApi("unknown artist".to_string()));
        }
        Ok(ArtistCatalog {
            name: "Sanah".to_string(),
            songs: Some(CatalogShelf {
                results: vec![
                    catalog_song("sanah1", "Sanah", Some("UC-sanah")),
                    catalog_song("sanah2", "Sanah", Some("UC-sanah")),
                ],
            }),
            singles: None,
        })
    }

    async fn suggestions(&self, query: &str) -> AppResult<Vec<String>> {
        if self.failing {
            return Err(AppError::ExternalApi("gateway down".to_string()));
        }
        Ok(vec![format!("{} remix", query), format!("{} live", query)])
    }

    async fn stream_source(&self, video_id: &str) -> AppResult<Option<StreamSource>> {
        if self.failing {
            return Err(AppError::ExternalApi("gateway down".to_string()));
        }
        Ok((video_id == "melo1").then(|| StreamSource {
            url: "https://audio.example/melo1.m4a".to_string(),
            title: "Song melo1".to_string(),
        }))
    }

    fn name(&self) -> &'static str {
        "fake"
    }
}

/// Records every verification link instead of sending it
#[derive(Default)]
struct FakeMailer {
    failing: bool,
    sent: Mutex<Vec<(String, String)>>,
}

impl FakeMailer {
    fn last_token(&self) -> String {
        let sent = self.sent.lock().unwrap();
        let (_, link) = sent.last().expect("no verification email sent");
        link.split("token=").nth(1).unwrap().to_string()
    }
}

#[async_trait::async_trait]
impl Mailer for FakeMailer {
    async fn send_verification(&self, to: &str, link: &str) -> AppResult<()> {
        if self.failing {
            return Err(AppError::Delivery("relay down".to_string()));
        }
        self.sent
            .lock()
            .unwrap()
            .push((to.to_string(), link.to_string()));
        Ok(())
    }
}

// ============================================================================
// Setup
// ============================================================================

struct TestApp {
    server: TestServer,
    mailer: Arc<FakeMailer>,
}

async fn create_test_app(catalog: FakeCatalog, mailer: FakeMailer) -> TestApp {
    let passwords = PasswordHashing::with_params(8, 1, 1).unwrap();
    let store = Store::connect("sqlite::memory:", passwords).await.unwrap();
    let config: Config = envy::from_iter(Vec::<(String, String)>::new()).unwrap();

    let mailer = Arc::new(mailer);
    let state = AppState::new(store, Arc::new(catalog), mailer.clone(), &config);

    TestApp {
        server: TestServer::new(create_router(state)).unwrap(),
        mailer,
    }
}

async fn create_test_server() -> TestApp {
    create_test_app(FakeCatalog { failing: false }, FakeMailer::default()).await
}

async fn register_and_activate(app: &TestApp, username: &str, email: &str) {
    app.server
        .post("/api/register")
        .json(&json!({ "username": username, "password": "pw123", "email": email }))
        .await
        .assert_status_ok();

    app.server
        .get("/verify")
        .add_query_param("token", app.mailer.last_token())
        .await
        .assert_status_ok();
}

// ============================================================================
// Tests
// ============================================================================

#[tokio::test]
async fn test_health_check() {
    let app = create_test_server().await;
    let response = app.server.get("/health").await;

    response.assert_status_ok();
    response.assert_json(&json!({ "status": "healthy" }));
}

#[tokio::test]
async fn test_responses_carry_request_id() {
    let app = create_test_server().await;
    let response = app.server.get("/health").await;

    let request_id = response.header("x-request-id");
    assert!(uuid::Uuid::parse_str(request_id.to_str().unwrap()).is_ok());
}

#[tokio::test]
async fn test_cors_allows_any_origin() {
    let app = create_test_server().await;
    let response = app
        .server
        .get("/health")
        .add_header(
            HeaderName::from_static("origin"),
            HeaderValue::from_static("http://phone.local:3000"),
        )
        .await;

    assert_eq!(response.header("access-control-allow-origin"), "*");
}

#[tokio::test]
async fn test_registration_activation_login_flow() {
    let app = create_test_server().await;

    let response = app
        .server
        .post("/api/register")
        .json(&json!({ "username": "alice", "password": "pw123", "email": "a@x.com" }))
        .await;
    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["message"], "Verification link sent! Check your email.");

    {
        let sent = app.mailer.sent.lock().unwrap();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].0, "a@x.com");
        assert!(sent[0].1.starts_with("http://localhost:8022/verify?token="));
    }

    // Same username, different email
    let response = app
        .server
        .post("/api/register")
        .json(&json!({ "username": "alice", "password": "pw456", "email": "b@x.com" }))
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);
    response.assert_json(&json!({ "error": "Username or email is already taken." }));

    // Not active yet
    let response = app
        .server
        .post("/api/login")
        .json(&json!({ "username": "alice", "password": "pw123" }))
        .await;
    response.assert_status(StatusCode::FORBIDDEN);

    let response = app
        .server
        .get("/verify")
        .add_query_param("token", app.mailer.last_token())
        .await;
    response.assert_status_ok();
    assert!(response.text().contains("Account activated"));

    let response = app
        .server
        .post("/api/login")
        .json(&json!({ "username": "alice", "password": "pw123" }))
        .await;
    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["username"], "alice");
    assert!(body["user_id"].as_i64().unwrap() > 0);
}

#[tokio::test]
async fn test_login_with_wrong_password_is_unauthorized() {
    let app = create_test_server().await;
    register_and_activate(&app, "bob", "bob@x.com").await;

    let response = app
        .server
        .post("/api/login")
        .json(&json!({ "username": "bob", "password": "wrong" }))
        .await;
    response.assert_status(StatusCode::UNAUTHORIZED);

    let response = app
        .server
        .post("/api/login")
        .json(&json!({ "username": "nobody", "password": "pw123" }))
        .await;
    response.assert_status(StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_verify_with_used_or_unknown_token_shows_failure_page() {
    let app = create_test_server().await;
    register_and_activate(&app, "carol", "c@x.com").await;

    // Second use of the same link
    let response = app
        .server
        .get("/verify")
        .add_query_param("token", app.mailer.last_token())
        .await;
    response.assert_status_ok();
    assert!(response.text().contains("invalid or has already been used"));

    let response = app.server.get("/verify").add_query_param("token", "bogus").await;
    response.assert_status_ok();
    assert!(response.text().contains("invalid or has already been used"));

    let response = app.server.get("/verify").await;
    response.assert_status_ok();
    assert!(response.text().contains("invalid or has already been used"));
}

#[tokio::test]
async fn test_registration_survives_mail_failure() {
    let mailer = FakeMailer {
        failing: true,
        ..Default::default()
    };
    let app = create_test_app(FakeCatalog { failing: false }, mailer).await;

    let response = app
        .server
        .post("/api/register")
        .json(&json!({ "username": "dave", "password": "pw123", "email": "d@x.com" }))
        .await;
    response.assert_status_ok();
    let body: Value = response.json();
    assert!(body["message"].as_str().unwrap().starts_with("Account created."));

    // The account exists but is still inactive
    let response = app
        .server
        .post("/api/login")
        .json(&json!({ "username": "dave", "password": "pw123" }))
        .await;
    response.assert_status(StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_playlists_flow() {
    let app = create_test_server().await;

    for name in ["Road trip", "Empty"] {
        app.server
            .post("/api/playlists")
            .json(&json!({ "user_id": 1, "name": name }))
            .await
            .assert_json(&json!({ "message": "OK" }));
    }

    let response = app.server.get("/api/playlists").add_query_param("user_id", 1).await;
    let playlists: Vec<Value> = response.json();
    let road_trip_id = playlists[0]["id"].as_i64().unwrap();

    for video_id in ["a1", "a2", "a3"] {
        app.server
            .post("/api/playlists/add")
            .json(&json!({
                "playlist_id": road_trip_id,
                "video_id": video_id,
                "title": format!("Song {}", video_id),
                "artist": "Sanah",
                "thumbnail": "https://img.example/a.jpg"
            }))
            .await
            .assert_json(&json!({ "message": "OK" }));
    }

    let response = app.server.get("/api/playlists").add_query_param("user_id", 1).await;
    response.assert_status_ok();
    let playlists: Vec<Value> = response.json();

    assert_eq!(playlists.len(), 2);
    assert_eq!(playlists[0]["name"], "Road trip");
    assert_eq!(playlists[0]["count"], 3);
    assert_eq!(playlists[0]["songs"][0]["video_id"], "a1");
    assert_eq!(playlists[0]["songs"][2]["video_id"], "a3");
    assert_eq!(playlists[0]["songs"][0]["playlist_id"], road_trip_id);
    assert!(playlists[0]["songs"][0]["added_at"].is_string());
    assert_eq!(playlists[1]["name"], "Empty");
    assert_eq!(playlists[1]["count"], 0);

    // Someone else's library
    let response = app.server.get("/api/playlists").add_query_param("user_id", 2).await;
    let playlists: Vec<Value> = response.json();
    assert!(playlists.is_empty());
}

#[tokio::test]
async fn test_home_feed_without_history_is_popular() {
    let app = create_test_server().await;

    let response = app.server.get("/api/home").add_query_param("user_id", 1).await;
    response.assert_status_ok();
    let feed: Value = response.json();

    assert_eq!(feed["title"], "🔥 Trending hits in Poland");
    assert_eq!(feed["tracks"].as_array().unwrap().len(), 2);
    assert_eq!(feed["tracks"][0]["artist"], "Quebonafide");
}

#[tokio::test]
async fn test_home_feed_follows_last_played_artist() {
    let app = create_test_server().await;

    app.server
        .post("/api/history")
        .json(&json!({
            "user_id": 1,
            "video_id": "melo1",
            "title": "Song melo1",
            "artist": "Sanah",
            "artist_id": "UC-sanah"
        }))
        .await
        .assert_json(&json!({ "message": "OK" }));

    let response = app.server.get("/api/home").add_query_param("user_id", 1).await;
    let feed: Value = response.json();

    assert_eq!(feed["title"], "Because you listen to Sanah");
    assert_eq!(
        feed["tracks"],
        json!([
            { "id": "sanah1", "title": "Song sanah1", "artist": "Sanah", "thumbnail": "https://img.example/sanah1.jpg" },
            { "id": "sanah2", "title": "Song sanah2", "artist": "Sanah", "thumbnail": "https://img.example/sanah2.jpg" }
        ])
    );
}

#[tokio::test]
async fn test_home_feed_with_catalog_down_never_fails() {
    let app = create_test_app(FakeCatalog { failing: true }, FakeMailer::default()).await;

    app.server
        .post("/api/history")
        .json(&json!({
            "user_id": 1,
            "video_id": "melo1",
            "title": "Song melo1",
            "artist": "Sanah",
            "artist_id": "UC-sanah"
        }))
        .await
        .assert_status_ok();

    let response = app.server.get("/api/home").add_query_param("user_id", 1).await;
    response.assert_status_ok();
    response.assert_json(&json!({ "title": "Couldn't load trending hits", "tracks": [] }));
}

#[tokio::test]
async fn test_search_and_suggestions() {
    let app = create_test_server().await;

    let response = app.server.get("/api/search").add_query_param("q", "sanah").await;
    response.assert_status_ok();
    response.assert_json(&json!([{
        "id": "melo1",
        "title": "Song melo1",
        "artist": "Sanah",
        "artist_id": "UC-sanah",
        "thumbnail": "https://img.example/melo1.jpg"
    }]));

    let response = app.server.get("/api/suggestions").add_query_param("q", "sanah").await;
    response.assert_json(&json!(["sanah remix", "sanah live"]));
}

#[tokio::test]
async fn test_catalog_failures_degrade_to_empty() {
    let app = create_test_app(FakeCatalog { failing: true }, FakeMailer::default()).await;

    let response = app.server.get("/api/search").add_query_param("q", "sanah").await;
    response.assert_status_ok();
    response.assert_json(&json!([]));

    let response = app.server.get("/api/suggestions").add_query_param("q", "sanah").await;
    response.assert_json(&json!([]));

    let response = app.server.get("/api/stream").add_query_param("id", "melo1").await;
    response.assert_json(&json!({ "url": null }));

    let response = app.server.get("/api/download").add_query_param("id", "melo1").await;
    response.assert_status(StatusCode::NOT_FOUND);
    response.assert_json(&json!({ "error": "Not found" }));
}

#[tokio::test]
async fn test_stream_and_download() {
    let app = create_test_server().await;

    let response = app.server.get("/api/stream").add_query_param("id", "melo1").await;
    response.assert_json(&json!({ "url": "https://audio.example/melo1.m4a" }));

    let response = app.server.get("/api/stream").add_query_param("id", "missing").await;
    response.assert_json(&json!({ "url": null }));

    let response = app.server.get("/api/download").add_query_param("id", "melo1").await;
    response.assert_status(StatusCode::TEMPORARY_REDIRECT);
    assert_eq!(response.header("location"), "https://audio.example/melo1.m4a");

    let response = app.server.get("/api/download").add_query_param("id", "missing").await;
    response.assert_status(StatusCode::NOT_FOUND);
    response.assert_json(&json!({ "error": "Not found" }));
}
