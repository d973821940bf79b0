use std::sync::Arc;

use axum::{
    http::StatusCode,
    middleware,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::{
    config::Config,
    db::Store,
    middleware::{make_span_with_request_id, request_id_middleware},
    services::{
        recommendations::{FeedConfig, HomeFeedSelector},
        AccountManager, ExternalCatalog, Mailer,
    },
};

pub mod auth;
pub mod catalog;
pub mod history;
pub mod home;
pub mod playlists;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub store: Store,
    pub accounts: AccountManager,
    pub catalog: Arc<dyn ExternalCatalog>,
    pub feed: Arc<HomeFeedSelector>,
}

impl AppState {
    pub fn new(
        store: Store,
        catalog: Arc<dyn ExternalCatalog>,
        mailer: Arc<dyn Mailer>,
        config: &Config,
    ) -> Self {
        let accounts = AccountManager::new(store.clone(), mailer, config.public_url.clone());
        let feed = HomeFeedSelector::new(store.clone(), catalog.clone(), FeedConfig::from(config));

        Self {
            store,
            accounts,
            catalog,
            feed: Arc::new(feed),
        }
    }
}

/// Body of the plain acknowledgement responses
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    pub fn ok() -> Json<Self> {
        Json(Self::new("OK"))
    }
}

/// `?user_id=` query parameter
#[derive(Debug, Deserialize)]
pub struct UserQuery {
    pub user_id: i64,
}

/// Creates the application router with all routes
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health_check))
        .route("/verify", get(auth::verify))
        .nest("/api", api_routes())
        // Outermost first; the request id must exist before the span is made
        .layer(
            ServiceBuilder::new()
                .layer(cors)
                .layer(middleware::from_fn(request_id_middleware))
                .layer(TraceLayer::new_for_http().make_span_with(make_span_with_request_id)),
        )
        .with_state(state)
}

/// Routes under /api
fn api_routes() -> Router<AppState> {
    Router::new()
        // Accounts
        .route("/register", post(auth::register))
        .route("/login", post(auth::login))
        // Library
        .route("/playlists", get(playlists::list).post(playlists::create))
        .route("/playlists/add", post(playlists::add_entry))
        .route("/history", post(history::record))
        .route("/home", get(home::home_feed))
        // Catalog
        .route("/search", get(catalog::search))
        .route("/suggestions", get(catalog::suggestions))
        .route("/stream", get(catalog::stream))
        .route("/download", get(catalog::download))
}

/// Health check endpoint
async fn health_check() -> (StatusCode, Json<Value>) {
    (StatusCode::OK, Json(json!({ "status": "healthy" })))
}
