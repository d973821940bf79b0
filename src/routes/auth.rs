use axum::{
    extract::{Query, State},
    response::Html,
    Json,
};
use serde::{Deserialize, Serialize};

use crate::{error::AppResult, middleware::RequestId};

use super::{AppState, MessageResponse};

const LINK_SENT: &str = "Verification link sent! Check your email.";
const LINK_NOT_SENT: &str =
    "Account created. If the email does not arrive, check the server log for the link.";

const ACTIVATED_PAGE: &str = r#"<html>
<body style="background-color: #111827; color: white; font-family: sans-serif; display: flex; flex-direction: column; align-items: center; justify-content: center; height: 100vh;">
    <h1 style="color: #4ade80;">Account activated! ✅</h1>
    <p>You can close this window and sign in to the app.</p>
</body>
</html>"#;

const INVALID_LINK_PAGE: &str = "<h1 style='color:red'>This link is invalid or has already been used.</h1>";

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub username: String,
    pub password: String,
    pub email: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub user_id: i64,
    pub username: String,
}

#[derive(Debug, Deserialize)]
pub struct VerifyQuery {
    #[serde(default)]
    pub token: String,
}

/// Creates an unverified account and emails its activation link.
///
/// Registration succeeds even when the email cannot be delivered; the message
/// tells the two cases apart.
pub async fn register(
    State(state): State<AppState>,
    request_id: RequestId,
    Json(request): Json<RegisterRequest>,
) -> AppResult<Json<MessageResponse>> {
    let token = state
        .accounts
        .register(&request.username, &request.password, &request.email)
        .await?;

    tracing::info!(request_id = %request_id, username = %request.username, "Account registered");

    let message = if state.accounts.send_verification(&request.email, &token).await {
        LINK_SENT
    } else {
        LINK_NOT_SENT
    };

    Ok(Json(MessageResponse::new(message)))
}

pub async fn login(
    State(state): State<AppState>,
    request_id: RequestId,
    Json(request): Json<LoginRequest>,
) -> AppResult<Json<LoginResponse>> {
    let user = state
        .accounts
        .login(&request.username, &request.password)
        .await
        .map_err(|e| {
            tracing::info!(request_id = %request_id, username = %request.username, reason = %e, "Login rejected");
            e
        })?;

    Ok(Json(LoginResponse {
        user_id: user.id,
        username: user.username,
    }))
}

/// Target of the emailed activation link. Always answers with a page.
pub async fn verify(
    State(state): State<AppState>,
    Query(params): Query<VerifyQuery>,
) -> AppResult<Html<&'static str>> {
    if state.accounts.activate(&params.token).await? {
        Ok(Html(ACTIVATED_PAGE))
    } else {
        Ok(Html(INVALID_LINK_PAGE))
    }
}
