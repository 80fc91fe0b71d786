use axum::{
    extract::State,
    http::HeaderMap,
    response::{IntoResponse, Response},
    Json,
};
use serde::Deserialize;
use serde_json::json;

use super::{cookie_token, with_session_cookie, AppJson, AppState, AuthUser};
use crate::models::users::NewUser;
use crate::services::ServiceError;

#[derive(Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Deserialize)]
pub struct ChangeEmailRequest {
    pub new_email: String,
    pub current_password: String,
}

#[derive(Deserialize)]
pub struct ChangePasswordRequest {
    pub current_password: String,
    pub new_password: String,
}

pub async fn register(
    State(state): State<AppState>,
    headers: HeaderMap,
    AppJson(req): AppJson<NewUser>,
) -> Result<Response, ServiceError> {
    let user = state.accounts.register(req).await?;
    let token = state
        .sessions
        .login_user(cookie_token(&headers).as_deref(), user.id);

    with_session_cookie(
        &state,
        &token,
        json!({"success": true, "user": {"email": user.email}}),
    )
}

pub async fn login(
    State(state): State<AppState>,
    headers: HeaderMap,
    AppJson(req): AppJson<LoginRequest>,
) -> Result<Response, ServiceError> {
    let user = state.accounts.login(&req.email, &req.password).await?;
    let token = state
        .sessions
        .login_user(cookie_token(&headers).as_deref(), user.id);

    with_session_cookie(
        &state,
        &token,
        json!({"success": true, "user": {"email": user.email}}),
    )
}

pub async fn logout(State(state): State<AppState>, headers: HeaderMap) -> impl IntoResponse {
    if let Some(token) = cookie_token(&headers) {
        state.sessions.logout_user(&token);
    }
    Json(json!({"success": true}))
}

pub async fn profile(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<impl IntoResponse, ServiceError> {
    let profile = state.accounts.profile(&auth.user_id).await?;
    Ok(Json(profile))
}

pub async fn change_email(
    State(state): State<AppState>,
    auth: AuthUser,
    AppJson(req): AppJson<ChangeEmailRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    state
        .accounts
        .change_email(&auth.user_id, &req.new_email, &req.current_password)
        .await?;
    Ok(Json(json!({"success": true})))
}

pub async fn change_password(
    State(state): State<AppState>,
    auth: AuthUser,
    AppJson(req): AppJson<ChangePasswordRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    state
        .accounts
        .change_password(&auth.user_id, &req.current_password, &req.new_password)
        .await?;
    Ok(Json(json!({"success": true})))
}

pub async fn history(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<impl IntoResponse, ServiceError> {
    let history = state.history.recent(&auth.user_id).await?;
    Ok(Json(history))
}
