use axum::{
    extract::{Path, State},
    http::HeaderMap,
    response::{IntoResponse, Response},
    Json,
};
use serde::Deserialize;
use serde_json::json;

use super::{cookie_token, with_session_cookie, AdminGate, AppJson, AppState};
use crate::services::ServiceError;

#[derive(Deserialize)]
pub struct AdminLoginRequest {
    pub code: String,
}

pub async fn login(
    State(state): State<AppState>,
    headers: HeaderMap,
    AppJson(req): AppJson<AdminLoginRequest>,
) -> Result<Response, ServiceError> {
    if req.code != state.admin_access_code {
        return Err(ServiceError::BadAccessCode);
    }

    let token = state
        .sessions
        .login_admin(cookie_token(&headers).as_deref());
    with_session_cookie(&state, &token, json!({"success": true}))
}

pub async fn logout(State(state): State<AppState>, headers: HeaderMap) -> impl IntoResponse {
    if let Some(token) = cookie_token(&headers) {
        state.sessions.logout_admin(&token);
    }
    Json(json!({"success": true}))
}

pub async fn check(State(state): State<AppState>, headers: HeaderMap) -> impl IntoResponse {
    let is_admin = cookie_token(&headers)
        .and_then(|token| state.sessions.get(&token))
        .map(|session| session.is_admin)
        .unwrap_or(false);

    Json(json!({"isAdmin": is_admin}))
}

pub async fn list_deposits(
    State(state): State<AppState>,
    _gate: AdminGate,
) -> Result<impl IntoResponse, ServiceError> {
    let deposits = state.deposits.list_all().await?;
    Ok(Json(deposits))
}

pub async fn approve(
    State(state): State<AppState>,
    _gate: AdminGate,
    Path(deposit_id): Path<String>,
) -> Result<impl IntoResponse, ServiceError> {
    state.deposits.approve(&deposit_id).await?;
    Ok(Json(json!({"success": true, "message": "Deposit approved"})))
}

pub async fn reject(
    State(state): State<AppState>,
    _gate: AdminGate,
    Path(deposit_id): Path<String>,
) -> Result<impl IntoResponse, ServiceError> {
    state.deposits.reject(&deposit_id).await?;
    Ok(Json(json!({"success": true, "message": "Deposit rejected"})))
}
