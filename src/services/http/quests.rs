use axum::{
    extract::{Path, State},
    response::IntoResponse,
    Json,
};
use serde_json::json;

use super::{AppState, AuthUser};
use crate::services::ServiceError;

pub async fn list(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<impl IntoResponse, ServiceError> {
    let today = chrono::Utc::now().date_naive();
    let overview = state.quests.overview(&auth.user_id, today).await?;
    Ok(Json(overview))
}

pub async fn complete(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(quest_id): Path<String>,
) -> Result<impl IntoResponse, ServiceError> {
    let today = chrono::Utc::now().date_naive();
    let result = state.quests.complete(&auth.user_id, &quest_id, today).await?;

    Ok(Json(json!({
        "success": true,
        "reward": result.reward,
        "newBalance": result.new_balance,
    })))
}
