use axum::{extract::State, response::IntoResponse, Json};
use serde_json::json;

use super::{AppJson, AppState, AuthUser};
use crate::models::deposits::{NewDeposit, STATUS_CONFIRMED};
use crate::services::ServiceError;

pub async fn submit(
    State(state): State<AppState>,
    auth: AuthUser,
    AppJson(req): AppJson<NewDeposit>,
) -> Result<impl IntoResponse, ServiceError> {
    let deposit = state.deposits.submit(&auth.user_id, req).await?;

    let message = if deposit.status == STATUS_CONFIRMED {
        "Deposit confirmed"
    } else {
        "Deposit submitted, awaiting admin validation"
    };

    Ok(Json(json!({
        "success": true,
        "message": message,
        "deposit": deposit,
    })))
}
