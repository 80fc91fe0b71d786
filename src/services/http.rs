use axum::{
    extract::{rejection::JsonRejection, FromRequest, FromRequestParts, Request},
    http::{header, request::Parts, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post, put},
    Json, Router,
};
use serde_json::json;
use sqlx::PgPool;
use tower_http::trace::TraceLayer;

use super::accounts::AccountService;
use super::deposits::DepositService;
use super::history::HistoryService;
use super::quests::QuestService;
use super::ServiceError;
use crate::repositories::deposits::DepositRepository;
use crate::repositories::quests::QuestRepository;
use crate::repositories::users::UserRepository;
use crate::sessions::SessionStore;
use crate::settings::Settings;

mod accounts;
mod admin;
mod deposits;
mod quests;

const SESSION_COOKIE: &str = "questinvest_session";

#[derive(Clone)]
pub struct AppState {
    accounts: AccountService,
    deposits: DepositService,
    quests: QuestService,
    history: HistoryService,
    sessions: SessionStore,
    admin_access_code: String,
}

impl ServiceError {
    fn status(&self) -> StatusCode {
        match self {
            ServiceError::BadCredentials
            | ServiceError::WrongPassword
            | ServiceError::BadAccessCode
            | ServiceError::Unauthenticated => StatusCode::UNAUTHORIZED,
            ServiceError::QuestNotFound | ServiceError::DepositNotFound => StatusCode::NOT_FOUND,
            ServiceError::Database(_) | ServiceError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            _ => StatusCode::BAD_REQUEST,
        }
    }
}

impl IntoResponse for ServiceError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status == StatusCode::INTERNAL_SERVER_ERROR {
            // Logged in full; the client only sees a generic message.
            log::error!("request failed: {}", self);
            return (status, Json(json!({"error": "Internal server error"}))).into_response();
        }
        (status, Json(json!({"error": self.to_string()}))).into_response()
    }
}

/// Session token from the request's Cookie header, if any.
fn cookie_token(headers: &HeaderMap) -> Option<String> {
    let cookies = headers.get(header::COOKIE)?.to_str().ok()?;
    cookies.split(';').find_map(|pair| {
        let (name, value) = pair.trim().split_once('=')?;
        if name == SESSION_COOKIE {
            Some(value.to_string())
        } else {
            None
        }
    })
}

fn session_cookie(token: &str, max_age_secs: u64) -> String {
    format!(
        "{}={}; Path=/; HttpOnly; SameSite=Lax; Max-Age={}",
        SESSION_COOKIE, token, max_age_secs
    )
}

/// Attaches the session cookie to an otherwise-ready JSON response.
fn with_session_cookie(
    state: &AppState,
    token: &str,
    body: serde_json::Value,
) -> Result<Response, ServiceError> {
    let mut response = Json(body).into_response();
    let cookie = session_cookie(token, state.sessions.ttl().as_secs());
    let value = cookie
        .parse()
        .map_err(|_| ServiceError::Internal("invalid session cookie".to_string()))?;
    response.headers_mut().insert(header::SET_COOKIE, value);
    Ok(response)
}

/// `Json` body extractor whose rejection carries the API's `{"error": …}`
/// shape instead of axum's plain-text default, so a malformed body (such as
/// a non-numeric amount) reports like every other validation failure.
pub struct AppJson<T>(pub T);

impl<T, S> FromRequest<S> for AppJson<T>
where
    axum::Json<T>: FromRequest<S, Rejection = JsonRejection>,
    S: Send + Sync,
{
    type Rejection = ServiceError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match axum::Json::<T>::from_request(req, state).await {
            Ok(Json(value)) => Ok(AppJson(value)),
            Err(rejection) => Err(ServiceError::InvalidInput(rejection.body_text())),
        }
    }
}

/// Authenticated user identity, resolved from the session cookie.
pub struct AuthUser {
    pub user_id: String,
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = ServiceError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = cookie_token(&parts.headers).ok_or(ServiceError::Unauthenticated)?;
        let session = state
            .sessions
            .get(&token)
            .ok_or(ServiceError::Unauthenticated)?;
        let user_id = session.user_id.ok_or(ServiceError::Unauthenticated)?;

        Ok(AuthUser { user_id })
    }
}

/// Admin authorization, resolved from the session's admin flag.
pub struct AdminGate;

impl FromRequestParts<AppState> for AdminGate {
    type Rejection = ServiceError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = cookie_token(&parts.headers).ok_or(ServiceError::Unauthenticated)?;
        let session = state
            .sessions
            .get(&token)
            .ok_or(ServiceError::Unauthenticated)?;
        if !session.is_admin {
            return Err(ServiceError::Unauthenticated);
        }

        Ok(AdminGate)
    }
}

pub async fn start_http_server(pool: PgPool, settings: Settings) -> Result<(), anyhow::Error> {
    let users = UserRepository::new(pool.clone());
    let deposit_repo = DepositRepository::new(pool.clone());
    let quest_repo = QuestRepository::new(pool);

    let app_state = AppState {
        accounts: AccountService::new(users.clone(), settings.app.deposit_address.clone()),
        deposits: DepositService::new(
            deposit_repo.clone(),
            settings.app.min_deposit_in_cents,
            settings.app.require_tx_hash,
            settings.app.auto_confirm_deposits,
        ),
        quests: QuestService::new(
            quest_repo.clone(),
            users,
            settings.app.min_deposit_in_cents,
        ),
        history: HistoryService::new(deposit_repo, quest_repo),
        sessions: SessionStore::new(std::time::Duration::from_secs(
            settings.app.session_ttl_minutes * 60,
        )),
        admin_access_code: settings.app.admin_access_code.clone(),
    };

    let app = Router::new()
        .route("/api/register", post(accounts::register))
        .route("/api/login", post(accounts::login))
        .route("/api/logout", post(accounts::logout))
        .route("/api/user", get(accounts::profile))
        .route("/api/user/email", put(accounts::change_email))
        .route("/api/user/password", put(accounts::change_password))
        .route("/api/deposit", post(deposits::submit))
        .route("/api/quests", get(quests::list))
        .route("/api/quests/{id}/complete", post(quests::complete))
        .route("/api/history", get(accounts::history))
        .route("/api/admin/login", post(admin::login))
        .route("/api/admin/logout", post(admin::logout))
        .route("/api/admin/check", get(admin::check))
        .route("/api/admin/deposits", get(admin::list_deposits))
        .route("/api/admin/deposits/{id}/approve", post(admin::approve))
        .route("/api/admin/deposits/{id}/reject", post(admin::reject))
        .route("/health", get(|| async { "OK" }))
        .with_state(app_state)
        .layer(TraceLayer::new_for_http());

    let listener =
        tokio::net::TcpListener::bind((settings.server.host.as_str(), settings.server.port))
            .await?;
    log::info!("Listening on {}", listener.local_addr()?);

    axum::serve(listener, app).await?;

    Ok(())
}
