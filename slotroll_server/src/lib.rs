//! Axum binding of the slot game.
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | GET | `/health` | Health check |
//! | GET | `/api/slot/session` | Resolve the session cookie or start a new session |
//! | POST | `/api/slot/roll` | Spend one roll |
//! | POST | `/api/slot/cashout` | Bank the balance and end the session |
//!
//! Sessions travel in the `session_id` cookie. The cookie is cleared when a
//! roll ends the game and on every cashout.

use std::sync::Arc;

use anyhow::Context;
use axum::{
    extract::State,
    http::{header, HeaderValue, Method, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::error;

use slotroll_core::{ConfiguredMachine, Engine, GameConfig, GameError, GameService, ThreadRandom};
use slotroll_shared::{
    ApiError, CashoutResponse, RollResponse, SessionResponse, SESSION_COOKIE_NAME,
};

pub struct AppState<M> {
    pub game: GameService<M>,
    pub cookie_secure: bool,
}

pub type DefaultState = AppState<ConfiguredMachine<ThreadRandom>>;

impl DefaultState {
    pub fn from_config(config: &GameConfig, cookie_secure: bool) -> anyhow::Result<Self> {
        let game = GameService::from_config(config, ThreadRandom).context("invalid game config")?;
        Ok(Self {
            game,
            cookie_secure,
        })
    }
}

/// Process settings read from the environment.
#[derive(Debug, Clone)]
pub struct Settings {
    pub bind: String,
    pub game: GameConfig,
    pub allowed_origins: Vec<HeaderValue>,
    pub cookie_secure: bool,
}

impl Settings {
    pub fn from_env() -> anyhow::Result<Self> {
        let bind = std::env::var("BIND").unwrap_or_else(|_| "127.0.0.1:8080".to_string());
        let game = match std::env::var("SLOT_CONFIG") {
            Ok(path) => GameConfig::load(&path).with_context(|| format!("loading {path}"))?,
            Err(_) => GameConfig::default(),
        };
        let allowed_origins = std::env::var("ALLOWED_ORIGINS")
            .unwrap_or_default()
            .split(',')
            .map(str::trim)
            .filter(|o| !o.is_empty())
            .map(|o| HeaderValue::from_str(o).with_context(|| format!("bad origin {o}")))
            .collect::<anyhow::Result<Vec<_>>>()?;
        let cookie_secure = std::env::var("COOKIE_SECURE").map_or(false, |v| v == "true");
        Ok(Self {
            bind,
            game,
            allowed_origins,
            cookie_secure,
        })
    }
}

pub fn cors_layer(allowed_origins: &[HeaderValue]) -> CorsLayer {
    if allowed_origins.is_empty() {
        return CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any);
    }
    CorsLayer::new()
        .allow_origin(allowed_origins.to_vec())
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([header::CONTENT_TYPE])
        .allow_credentials(true)
}

pub fn create_router<M: Engine + 'static>(state: Arc<AppState<M>>) -> Router {
    Router::new()
        .route("/health", get(route_health))
        .route("/api/slot/session", get(route_session::<M>))
        .route("/api/slot/roll", post(route_roll::<M>))
        .route("/api/slot/cashout", post(route_cashout::<M>))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}

/// Error wrapper so the shared [`ApiError`] can become a response here.
#[derive(Debug)]
pub struct HttpError(pub ApiError);

impl From<GameError> for HttpError {
    fn from(err: GameError) -> Self {
        if !err.is_user_error() {
            error!(%err, "ledger invariant violated");
        }
        HttpError(err.into())
    }
}

impl IntoResponse for HttpError {
    fn into_response(self) -> Response {
        let status = match self.0 {
            ApiError::Unauthorized => StatusCode::UNAUTHORIZED,
            ApiError::BadRequest => StatusCode::BAD_REQUEST,
            ApiError::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        };
        (status, Json(self.0.body())).into_response()
    }
}

fn session_token(jar: &CookieJar) -> Option<String> {
    jar.get(SESSION_COOKIE_NAME).map(|c| c.value().to_owned())
}

fn clear_session(jar: CookieJar) -> CookieJar {
    jar.remove(Cookie::build(SESSION_COOKIE_NAME).path("/"))
}

async fn route_health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "OK" }))
}

async fn route_session<M: Engine>(
    State(state): State<Arc<AppState<M>>>,
    jar: CookieJar,
) -> (CookieJar, Json<SessionResponse>) {
    let token = session_token(&jar);
    let (session, created) = state.game.resolve_or_create_session(token.as_deref());
    let jar = if created {
        jar.add(
            Cookie::build((SESSION_COOKIE_NAME, session.id.to_string()))
                .http_only(true)
                .same_site(SameSite::Lax)
                .path("/")
                .secure(state.cookie_secure),
        )
    } else {
        jar
    };
    (
        jar,
        Json(SessionResponse {
            credits: session.credits,
        }),
    )
}

async fn route_roll<M: Engine>(
    State(state): State<Arc<AppState<M>>>,
    jar: CookieJar,
) -> Result<(CookieJar, Json<RollResponse>), HttpError> {
    let token = session_token(&jar);
    let receipt = state.game.roll(token.as_deref())?;
    let jar = if receipt.game_over {
        clear_session(jar)
    } else {
        jar
    };
    Ok((jar, Json(receipt.into())))
}

async fn route_cashout<M: Engine>(
    State(state): State<Arc<AppState<M>>>,
    jar: CookieJar,
) -> Result<(CookieJar, Json<CashoutResponse>), HttpError> {
    let token = session_token(&jar);
    let receipt = state.game.cashout(token.as_deref())?;
    Ok((clear_session(jar), Json(receipt.into())))
}
