//! hh-api library - Hobby Helper REST service
//!
//! Exposes [`AppState`] and [`build_router`] so the binary and the integration
//! tests assemble the same service.

use std::sync::Arc;

use axum::{
    http::{header, HeaderValue, Method},
    Router,
};
use sqlx::SqlitePool;
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    trace::TraceLayer,
};
use tracing::warn;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

pub mod api;
pub mod cli;
pub mod db;
pub mod error;
pub mod recommend;
pub mod seed;
pub mod validation;

pub use error::{ApiError, ApiResult};

/// Application state shared across HTTP handlers
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool
    pub db: SqlitePool,
    /// HS256 signing secret for session tokens
    pub jwt_secret: Arc<str>,
    /// Origins allowed by CORS
    pub allowed_origins: Arc<[String]>,
}

impl AppState {
    /// Create new application state with the development CORS origins
    pub fn new(db: SqlitePool, jwt_secret: impl Into<Arc<str>>) -> Self {
        let origins: Vec<String> = hh_common::config::DEFAULT_ALLOWED_ORIGINS
            .iter()
            .map(|s| s.to_string())
            .collect();
        Self {
            db,
            jwt_secret: jwt_secret.into(),
            allowed_origins: origins.into(),
        }
    }

    pub fn with_allowed_origins(mut self, origins: Vec<String>) -> Self {
        self.allowed_origins = origins.into();
        self
    }
}

/// Default log filter for the service crates at `level`
pub fn default_log_filter(level: &str) -> String {
    format!("hh_api={level},hh_common={level},tower_http={level}")
}

/// Install the tracing subscriber
///
/// `RUST_LOG` wins over the configured level.
pub fn init_tracing(level: &str) {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| default_log_filter(level).into()))
        .with(tracing_subscriber::fmt::layer())
        .init();
}

/// Build application router
///
/// Everything lives under `/api` except the health and build info routes.
pub fn build_router(state: AppState) -> Router {
    use axum::routing::{delete, get, post};

    let users = Router::new()
        .route("/register", post(api::register))
        .route("/login", post(api::login))
        .route("/users", get(api::get_profile).patch(api::update_profile))
        .route("/users/profile", get(api::get_profile).patch(api::update_profile))
        .route("/users/current", get(api::get_profile))
        .route("/users/history", post(api::add_history));

    let hobbies = Router::new()
        .route("/hobbies", get(api::list_hobbies).post(api::create_hobby))
        .route("/hobbies/suggestions", get(api::suggestions))
        .route("/hobbies/:id", get(api::get_hobby));

    let user_hobbies = Router::new()
        .route("/user-hobbies", post(api::create_user_hobby))
        .route("/user-hobbies/:user_id", get(api::list_user_hobbies))
        .route("/userHobbies", post(api::create_user_hobby))
        .route("/userHobbies/:user_id", get(api::list_user_hobbies));

    let reminders = Router::new()
        .route("/reminders", get(api::list_reminders))
        .route("/reminders/rating", post(api::schedule_rating_reminder))
        .route("/reminders/nudge", post(api::schedule_nudge))
        .route("/reminders/due", post(api::claim_due_reminders))
        .route("/reminders/:id", delete(api::cancel_reminder));

    let cors = cors_layer(&state.allowed_origins);

    Router::new()
        .nest(
            "/api",
            users.merge(hobbies).merge(user_hobbies).merge(reminders),
        )
        .merge(api::health_routes())
        .fallback(api::route_not_found)
        .with_state(state)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}

/// CORS for the configured client origins, with credentials allowed
fn cors_layer(origins: &[String]) -> CorsLayer {
    let origins: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                warn!("Ignoring invalid CORS origin: {}", origin);
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
        .allow_credentials(true)
}
