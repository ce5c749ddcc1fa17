mod budgets;
mod categories;
pub mod error;
mod expenses;
mod stats;

use std::sync::Arc;

use axum::{
    http::{HeaderValue, StatusCode},
    routing::get,
    Router,
};
use tokio::task;
use tower_http::{
    cors::{Any, CorsLayer},
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::config::Config;
use crate::db::Database;
use crate::main_lib::AppState;
use error::{ApiError, ApiResult};

pub async fn healthz() -> &'static str {
    "ok"
}

pub fn app_router(state: Arc<AppState>, config: &Config) -> Router {
    let cors = if config.cors_allow.iter().any(|o| o == "*") {
        CorsLayer::new().allow_origin(Any)
    } else {
        let origins = config
            .cors_allow
            .iter()
            .filter_map(|o| match o.parse::<HeaderValue>() {
                Ok(origin) => Some(origin),
                Err(_) => {
                    tracing::warn!(origin = %o, "ignoring invalid CORS origin");
                    None
                }
            })
            .collect::<Vec<_>>();
        CorsLayer::new().allow_origin(origins)
    };
    let cors = cors.allow_methods(Any).allow_headers(Any);

    let api = Router::new()
        .route("/healthz", get(healthz))
        .merge(expenses::router())
        .merge(categories::router())
        .merge(budgets::router())
        .merge(stats::router());

    Router::new()
        .nest("/api/v1", api)
        .with_state(state)
        .layer(cors)
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            config.request_timeout,
        ))
        .layer(TraceLayer::new_for_http())
}

/// Run store work on the blocking pool, holding the connection lock only
/// for the duration of `f`.
async fn with_db<T, F>(state: &Arc<AppState>, f: F) -> ApiResult<T>
where
    F: FnOnce(&mut Database) -> crate::Result<T> + Send + 'static,
    T: Send + 'static,
{
    let state = Arc::clone(state);
    task::spawn_blocking(move || {
        let mut db = state
            .db
            .lock()
            .map_err(|_| ApiError::Internal("Database lock poisoned".into()))?;
        f(&mut db).map_err(ApiError::from)
    })
    .await
    .map_err(|e| {
        tracing::error!(error = %e, "blocking task failed");
        ApiError::Internal("Internal server error".into())
    })?
}
