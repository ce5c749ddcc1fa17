use std::sync::Arc;

use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection, QueryRejection},
        Path, Query, State,
    },
    http::StatusCode,
    routing::{get, put},
    Json, Router,
};
use rust_decimal::Decimal;
use serde::Deserialize;

use super::error::{ApiError, ApiResult};
use super::with_db;
use crate::main_lib::AppState;
use crate::models::{Budget, Period};

pub(super) fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/budgets", get(list_budgets))
        .route(
            "/budgets/{category}/{month}",
            put(upsert_budget).delete(delete_budget),
        )
}

#[derive(Deserialize)]
struct MonthQuery {
    month: Option<Period>,
}

#[derive(Deserialize)]
struct SetLimitRequest {
    limit_amount: Decimal,
}

fn parse_month(raw: &str) -> ApiResult<Period> {
    raw.parse::<Period>().map_err(ApiError::from)
}

async fn list_budgets(
    State(state): State<Arc<AppState>>,
    query: Result<Query<MonthQuery>, QueryRejection>,
) -> ApiResult<Json<Vec<Budget>>> {
    let Query(query) = query?;
    let budgets = with_db(&state, move |db| db.get_budgets(query.month)).await?;
    Ok(Json(budgets))
}

async fn upsert_budget(
    State(state): State<Arc<AppState>>,
    path: Result<Path<(String, String)>, PathRejection>,
    payload: Result<Json<SetLimitRequest>, JsonRejection>,
) -> ApiResult<Json<Budget>> {
    let Path((category, month)) = path?;
    let Json(payload) = payload?;
    let month = parse_month(&month)?;
    let budget = Budget::new(category, month, payload.limit_amount);
    let saved = with_db(&state, move |db| db.upsert_budget(&budget)).await?;
    tracing::info!(
        category = %saved.category,
        month = %saved.month,
        limit = %saved.limit_amount,
        "budget set"
    );
    Ok(Json(saved))
}

async fn delete_budget(
    State(state): State<Arc<AppState>>,
    path: Result<Path<(String, String)>, PathRejection>,
) -> ApiResult<StatusCode> {
    let Path((category, month)) = path?;
    let month = parse_month(&month)?;
    let label = format!("Budget for '{category}' in {month}");
    if with_db(&state, move |db| db.delete_budget(&category, month)).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::NotFound(format!("{label} not found")))
    }
}
