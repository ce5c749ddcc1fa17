use std::sync::Arc;

use axum::{
    extract::{
        rejection::{PathRejection, QueryRejection},
        Path, Query, State,
    },
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};

use super::error::{ApiError, ApiResult};
use super::with_db;
use crate::aggregate::{self, Breakdown, CategorySummary, MonthTotal, PeriodSummary};
use crate::main_lib::AppState;
use crate::models::{ExpenseFilter, Period};

const DEFAULT_TREND_MONTHS: usize = 6;
const MAX_TREND_MONTHS: usize = 36;

pub(super) fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/stats/monthly/{year}/{month}", get(monthly_summary))
        .route("/stats/trend", get(trend))
        .route("/stats/breakdown", get(breakdown))
}

#[derive(Serialize)]
struct MonthlyStats {
    #[serde(flatten)]
    summary: PeriodSummary,
    alerts: Vec<CategorySummary>,
}

#[derive(Deserialize)]
struct TrendQuery {
    end: Option<Period>,
    months: Option<usize>,
}

async fn monthly_summary(
    State(state): State<Arc<AppState>>,
    path: Result<Path<(i32, u32)>, PathRejection>,
) -> ApiResult<Json<MonthlyStats>> {
    let Path((year, month)) = path?;
    let period = Period::new(year, month)?;
    let thresholds = state.thresholds;
    let summary = with_db(&state, move |db| {
        aggregate::load_period_summary(db, period, &thresholds)
    })
    .await?;
    let alerts = summary.alerts().into_iter().cloned().collect();
    Ok(Json(MonthlyStats { summary, alerts }))
}

async fn trend(
    State(state): State<Arc<AppState>>,
    query: Result<Query<TrendQuery>, QueryRejection>,
) -> ApiResult<Json<Vec<MonthTotal>>> {
    let Query(query) = query?;
    let months = query.months.unwrap_or(DEFAULT_TREND_MONTHS);
    if !(1..=MAX_TREND_MONTHS).contains(&months) {
        return Err(ApiError::BadRequest(format!(
            "months must be between 1 and {MAX_TREND_MONTHS}"
        )));
    }
    let end = query.end.unwrap_or_else(Period::current);
    let series = with_db(&state, move |db| aggregate::load_month_trend(db, end, months)).await?;
    Ok(Json(series))
}

async fn breakdown(
    State(state): State<Arc<AppState>>,
    filter: Result<Query<ExpenseFilter>, QueryRejection>,
) -> ApiResult<Json<Breakdown>> {
    let Query(filter) = filter?;
    let expenses = with_db(&state, move |db| db.get_expenses(&filter)).await?;

    Ok(Json(aggregate::category_breakdown(&expenses)?))
}
