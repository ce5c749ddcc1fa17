use std::sync::Arc;

use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection, QueryRejection, StringRejection},
        Path, Query, State,
    },
    http::{header, StatusCode},
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;
use serde_json::json;

use super::error::{ApiError, ApiResult};
use super::with_db;
use crate::aggregate::{self, BudgetStatus};
use crate::csv_io::{self, CsvImporter};
use crate::main_lib::AppState;
use crate::models::{Expense, ExpenseFilter, NewExpense};

pub(super) fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/expenses", get(list_expenses).post(create_expense))
        .route("/expenses/export", get(export_expenses))
        .route("/expenses/import", post(import_expenses))
        .route("/expenses/{id}", get(get_expense).delete(delete_expense))
}

/// A new expense together with where its category now stands.
#[derive(Serialize)]
struct CreatedExpense {
    #[serde(flatten)]
    expense: Expense,
    budget_status: BudgetStatus,
    budget_exceeded: bool,
}

async fn list_expenses(
    State(state): State<Arc<AppState>>,
    filter: Result<Query<ExpenseFilter>, QueryRejection>,
) -> ApiResult<Json<Vec<Expense>>> {
    let Query(filter) = filter?;
    let expenses = with_db(&state, move |db| db.get_expenses(&filter)).await?;
    Ok(Json(expenses))
}

async fn create_expense(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<NewExpense>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<CreatedExpense>)> {
    let Json(payload) = payload?;
    let thresholds = state.thresholds;
    // The insert is rolled back if the status can't be computed, so a 500
    // never leaves a stored expense behind.
    let created = with_db(&state, move |db| {
        db.in_transaction(|db| {
            let expense = db.insert_expense(&payload)?;
            let status = aggregate::load_category_status(
                db,
                &expense.category,
                expense.period(),
                &thresholds,
            )?;
            Ok(CreatedExpense {
                budget_exceeded: status.status == BudgetStatus::Exceeded,
                budget_status: status.status,
                expense,
            })
        })
    })
    .await?;

    if created.budget_status.is_alert() {
        tracing::info!(
            category = %created.expense.category,
            status = %created.budget_status,
            "budget alert"
        );
    }
    Ok((StatusCode::CREATED, Json(created)))
}

async fn get_expense(
    State(state): State<Arc<AppState>>,
    id: Result<Path<i64>, PathRejection>,
) -> ApiResult<Json<Expense>> {
    let Path(id) = id?;
    with_db(&state, move |db| db.get_expense(id))
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::NotFound(format!("Expense {id} not found")))
}

async fn delete_expense(
    State(state): State<Arc<AppState>>,
    id: Result<Path<i64>, PathRejection>,
) -> ApiResult<StatusCode> {
    let Path(id) = id?;
    if with_db(&state, move |db| db.delete_expense(id)).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::NotFound(format!("Expense {id} not found")))
    }
}

async fn export_expenses(
    State(state): State<Arc<AppState>>,
    filter: Result<Query<ExpenseFilter>, QueryRejection>,
) -> ApiResult<impl IntoResponse> {
    let Query(filter) = filter?;
    let body = with_db(&state, move |db| {
        let expenses = db.get_expenses(&filter)?;
        csv_io::export_to_string(&expenses)
    })
    .await?;
    Ok((
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8"),
            (
                header::CONTENT_DISPOSITION,
                "attachment; filename=\"expenses.csv\"",
            ),
        ],
        body,
    ))
}

async fn import_expenses(
    State(state): State<Arc<AppState>>,
    body: Result<String, StringRejection>,
) -> ApiResult<(StatusCode, Json<serde_json::Value>)> {
    let body = body?;
    let imported = with_db(&state, move |db| {
        let expenses = CsvImporter::read(body.as_bytes())?;
        db.insert_expenses_batch(&expenses)
    })
    .await?;
    tracing::info!(imported, "expenses imported");
    Ok((StatusCode::CREATED, Json(json!({ "imported": imported }))))
}
