use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use serde::Deserialize;

use super::error::ApiResult;
use super::with_db;
use crate::main_lib::AppState;
use crate::models::Category;

pub(super) fn router() -> Router<Arc<AppState>> {
    Router::new().route("/categories", get(list_categories).post(create_category))
}

#[derive(Deserialize)]
struct NewCategory {
    name: String,
}

async fn list_categories(State(state): State<Arc<AppState>>) -> ApiResult<Json<Vec<Category>>> {
    let categories = with_db(&state, |db| db.get_categories()).await?;
    Ok(Json(categories))
}

async fn create_category(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<NewCategory>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<Category>)> {
    let Json(payload) = payload?;
    let category = with_db(&state, move |db| db.insert_category(&payload.name)).await?;
    tracing::info!(category = %category.name, "category added");
    Ok((StatusCode::CREATED, Json(category)))
}
