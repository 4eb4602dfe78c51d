//! Categories API endpoints.

use api_types::category::{
    CategoryActive, CategoryCreate, CategoryList, CategoryListResponse, CategoryView,
};
use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};

use axum_extra::extract::WithRejection;

use crate::{ServerError, server::ServerState};

fn map_category(category: engine::ExpenseCategory) -> CategoryView {
    CategoryView {
        id: category.id,
        name: category.name,
        active: category.active,
    }
}

pub async fn list(
    State(state): State<ServerState>,
    WithRejection(Query(query), _): WithRejection<Query<CategoryList>, ServerError>,
) -> Result<Json<CategoryListResponse>, ServerError> {
    let include_inactive = query.include_inactive.unwrap_or(false);
    let categories = state
        .engine
        .categories(include_inactive)
        .await?
        .into_iter()
        .map(map_category)
        .collect();

    Ok(Json(CategoryListResponse { categories }))
}

pub async fn create(
    State(state): State<ServerState>,
    WithRejection(Json(payload), _): WithRejection<Json<CategoryCreate>, ServerError>,
) -> Result<(StatusCode, Json<CategoryView>), ServerError> {
    let category = state.engine.create_category(&payload.name).await?;
    Ok((StatusCode::CREATED, Json(map_category(category))))
}

pub async fn set_active(
    State(state): State<ServerState>,
    WithRejection(Path(category_id), _): WithRejection<Path<i64>, ServerError>,
    WithRejection(Json(payload), _): WithRejection<Json<CategoryActive>, ServerError>,
) -> Result<Json<CategoryView>, ServerError> {
    let category = state
        .engine
        .set_category_active(category_id, payload.active)
        .await?;
    Ok(Json(map_category(category)))
}
