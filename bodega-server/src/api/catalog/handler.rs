//! Catalog API Handlers

use axum::{
    Json,
    extract::{Path, State},
};
use shared::error::StoreResult;
use shared::models::{CatalogItem, CatalogItemCreate, CatalogItemUpdate};

use crate::api::actor::{CurrentActor, ensure_admin};
use crate::core::ServerState;

/// GET /api/catalog - full catalog listing
pub async fn list(
    State(state): State<ServerState>,
    CurrentActor(_actor): CurrentActor,
) -> Json<Vec<CatalogItem>> {
    Json(state.catalog.list())
}

/// GET /api/catalog/{id}
pub async fn get_by_id(
    State(state): State<ServerState>,
    CurrentActor(_actor): CurrentActor,
    Path(id): Path<String>,
) -> StoreResult<Json<CatalogItem>> {
    Ok(Json(state.catalog.get(&id)?))
}

/// GET /api/catalog/low-stock - items running out (admin dashboard)
pub async fn low_stock(
    State(state): State<ServerState>,
    CurrentActor(actor): CurrentActor,
) -> StoreResult<Json<Vec<CatalogItem>>> {
    ensure_admin(&actor)?;
    Ok(Json(state.catalog.low_stock()))
}

/// POST /api/catalog - create an item
pub async fn create(
    State(state): State<ServerState>,
    CurrentActor(actor): CurrentActor,
    Json(payload): Json<CatalogItemCreate>,
) -> StoreResult<Json<CatalogItem>> {
    ensure_admin(&actor)?;
    Ok(Json(state.catalog.create(payload)?))
}

/// PUT /api/catalog/{id} - partial update, last-writer-wins
pub async fn update(
    State(state): State<ServerState>,
    CurrentActor(actor): CurrentActor,
    Path(id): Path<String>,
    Json(payload): Json<CatalogItemUpdate>,
) -> StoreResult<Json<CatalogItem>> {
    ensure_admin(&actor)?;
    Ok(Json(state.catalog.update(&id, payload)?))
}

/// DELETE /api/catalog/{id}
pub async fn delete(
    State(state): State<ServerState>,
    CurrentActor(actor): CurrentActor,
    Path(id): Path<String>,
) -> StoreResult<Json<serde_json::Value>> {
    ensure_admin(&actor)?;
    state.catalog.delete(&id)?;
    Ok(Json(serde_json::json!({ "deleted": id })))
}
