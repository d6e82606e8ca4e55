//! Order API Handlers
//!
//! Checkout runs under the session actor's identity; an order always
//! belongs to the customer who submitted it. Transitions and deletion are
//! administrative (enforced by the orders manager).

use axum::{
    Json,
    extract::{Path, State},
};
use serde::Deserialize;
use shared::error::{StoreError, StoreResult};
use shared::models::{Order, OrderCreate, OrderStatus, Role};

use crate::api::actor::CurrentActor;
use crate::core::ServerState;

/// POST /api/orders - checkout
pub async fn create(
    State(state): State<ServerState>,
    CurrentActor(actor): CurrentActor,
    Json(payload): Json<OrderCreate>,
) -> StoreResult<Json<Order>> {
    let order = state.orders.checkout(&actor.id, payload).await?;
    Ok(Json(order))
}

/// GET /api/orders - admins see everything, customers their own
pub async fn list(
    State(state): State<ServerState>,
    CurrentActor(actor): CurrentActor,
) -> Json<Vec<Order>> {
    let orders = match actor.role {
        Role::Admin => state.orders.list(),
        Role::Customer => state.orders.list_for_customer(&actor.id),
    };
    Json(orders)
}

/// GET /api/orders/{id} - owner or admin
pub async fn get_by_id(
    State(state): State<ServerState>,
    CurrentActor(actor): CurrentActor,
    Path(id): Path<String>,
) -> StoreResult<Json<Order>> {
    let order = state.orders.get(&id)?;
    if !actor.is_admin() && order.customer_id != actor.id {
        return Err(StoreError::forbidden("order belongs to another customer"));
    }
    Ok(Json(order))
}

/// Transition request body
#[derive(Debug, Deserialize)]
pub struct TransitionRequest {
    pub status: OrderStatus,
}

/// POST /api/orders/{id}/status - administrative status transition
pub async fn transition(
    State(state): State<ServerState>,
    CurrentActor(actor): CurrentActor,
    Path(id): Path<String>,
    Json(payload): Json<TransitionRequest>,
) -> StoreResult<Json<Order>> {
    let order = state.orders.transition(&id, payload.status, &actor).await?;
    Ok(Json(order))
}

/// DELETE /api/orders/{id} - administrative purge
pub async fn delete(
    State(state): State<ServerState>,
    CurrentActor(actor): CurrentActor,
    Path(id): Path<String>,
) -> StoreResult<Json<serde_json::Value>> {
    state.orders.delete(&id, &actor)?;
    Ok(Json(serde_json::json!({ "deleted": id })))
}
