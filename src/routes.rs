use std::any::Any;
use std::sync::Arc;

use axum::body::Body;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::{header, Response, StatusCode};
use axum::routing::get;
use axum::{Json, Router};
use chrono::Utc;
use serde_json::{json, Value};
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::CorsLayer;

use crate::error::ApiError;
use crate::models::{Order, OrderPayload};
use crate::store::OrderStore;

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn OrderStore>,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/orders", get(list_orders).post(create_order))
        .route(
            "/api/orders/:id",
            get(get_order).put(update_order).delete(delete_order),
        )
        .route("/api/health", get(health))
        .with_state(state)
        .layer(CorsLayer::permissive())
        .layer(CatchPanicLayer::custom(handle_panic))
}

async fn list_orders(State(state): State<AppState>) -> Result<Json<Vec<Order>>, ApiError> {
    let orders = state
        .store
        .list()
        .await
        .map_err(|e| e.api("Failed to fetch orders"))?;
    Ok(Json(orders))
}

async fn get_order(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<Order>, ApiError> {
    let order = state
        .store
        .get(id)
        .await
        .map_err(|e| e.api("Failed to fetch order"))?;
    Ok(Json(order))
}

async fn create_order(
    State(state): State<AppState>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    let new_order = parse_payload(body)?.into_new_order()?;
    let id = state
        .store
        .create(&new_order)
        .await
        .map_err(|e| e.api("Failed to add order"))?;
    Ok((
        StatusCode::CREATED,
        Json(json!({ "id": id, "message": "Order added successfully" })),
    ))
}

async fn update_order(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<Json<Value>, ApiError> {
    let changes = parse_payload(body)?.into_changes()?;
    state
        .store
        .update(id, &changes)
        .await
        .map_err(|e| e.api("Failed to update order"))?;
    Ok(Json(json!({ "message": "Order updated successfully" })))
}

async fn delete_order(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<Value>, ApiError> {
    state
        .store
        .delete(id)
        .await
        .map_err(|e| e.api("Failed to delete order"))?;
    Ok(Json(json!({ "message": "Order deleted successfully" })))
}

async fn health(State(state): State<AppState>) -> Result<Json<Value>, ApiError> {
    state
        .store
        .ping()
        .await
        .map_err(|e| e.api("Database is unreachable"))?;
    Ok(Json(json!({
        "status": "ok",
        "message": "Backend is running!",
        "database": "connected",
        "timestamp": Utc::now().to_rfc3339(),
    })))
}

/// Keeps error bodies in the `{"error": ...}` shape even when the request
/// body is malformed or has the wrong field types.
fn parse_payload(body: Result<Json<Value>, JsonRejection>) -> Result<OrderPayload, ApiError> {
    let Json(value) = body.map_err(|e| ApiError::Validation(format!("Invalid request body: {}", e)))?;
    serde_json::from_value(value)
        .map_err(|e| ApiError::Validation(format!("Invalid request body: {}", e)))
}

fn handle_panic(_panic: Box<dyn Any + Send + 'static>) -> Response<Body> {
    tracing::error!("request handler panicked");
    let body = json!({ "error": "Internal server error" }).to_string();
    Response::builder()
        .status(StatusCode::INTERNAL_SERVER_ERROR)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body))
        .unwrap_or_default()
}
