use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    routing::get,
};
use ledger::warehouse::{NewWarehouse, Warehouse, WarehousePatch, WarehouseStatus, WarehouseType};
use serde::Deserialize;
use serde_json::{Value, json};

use super::{fetch, remove};
use crate::{
    error::AppError,
    state::AppState,
    utils::{label, now},
};

const RESOURCE: &str = "Warehouse";

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(list_handler).post(create_handler))
        .route("/stats", get(stats_handler))
        .route("/active", get(active_handler))
        .route(
            "/:id",
            get(get_handler).put(update_handler).delete(delete_handler),
        )
}

#[derive(Debug, Deserialize)]
pub struct WarehouseFilter {
    status: Option<String>,
    #[serde(rename = "type")]
    kind: Option<String>,
}

async fn list_handler(
    State(state): State<Arc<AppState>>,
    Query(filter): Query<WarehouseFilter>,
) -> Result<Json<Vec<Warehouse>>, AppError> {
    let repo = state.repo::<Warehouse>();

    let warehouses = if let Some(status) = label::<WarehouseStatus>(&filter.status)? {
        repo.filter(|w| w.status == status).await?
    } else if let Some(kind) = label::<WarehouseType>(&filter.kind)? {
        repo.filter(|w| w.kind == kind).await?
    } else {
        repo.list().await?
    };

    Ok(Json(warehouses))
}

async fn get_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<Json<Warehouse>, AppError> {
    Ok(Json(fetch(&state, id, RESOURCE).await?))
}

/// Stock and capacity only count active warehouses.
async fn stats_handler(State(state): State<Arc<AppState>>) -> Result<Json<Value>, AppError> {
    let warehouses = state.repo::<Warehouse>().list().await?;
    let active = || {
        warehouses
            .iter()
            .filter(|w| w.status == WarehouseStatus::Active)
    };

    let total_stock = active().fold(0u64, |total, w| total.saturating_add(w.current_stock));
    let total_capacity = active()
        .filter_map(|w| w.capacity)
        .fold(0u64, |total, capacity| total.saturating_add(capacity));
    let utilization = if total_capacity == 0 {
        0.0
    } else {
        total_stock as f64 * 100.0 / total_capacity as f64
    };

    Ok(Json(json!({
        "total": warehouses.len(),
        "active": active().count(),
        "inactive": warehouses.iter().filter(|w| w.status == WarehouseStatus::Inactive).count(),
        "totalStock": total_stock,
        "totalCapacity": total_capacity,
        "utilizationPercent": utilization,
    })))
}

async fn active_handler(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<Warehouse>>, AppError> {
    let mut warehouses = state
        .repo::<Warehouse>()
        .filter(|w| w.status == WarehouseStatus::Active)
        .await?;
    warehouses.sort_by(|a, b| b.current_stock.cmp(&a.current_stock));

    Ok(Json(warehouses))
}

async fn create_handler(
    State(state): State<Arc<AppState>>,
    Json(new): Json<NewWarehouse>,
) -> Result<Json<Warehouse>, AppError> {
    new.validate()?;

    let warehouse = state.repo().insert(Warehouse::create(new, now())).await?;

    Ok(Json(warehouse))
}

async fn update_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    Json(patch): Json<WarehousePatch>,
) -> Result<Json<Warehouse>, AppError> {
    let mut warehouse: Warehouse = fetch(&state, id, RESOURCE).await?;
    warehouse.apply(patch, now());
    state.repo().update(&warehouse).await?;

    Ok(Json(warehouse))
}

async fn delete_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<(), AppError> {
    remove::<Warehouse>(&state, id, RESOURCE).await
}
