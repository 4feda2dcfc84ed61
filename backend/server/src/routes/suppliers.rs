use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    routing::get,
};
use ledger::supplier::{NewSupplier, Supplier, SupplierPatch, SupplierRating, SupplierStatus};
use serde::Deserialize;
use serde_json::{Value, json};

use super::{fetch, remove};
use crate::{
    error::AppError,
    state::AppState,
    utils::{Limit, label, now},
};

const RESOURCE: &str = "Supplier";

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(list_handler).post(create_handler))
        .route("/stats", get(stats_handler))
        .route("/top", get(top_handler))
        .route("/preferred", get(preferred_handler))
        .route(
            "/:id",
            get(get_handler).put(update_handler).delete(delete_handler),
        )
}

#[derive(Debug, Deserialize)]
pub struct SupplierFilter {
    status: Option<String>,
    rating: Option<String>,
}

async fn list_handler(
    State(state): State<Arc<AppState>>,
    Query(filter): Query<SupplierFilter>,
) -> Result<Json<Vec<Supplier>>, AppError> {
    let repo = state.repo::<Supplier>();

    let suppliers = if let Some(status) = label::<SupplierStatus>(&filter.status)? {
        repo.filter(|s| s.status == status).await?
    } else if let Some(rating) = label::<SupplierRating>(&filter.rating)? {
        repo.filter(|s| s.rating == Some(rating)).await?
    } else {
        repo.list().await?
    };

    Ok(Json(suppliers))
}

async fn get_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<Json<Supplier>, AppError> {
    Ok(Json(fetch(&state, id, RESOURCE).await?))
}

async fn stats_handler(State(state): State<Arc<AppState>>) -> Result<Json<Value>, AppError> {
    let suppliers = state.repo::<Supplier>().list().await?;
    let count =
        |status: SupplierStatus| suppliers.iter().filter(|s| s.status == status).count();

    Ok(Json(json!({
        "total": suppliers.len(),
        "active": count(SupplierStatus::Active),
        "inactive": count(SupplierStatus::Inactive),
        "blocked": count(SupplierStatus::Blocked),
    })))
}

/// Active suppliers by purchase volume.
async fn top_handler(
    State(state): State<Arc<AppState>>,
    Query(Limit { limit }): Query<Limit>,
) -> Result<Json<Vec<Supplier>>, AppError> {
    let mut suppliers = state
        .repo::<Supplier>()
        .filter(|s| s.status == SupplierStatus::Active)
        .await?;
    suppliers.sort_by(|a, b| b.total_purchased.cmp(&a.total_purchased));
    suppliers.truncate(limit);

    Ok(Json(suppliers))
}

async fn preferred_handler(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<Supplier>>, AppError> {
    Ok(Json(
        state
            .repo::<Supplier>()
            .filter(Supplier::is_preferred)
            .await?,
    ))
}

async fn create_handler(
    State(state): State<Arc<AppState>>,
    Json(new): Json<NewSupplier>,
) -> Result<Json<Supplier>, AppError> {
    new.validate()?;

    let supplier = state.repo().insert(Supplier::create(new, now())).await?;

    Ok(Json(supplier))
}

async fn update_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    Json(patch): Json<SupplierPatch>,
) -> Result<Json<Supplier>, AppError> {
    patch.validate()?;

    let mut supplier: Supplier = fetch(&state, id, RESOURCE).await?;
    supplier.apply(patch, now());
    state.repo().update(&supplier).await?;

    Ok(Json(supplier))
}

async fn delete_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<(), AppError> {
    remove::<Supplier>(&state, id, RESOURCE).await
}
