use std::sync::Arc;

use axum::{Json, Router, routing::get};
use ledger::Record;
use serde_json::{Value, json};

use crate::{error::AppError, state::AppState};

pub mod customers;
pub mod data;
pub mod employees;
pub mod insights;
pub mod invoices;
pub mod products;
pub mod projects;
pub mod purchase_orders;
pub mod reports;
pub mod sales_orders;
pub mod suppliers;
pub mod transactions;
pub mod warehouses;

/// Every resource router, to be nested under `/api`.
pub fn resources() -> Router<Arc<AppState>> {
    Router::new()
        .nest("/customers", customers::router())
        .nest("/products", products::router())
        .nest("/invoices", invoices::router())
        .nest("/sales-orders", sales_orders::router())
        .nest("/purchase-orders", purchase_orders::router())
        .nest("/suppliers", suppliers::router())
        .nest("/warehouses", warehouses::router())
        .nest("/employees", employees::router())
        .nest("/projects", projects::router())
        .nest("/reports", reports::router())
        .nest("/transactions", transactions::router())
        .nest("/data", data::router())
        .merge(insights::router())
}

pub fn health() -> Router<Arc<AppState>> {
    Router::new().route("/health", get(health_handler))
}

async fn health_handler() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

/// Loads one record or answers 404 naming the resource.
pub(crate) async fn fetch<T: Record>(
    state: &AppState,
    id: i64,
    resource: &str,
) -> Result<T, AppError> {
    state
        .repo::<T>()
        .find(id)
        .await?
        .ok_or_else(|| AppError::not_found(resource))
}

/// Deletes one record or answers 404 naming the resource.
pub(crate) async fn remove<T: Record>(
    state: &AppState,
    id: i64,
    resource: &str,
) -> Result<(), AppError> {
    if !state.repo::<T>().delete(id).await? {
        return Err(AppError::not_found(resource));
    }

    Ok(())
}

/// Integer share of `part` in `total`, zero for an empty total.
pub(crate) fn percent(part: usize, total: usize) -> usize {
    if total == 0 {
        0
    } else {
        part * 100 / total
    }
}
