use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    routing::get,
};
use ledger::customer::{Customer, CustomerLevel, CustomerPatch, NewCustomer};
use serde::Deserialize;
use serde_json::{Value, json};

use super::{fetch, percent, remove};
use crate::{
    error::AppError,
    state::AppState,
    utils::{Limit, label, now, param},
};

const RESOURCE: &str = "Customer";

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(list_handler).post(create_handler))
        .route("/stats", get(stats_handler))
        .route("/top", get(top_handler))
        .route("/vip", get(vip_handler))
        .route("/segments", get(segments_handler))
        .route(
            "/:id",
            get(get_handler).put(update_handler).delete(delete_handler),
        )
}

#[derive(Debug, Deserialize)]
pub struct CustomerFilter {
    level: Option<String>,
    location: Option<String>,
}

/// `level` takes precedence over `location`.
async fn list_handler(
    State(state): State<Arc<AppState>>,
    Query(filter): Query<CustomerFilter>,
) -> Result<Json<Value>, AppError> {
    let repo = state.repo::<Customer>();

    let customers = if let Some(level) = label::<CustomerLevel>(&filter.level)? {
        repo.filter(|c| c.level == level).await?
    } else if let Some(location) = param(&filter.location) {
        repo.filter(|c| c.location.as_deref() == Some(location)).await?
    } else {
        repo.list().await?
    };

    Ok(Json(json!({ "total": customers.len(), "customers": customers })))
}

async fn get_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<Json<Customer>, AppError> {
    Ok(Json(fetch(&state, id, RESOURCE).await?))
}

async fn stats_handler(State(state): State<Arc<AppState>>) -> Result<Json<Value>, AppError> {
    let customers = state.repo::<Customer>().list().await?;
    let at = |level: CustomerLevel| customers.iter().filter(|c| c.level == level).count();

    Ok(Json(json!({
        "total": customers.len(),
        "vip": customers.iter().filter(|c| c.level.is_vip()).count(),
        "diamond": at(CustomerLevel::Diamond),
        "gold": at(CustomerLevel::Gold),
        "new": at(CustomerLevel::New),
    })))
}

async fn top_handler(
    State(state): State<Arc<AppState>>,
    Query(Limit { limit }): Query<Limit>,
) -> Result<Json<Value>, AppError> {
    let mut customers = state.repo::<Customer>().list().await?;
    customers.sort_by(|a, b| b.total_spent.cmp(&a.total_spent));
    customers.truncate(limit);

    Ok(Json(json!({ "customers": customers })))
}

async fn vip_handler(State(state): State<Arc<AppState>>) -> Result<Json<Value>, AppError> {
    let mut customers = state
        .repo::<Customer>()
        .filter(|c| c.level.is_vip())
        .await?;
    customers.sort_by(|a, b| b.total_spent.cmp(&a.total_spent));

    Ok(Json(json!({ "customers": customers })))
}

async fn segments_handler(State(state): State<Arc<AppState>>) -> Result<Json<Value>, AppError> {
    let customers = state.repo::<Customer>().list().await?;
    let total = customers.len();

    let segments: Vec<Value> = [
        ("Diamond", CustomerLevel::Diamond),
        ("Gold", CustomerLevel::Gold),
        ("Silver", CustomerLevel::Silver),
        ("New", CustomerLevel::New),
    ]
    .into_iter()
    .map(|(segment, level)| {
        let count = customers.iter().filter(|c| c.level == level).count();
        json!({ "segment": segment, "count": count, "percent": percent(count, total) })
    })
    .collect();

    Ok(Json(json!({ "segments": segments })))
}

async fn create_handler(
    State(state): State<Arc<AppState>>,
    Json(new): Json<NewCustomer>,
) -> Result<(StatusCode, Json<Customer>), AppError> {
    new.validate()?;

    let customer = state
        .repo()
        .insert(Customer::create(new, now()))
        .await?;

    Ok((StatusCode::CREATED, Json(customer)))
}

async fn update_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    Json(patch): Json<CustomerPatch>,
) -> Result<Json<Customer>, AppError> {
    patch.validate()?;

    let mut customer: Customer = fetch(&state, id, RESOURCE).await?;
    customer.apply(patch);
    state.repo().update(&customer).await?;

    Ok(Json(customer))
}

async fn delete_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<Json<Value>, AppError> {
    remove::<Customer>(&state, id, RESOURCE).await?;

    Ok(Json(json!({ "message": "Customer deleted successfully" })))
}
