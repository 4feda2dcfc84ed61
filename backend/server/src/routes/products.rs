use std::{collections::BTreeMap, sync::Arc};

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    routing::get,
};
use ledger::product::{NewProduct, Product, ProductPatch, ProductStatus};
use serde::Deserialize;
use serde_json::{Value, json};

use super::{fetch, remove};
use crate::{
    error::AppError,
    state::AppState,
    utils::{Limit, label, now, param},
};

const RESOURCE: &str = "Product";

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(list_handler).post(create_handler))
        .route("/stats", get(stats_handler))
        .route("/top-selling", get(top_selling_handler))
        .route("/categories", get(categories_handler))
        .route(
            "/:id",
            get(get_handler).put(update_handler).delete(delete_handler),
        )
}

#[derive(Debug, Deserialize)]
pub struct ProductFilter {
    category: Option<String>,
    status: Option<String>,
}

async fn list_handler(
    State(state): State<Arc<AppState>>,
    Query(filter): Query<ProductFilter>,
) -> Result<Json<Value>, AppError> {
    let repo = state.repo::<Product>();

    let products = if let Some(category) = param(&filter.category) {
        repo.filter(|p| p.category.as_deref() == Some(category))
            .await?
    } else if let Some(status) = label::<ProductStatus>(&filter.status)? {
        repo.filter(|p| p.status == status).await?
    } else {
        repo.list().await?
    };

    Ok(Json(json!({ "total": products.len(), "products": products })))
}

async fn get_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<Json<Product>, AppError> {
    Ok(Json(fetch(&state, id, RESOURCE).await?))
}

async fn stats_handler(State(state): State<Arc<AppState>>) -> Result<Json<Value>, AppError> {
    let products = state.repo::<Product>().list().await?;

    Ok(Json(json!({
        "total": products.len(),
        "active": products.iter().filter(|p| p.status == ProductStatus::Active).count(),
        "lowStock": products.iter().filter(|p| p.is_low_stock()).count(),
        "outOfStock": products.iter().filter(|p| p.is_out_of_stock()).count(),
    })))
}

async fn top_selling_handler(
    State(state): State<Arc<AppState>>,
    Query(Limit { limit }): Query<Limit>,
) -> Result<Json<Value>, AppError> {
    let mut products = state.repo::<Product>().list().await?;
    products.sort_by(|a, b| b.sold_count.cmp(&a.sold_count));
    products.truncate(limit);

    Ok(Json(json!({ "products": products })))
}

async fn categories_handler(State(state): State<Arc<AppState>>) -> Result<Json<Value>, AppError> {
    let products = state.repo::<Product>().list().await?;

    let mut counts: BTreeMap<Option<&str>, usize> = BTreeMap::new();
    for product in &products {
        *counts.entry(product.category.as_deref()).or_default() += 1;
    }

    let categories: Vec<Value> = counts
        .into_iter()
        .map(|(name, count)| json!({ "name": name, "count": count }))
        .collect();

    Ok(Json(json!({ "categories": categories })))
}

async fn create_handler(
    State(state): State<Arc<AppState>>,
    Json(new): Json<NewProduct>,
) -> Result<(StatusCode, Json<Product>), AppError> {
    new.validate()?;

    let product = state.repo().insert(Product::create(new, now())).await?;

    Ok((StatusCode::CREATED, Json(product)))
}

async fn update_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    Json(patch): Json<ProductPatch>,
) -> Result<Json<Product>, AppError> {
    let mut product: Product = fetch(&state, id, RESOURCE).await?;
    product.apply(patch, now());
    state.repo().update(&product).await?;

    Ok(Json(product))
}

async fn delete_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<Json<Value>, AppError> {
    remove::<Product>(&state, id, RESOURCE).await?;

    Ok(Json(json!({ "message": "Product deleted successfully" })))
}
