use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    routing::get,
};
use ledger::{
    analytics,
    purchase_order::{NewPurchaseOrder, PurchaseOrder, PurchaseOrderPatch, PurchaseOrderStatus},
    sales_order::PaymentStatus,
};
use serde::Deserialize;
use serde_json::{Value, json};

use super::{fetch, remove};
use crate::{
    error::AppError,
    state::AppState,
    utils::{Days, label, now, today},
};

const RESOURCE: &str = "Purchase order";

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(list_handler).post(create_handler))
        .route("/stats", get(stats_handler))
        .route("/pending", get(pending_handler))
        .route("/recent", get(recent_handler))
        .route("/supplier/:supplier_id", get(by_supplier_handler))
        .route(
            "/:id",
            get(get_handler).put(update_handler).delete(delete_handler),
        )
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PurchaseOrderFilter {
    status: Option<String>,
    payment_status: Option<String>,
}

async fn list_handler(
    State(state): State<Arc<AppState>>,
    Query(filter): Query<PurchaseOrderFilter>,
) -> Result<Json<Vec<PurchaseOrder>>, AppError> {
    let repo = state.repo::<PurchaseOrder>();

    let orders = if let Some(status) = label::<PurchaseOrderStatus>(&filter.status)? {
        repo.filter(|o| o.status == status).await?
    } else if let Some(payment) = label::<PaymentStatus>(&filter.payment_status)? {
        repo.filter(|o| o.payment_status == payment).await?
    } else {
        repo.list().await?
    };

    Ok(Json(orders))
}

async fn get_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<Json<PurchaseOrder>, AppError> {
    Ok(Json(fetch(&state, id, RESOURCE).await?))
}

async fn stats_handler(State(state): State<Arc<AppState>>) -> Result<Json<Value>, AppError> {
    let orders = state.repo::<PurchaseOrder>().list().await?;
    let count =
        |status: PurchaseOrderStatus| orders.iter().filter(|o| o.status == status).count();

    let total_purchased = analytics::sum(
        orders
            .iter()
            .filter(|o| o.status == PurchaseOrderStatus::Received)
            .filter_map(|o| o.grand_total),
    )?;

    Ok(Json(json!({
        "total": orders.len(),
        "draft": count(PurchaseOrderStatus::Draft),
        "sent": count(PurchaseOrderStatus::Sent),
        "confirmed": count(PurchaseOrderStatus::Confirmed),
        "received": count(PurchaseOrderStatus::Received),
        "totalPurchased": total_purchased,
    })))
}

/// Open orders whose expected date has passed.
async fn pending_handler(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<PurchaseOrder>>, AppError> {
    let today = today();

    Ok(Json(
        state
            .repo::<PurchaseOrder>()
            .filter(|o| o.is_pending_on(today))
            .await?,
    ))
}

async fn recent_handler(
    State(state): State<Arc<AppState>>,
    Query(days): Query<Days>,
) -> Result<Json<Vec<PurchaseOrder>>, AppError> {
    let since = days.since(today());

    let mut orders = state
        .repo::<PurchaseOrder>()
        .filter(|o| o.order_date >= since)
        .await?;
    orders.sort_by(|a, b| b.order_date.cmp(&a.order_date));

    Ok(Json(orders))
}

async fn by_supplier_handler(
    State(state): State<Arc<AppState>>,
    Path(supplier_id): Path<i64>,
) -> Result<Json<Vec<PurchaseOrder>>, AppError> {
    Ok(Json(
        state
            .repo::<PurchaseOrder>()
            .filter(|o| o.supplier_id == supplier_id)
            .await?,
    ))
}

async fn create_handler(
    State(state): State<Arc<AppState>>,
    Json(new): Json<NewPurchaseOrder>,
) -> Result<Json<PurchaseOrder>, AppError> {
    new.validate()?;

    let order = state
        .repo()
        .insert(PurchaseOrder::create(new, today(), now()))
        .await?;

    Ok(Json(order))
}

async fn update_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    Json(patch): Json<PurchaseOrderPatch>,
) -> Result<Json<PurchaseOrder>, AppError> {
    let mut order: PurchaseOrder = fetch(&state, id, RESOURCE).await?;
    order.apply(patch, now());
    state.repo().update(&order).await?;

    Ok(Json(order))
}

async fn delete_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<(), AppError> {
    remove::<PurchaseOrder>(&state, id, RESOURCE).await
}
