use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    routing::get,
};
use ledger::{
    analytics,
    sales_order::{NewSalesOrder, PaymentStatus, SalesOrder, SalesOrderPatch, SalesOrderStatus},
};
use serde::Deserialize;
use serde_json::{Value, json};

use super::{fetch, remove};
use crate::{
    error::AppError,
    state::AppState,
    utils::{Days, label, now, today},
};

const RESOURCE: &str = "Sales order";

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(list_handler).post(create_handler))
        .route("/stats", get(stats_handler))
        .route("/recent", get(recent_handler))
        .route("/customer/:customer_id", get(by_customer_handler))
        .route(
            "/:id",
            get(get_handler).put(update_handler).delete(delete_handler),
        )
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SalesOrderFilter {
    status: Option<String>,
    payment_status: Option<String>,
}

fn newest_first(orders: &mut [SalesOrder]) {
    orders.sort_by(|a, b| b.order_date.cmp(&a.order_date));
}

/// `status` takes precedence over `paymentStatus`.
async fn list_handler(
    State(state): State<Arc<AppState>>,
    Query(filter): Query<SalesOrderFilter>,
) -> Result<Json<Vec<SalesOrder>>, AppError> {
    let repo = state.repo::<SalesOrder>();

    let orders = if let Some(status) = label::<SalesOrderStatus>(&filter.status)? {
        let mut orders = repo.filter(|o| o.status == status).await?;
        newest_first(&mut orders);
        orders
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
) -> Result<Json<SalesOrder>, AppError> {
    Ok(Json(fetch(&state, id, RESOURCE).await?))
}

async fn stats_handler(State(state): State<Arc<AppState>>) -> Result<Json<Value>, AppError> {
    let orders = state.repo::<SalesOrder>().list().await?;
    let count = |status: SalesOrderStatus| orders.iter().filter(|o| o.status == status).count();

    let total_revenue = analytics::sum(
        orders
            .iter()
            .filter(|o| o.status != SalesOrderStatus::Cancelled)
            .filter_map(|o| o.grand_total),
    )?;

    Ok(Json(json!({
        "total": orders.len(),
        "pending": count(SalesOrderStatus::Pending),
        "confirmed": count(SalesOrderStatus::Confirmed),
        "delivered": count(SalesOrderStatus::Delivered),
        "cancelled": count(SalesOrderStatus::Cancelled),
        "totalRevenue": total_revenue,
    })))
}

async fn recent_handler(
    State(state): State<Arc<AppState>>,
    Query(days): Query<Days>,
) -> Result<Json<Vec<SalesOrder>>, AppError> {
    let since = days.since(today());

    let mut orders = state
        .repo::<SalesOrder>()
        .filter(|o| o.order_date.date() >= since)
        .await?;
    newest_first(&mut orders);

    Ok(Json(orders))
}

async fn by_customer_handler(
    State(state): State<Arc<AppState>>,
    Path(customer_id): Path<i64>,
) -> Result<Json<Vec<SalesOrder>>, AppError> {
    Ok(Json(
        state
            .repo::<SalesOrder>()
            .filter(|o| o.customer_id == customer_id)
            .await?,
    ))
}

async fn create_handler(
    State(state): State<Arc<AppState>>,
    Json(new): Json<NewSalesOrder>,
) -> Result<Json<SalesOrder>, AppError> {
    new.validate()?;

    let order = state
        .repo()
        .insert(SalesOrder::create(new, now()))
        .await?;

    Ok(Json(order))
}

async fn update_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    Json(patch): Json<SalesOrderPatch>,
) -> Result<Json<SalesOrder>, AppError> {
    let mut order: SalesOrder = fetch(&state, id, RESOURCE).await?;
    order.apply(patch, now());
    state.repo().update(&order).await?;

    Ok(Json(order))
}

async fn delete_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<(), AppError> {
    remove::<SalesOrder>(&state, id, RESOURCE).await
}
