use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    routing::get,
};
use ledger::{
    analytics,
    invoice::{Invoice, InvoicePatch, InvoiceStatus, NewInvoice},
};
use serde::Deserialize;
use serde_json::{Value, json};

use super::{fetch, remove};
use crate::{
    error::AppError,
    state::AppState,
    utils::{Days, label, now, today},
};

const RESOURCE: &str = "Invoice";

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(list_handler).post(create_handler))
        .route("/stats", get(stats_handler))
        .route("/overdue", get(overdue_handler))
        .route("/recent", get(recent_handler))
        .route("/customer/:customer_id", get(by_customer_handler))
        .route(
            "/:id",
            get(get_handler).put(update_handler).delete(delete_handler),
        )
}

#[derive(Debug, Deserialize)]
pub struct InvoiceFilter {
    status: Option<String>,
}

async fn list_handler(
    State(state): State<Arc<AppState>>,
    Query(filter): Query<InvoiceFilter>,
) -> Result<Json<Vec<Invoice>>, AppError> {
    let repo = state.repo::<Invoice>();

    let invoices = match label::<InvoiceStatus>(&filter.status)? {
        Some(status) => repo.filter(|i| i.status == status).await?,
        None => repo.list().await?,
    };

    Ok(Json(invoices))
}

async fn get_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<Json<Invoice>, AppError> {
    Ok(Json(fetch(&state, id, RESOURCE).await?))
}

async fn stats_handler(State(state): State<Arc<AppState>>) -> Result<Json<Value>, AppError> {
    let invoices = state.repo::<Invoice>().list().await?;
    let count = |status: InvoiceStatus| invoices.iter().filter(|i| i.status == status).count();

    let total_paid = analytics::sum(
        invoices
            .iter()
            .filter(|i| i.status == InvoiceStatus::Paid)
            .filter_map(|i| i.total_amount),
    )?;
    let total_outstanding = analytics::sum(
        invoices
            .iter()
            .filter(|i| i.status != InvoiceStatus::Paid)
            .filter_map(|i| i.balance_due),
    )?;

    Ok(Json(json!({
        "total": invoices.len(),
        "draft": count(InvoiceStatus::Draft),
        "sent": count(InvoiceStatus::Sent),
        "paid": count(InvoiceStatus::Paid),
        "overdue": count(InvoiceStatus::Overdue),
        "totalPaid": total_paid,
        "totalOutstanding": total_outstanding,
    })))
}

async fn overdue_handler(State(state): State<Arc<AppState>>) -> Result<Json<Vec<Invoice>>, AppError> {
    let today = today();

    Ok(Json(
        state
            .repo::<Invoice>()
            .filter(|i| i.is_overdue_on(today))
            .await?,
    ))
}

/// Invoices dated within the window, newest first.
async fn recent_handler(
    State(state): State<Arc<AppState>>,
    Query(days): Query<Days>,
) -> Result<Json<Vec<Invoice>>, AppError> {
    let since = days.since(today());

    let mut invoices = state
        .repo::<Invoice>()
        .filter(|i| i.invoice_date >= since)
        .await?;
    invoices.sort_by(|a, b| b.invoice_date.cmp(&a.invoice_date));

    Ok(Json(invoices))
}

async fn by_customer_handler(
    State(state): State<Arc<AppState>>,
    Path(customer_id): Path<i64>,
) -> Result<Json<Vec<Invoice>>, AppError> {
    Ok(Json(
        state
            .repo::<Invoice>()
            .filter(|i| i.customer_id == customer_id)
            .await?,
    ))
}

async fn create_handler(
    State(state): State<Arc<AppState>>,
    Json(new): Json<NewInvoice>,
) -> Result<Json<Invoice>, AppError> {
    new.validate()?;

    let invoice = state
        .repo()
        .insert(Invoice::create(new, today(), now()))
        .await?;

    Ok(Json(invoice))
}

async fn update_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    Json(patch): Json<InvoicePatch>,
) -> Result<Json<Invoice>, AppError> {
    let mut invoice: Invoice = fetch(&state, id, RESOURCE).await?;
    invoice.apply(patch, today(), now());
    state.repo().update(&invoice).await?;

    Ok(Json(invoice))
}

async fn delete_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<(), AppError> {
    remove::<Invoice>(&state, id, RESOURCE).await
}
