use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    routing::get,
};
use chrono::NaiveDate;
use ledger::{
    analytics::{self, Analytics, Filter, Kind},
    transaction::Transaction,
};
use serde::Deserialize;

use super::fetch;
use crate::{error::AppError, state::AppState, utils::param};

const RESOURCE: &str = "Transaction";

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(list_handler))
        .route("/analytics", get(analytics_handler))
        .route("/:id", get(get_handler))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyticsQuery {
    #[serde(rename = "type")]
    kind: Option<String>,
    department: Option<String>,
    start_date: Option<String>,
    end_date: Option<String>,
}

impl AnalyticsQuery {
    fn filter(&self) -> Result<Filter, AppError> {
        Ok(Filter {
            department: param(&self.department).map(str::to_string),
            start_date: date(&self.start_date)?,
            end_date: date(&self.end_date)?,
        })
    }
}

fn date(value: &Option<String>) -> Result<Option<NaiveDate>, AppError> {
    param(value)
        .map(|v| {
            NaiveDate::parse_from_str(v, "%Y-%m-%d")
                .map_err(|_| AppError::BadRequest(format!("Invalid date '{v}', expected YYYY-MM-DD")))
        })
        .transpose()
}

async fn list_handler(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<Transaction>>, AppError> {
    Ok(Json(state.repo::<Transaction>().list().await?))
}

async fn get_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<Json<Transaction>, AppError> {
    Ok(Json(fetch(&state, id, RESOURCE).await?))
}

async fn analytics_handler(
    State(state): State<Arc<AppState>>,
    Query(query): Query<AnalyticsQuery>,
) -> Result<Json<Analytics>, AppError> {
    let filter = query.filter()?;
    let kind = Kind::parse(query.kind.as_deref());

    let transactions = state
        .repo::<Transaction>()
        .filter(|tx| filter.matches(tx))
        .await?;

    let report = analytics::analyze(kind, &transactions, &mut rand::thread_rng())?;

    Ok(Json(report))
}
