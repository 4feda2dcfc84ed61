use std::{collections::BTreeMap, sync::Arc};

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    routing::get,
};
use ledger::report::{NewReport, Report, ReportPatch, ReportStatus};
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::info;

use super::{fetch, remove};
use crate::{
    error::AppError,
    state::AppState,
    utils::{Days, label, now, param},
};

const RESOURCE: &str = "Report";

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(list_handler).post(create_handler))
        .route("/recent", get(recent_handler))
        .route("/types", get(types_handler))
        .route(
            "/:id",
            get(get_handler).put(update_handler).delete(delete_handler),
        )
}

#[derive(Debug, Deserialize)]
pub struct ReportFilter {
    #[serde(rename = "type")]
    kind: Option<String>,
    status: Option<String>,
}

fn newest_first(reports: &mut [Report]) {
    reports.sort_by(|a, b| b.created_at.cmp(&a.created_at));
}

async fn list_handler(
    State(state): State<Arc<AppState>>,
    Query(filter): Query<ReportFilter>,
) -> Result<Json<Value>, AppError> {
    let repo = state.repo::<Report>();

    let mut reports = if let Some(kind) = param(&filter.kind) {
        repo.filter(|r| r.kind == kind).await?
    } else if let Some(status) = label::<ReportStatus>(&filter.status)? {
        repo.filter(|r| r.status == status).await?
    } else {
        repo.list().await?
    };
    newest_first(&mut reports);

    Ok(Json(json!({ "total": reports.len(), "reports": reports })))
}

async fn get_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<Json<Report>, AppError> {
    Ok(Json(fetch(&state, id, RESOURCE).await?))
}

async fn recent_handler(
    State(state): State<Arc<AppState>>,
    Query(days): Query<Days>,
) -> Result<Json<Value>, AppError> {
    let since = days.since_time(now());

    let mut reports = state
        .repo::<Report>()
        .filter(|r| r.created_at >= since)
        .await?;
    newest_first(&mut reports);

    Ok(Json(json!({ "reports": reports })))
}

async fn types_handler(State(state): State<Arc<AppState>>) -> Result<Json<Value>, AppError> {
    let reports = state.repo::<Report>().list().await?;

    let mut types: BTreeMap<String, usize> = BTreeMap::new();
    for report in reports {
        *types.entry(report.kind).or_default() += 1;
    }

    Ok(Json(json!({ "types": types })))
}

/// Generation is immediate: the stored report is marked completed before
/// it is returned.
async fn create_handler(
    State(state): State<Arc<AppState>>,
    Json(new): Json<NewReport>,
) -> Result<(StatusCode, Json<Report>), AppError> {
    new.validate()?;

    let repo = state.repo::<Report>();
    let mut report = repo.insert(Report::create(new, now())).await?;

    report.status = ReportStatus::Completed;
    repo.update(&report).await?;
    info!("Generated {} report {}", report.kind, report.id);

    Ok((StatusCode::CREATED, Json(report)))
}

async fn update_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    Json(patch): Json<ReportPatch>,
) -> Result<Json<Report>, AppError> {
    let mut report: Report = fetch(&state, id, RESOURCE).await?;
    report.apply(patch);
    state.repo().update(&report).await?;

    Ok(Json(report))
}

async fn delete_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<Json<Value>, AppError> {
    remove::<Report>(&state, id, RESOURCE).await?;

    Ok(Json(json!({ "message": "Report deleted successfully" })))
}
