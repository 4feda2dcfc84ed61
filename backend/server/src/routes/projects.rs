use std::{collections::BTreeSet, sync::Arc};

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    routing::get,
};
use ledger::project::{NewProject, Project, ProjectPatch, ProjectStatus};
use serde::Deserialize;
use serde_json::{Value, json};

use super::{fetch, remove};
use crate::{
    error::AppError,
    state::AppState,
    utils::{label, now},
};

const RESOURCE: &str = "Project";

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(list_handler).post(create_handler))
        .route("/stats", get(stats_handler))
        .route(
            "/:id",
            get(get_handler).put(update_handler).delete(delete_handler),
        )
}

#[derive(Debug, Deserialize)]
pub struct ProjectFilter {
    status: Option<String>,
}

async fn list_handler(
    State(state): State<Arc<AppState>>,
    Query(filter): Query<ProjectFilter>,
) -> Result<Json<Vec<Project>>, AppError> {
    let repo = state.repo::<Project>();

    let projects = match label::<ProjectStatus>(&filter.status)? {
        Some(status) => repo.filter(|p| p.status == status).await?,
        None => repo.list().await?,
    };

    Ok(Json(projects))
}

async fn get_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<Json<Project>, AppError> {
    Ok(Json(fetch(&state, id, RESOURCE).await?))
}

async fn stats_handler(State(state): State<Arc<AppState>>) -> Result<Json<Value>, AppError> {
    let projects = state.repo::<Project>().list().await?;
    let count = |status: ProjectStatus| projects.iter().filter(|p| p.status == status).count();
    let statuses: BTreeSet<ProjectStatus> = projects.iter().map(|p| p.status).collect();

    Ok(Json(json!({
        "total": projects.len(),
        "planning": count(ProjectStatus::Planning),
        "inProgress": count(ProjectStatus::InProgress),
        "done": count(ProjectStatus::Done),
        "blocked": count(ProjectStatus::Blocked),
        "statuses": statuses,
    })))
}

async fn create_handler(
    State(state): State<Arc<AppState>>,
    Json(new): Json<NewProject>,
) -> Result<Json<Project>, AppError> {
    new.validate()?;

    let project = state.repo().insert(Project::create(new, now())).await?;

    Ok(Json(project))
}

async fn update_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    Json(patch): Json<ProjectPatch>,
) -> Result<Json<Project>, AppError> {
    let mut project: Project = fetch(&state, id, RESOURCE).await?;
    project.apply(patch, now());
    state.repo().update(&project).await?;

    Ok(Json(project))
}

async fn delete_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<(), AppError> {
    remove::<Project>(&state, id, RESOURCE).await
}
