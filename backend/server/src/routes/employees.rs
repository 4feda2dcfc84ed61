use std::{collections::BTreeSet, sync::Arc};

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    routing::get,
};
use ledger::employee::{Employee, EmployeePatch, EmployeeStatus, NewEmployee};
use serde::Deserialize;
use serde_json::{Value, json};

use super::{fetch, remove};
use crate::{
    error::AppError,
    state::AppState,
    utils::{label, now, param},
};

const RESOURCE: &str = "Employee";

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(list_handler).post(create_handler))
        .route("/stats", get(stats_handler))
        .route("/departments", get(departments_handler))
        .route("/department/:department/count", get(department_count_handler))
        .route("/active", get(active_handler))
        .route(
            "/:id",
            get(get_handler).put(update_handler).delete(delete_handler),
        )
}

#[derive(Debug, Deserialize)]
pub struct EmployeeFilter {
    department: Option<String>,
    status: Option<String>,
}

async fn list_handler(
    State(state): State<Arc<AppState>>,
    Query(filter): Query<EmployeeFilter>,
) -> Result<Json<Vec<Employee>>, AppError> {
    let repo = state.repo::<Employee>();

    let employees = if let Some(department) = param(&filter.department) {
        repo.filter(|e| e.department.as_deref() == Some(department))
            .await?
    } else if let Some(status) = label::<EmployeeStatus>(&filter.status)? {
        repo.filter(|e| e.status == status).await?
    } else {
        repo.list().await?
    };

    Ok(Json(employees))
}

async fn get_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<Json<Employee>, AppError> {
    Ok(Json(fetch(&state, id, RESOURCE).await?))
}

async fn stats_handler(State(state): State<Arc<AppState>>) -> Result<Json<Value>, AppError> {
    let employees = state.repo::<Employee>().list().await?;
    let count =
        |status: EmployeeStatus| employees.iter().filter(|e| e.status == status).count();

    Ok(Json(json!({
        "total": employees.len(),
        "active": count(EmployeeStatus::Active),
        "onLeave": count(EmployeeStatus::OnLeave),
        "resigned": count(EmployeeStatus::Resigned),
    })))
}

/// Distinct department names, sorted.
async fn departments_handler(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<String>>, AppError> {
    let employees = state.repo::<Employee>().list().await?;

    let departments: BTreeSet<String> = employees
        .into_iter()
        .filter_map(|e| e.department)
        .collect();

    Ok(Json(departments.into_iter().collect()))
}

/// Active headcount of one department.
async fn department_count_handler(
    State(state): State<Arc<AppState>>,
    Path(department): Path<String>,
) -> Result<Json<Value>, AppError> {
    let count = state
        .repo::<Employee>()
        .filter(|e| {
            e.status == EmployeeStatus::Active
                && e.department.as_deref() == Some(department.as_str())
        })
        .await?
        .len();

    Ok(Json(json!({ "department": department, "count": count })))
}

async fn active_handler(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<Employee>>, AppError> {
    let mut employees = state
        .repo::<Employee>()
        .filter(|e| e.status == EmployeeStatus::Active)
        .await?;
    employees.sort_by_key(|e| e.hire_date);

    Ok(Json(employees))
}

async fn create_handler(
    State(state): State<Arc<AppState>>,
    Json(new): Json<NewEmployee>,
) -> Result<Json<Employee>, AppError> {
    new.validate()?;

    let employee = state.repo().insert(Employee::create(new, now())).await?;

    Ok(Json(employee))
}

async fn update_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    Json(patch): Json<EmployeePatch>,
) -> Result<Json<Employee>, AppError> {
    let mut employee: Employee = fetch(&state, id, RESOURCE).await?;
    employee.apply(patch, now());
    state.repo().update(&employee).await?;

    Ok(Json(employee))
}

async fn delete_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<(), AppError> {
    remove::<Employee>(&state, id, RESOURCE).await
}
