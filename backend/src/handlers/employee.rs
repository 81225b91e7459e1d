//! Employee handlers

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;

use crate::error::AppResult;
use crate::services::employee::{
    CreateEmployeeInput, Employee, EmployeeListQuery, EmployeePage, EmployeeService,
    UpdateEmployeeInput,
};
use crate::AppState;

pub async fn list_employees(
    State(state): State<AppState>,
    Query(query): Query<EmployeeListQuery>,
) -> AppResult<Json<EmployeePage>> {
    let page = EmployeeService::new(state.db.clone()).list(&query).await?;
    Ok(Json(page))
}

pub async fn create_employee(
    State(state): State<AppState>,
    Json(input): Json<CreateEmployeeInput>,
) -> AppResult<(StatusCode, Json<Employee>)> {
    let employee = EmployeeService::new(state.db.clone()).create(input).await?;
    Ok((StatusCode::CREATED, Json(employee)))
}

pub async fn get_employee(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<Employee>> {
    let employee = EmployeeService::new(state.db.clone()).get(id).await?;
    Ok(Json(employee))
}

pub async fn update_employee(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(input): Json<UpdateEmployeeInput>,
) -> AppResult<Json<Employee>> {
    let employee = EmployeeService::new(state.db.clone())
        .update(id, input)
        .await?;
    Ok(Json(employee))
}

pub async fn delete_employee(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<StatusCode> {
    EmployeeService::new(state.db.clone()).delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
