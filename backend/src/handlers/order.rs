//! Customer and sales order handlers

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;

use crate::error::AppResult;
use crate::services::order::{
    CreateCustomerInput, CreateOrderInput, Customer, Order, OrderListQuery, OrderPage,
    OrderService, UpdateOrderInput,
};
use crate::AppState;

pub async fn list_customers(State(state): State<AppState>) -> AppResult<Json<Vec<Customer>>> {
    let customers = OrderService::new(state.db.clone()).list_customers().await?;
    Ok(Json(customers))
}

pub async fn create_customer(
    State(state): State<AppState>,
    Json(input): Json<CreateCustomerInput>,
) -> AppResult<(StatusCode, Json<Customer>)> {
    let customer = OrderService::new(state.db.clone())
        .create_customer(input)
        .await?;
    Ok((StatusCode::CREATED, Json(customer)))
}

pub async fn get_customer(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<Customer>> {
    let customer = OrderService::new(state.db.clone()).get_customer(id).await?;
    Ok(Json(customer))
}

pub async fn delete_customer(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<StatusCode> {
    OrderService::new(state.db.clone()).delete_customer(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn list_orders(
    State(state): State<AppState>,
    Query(query): Query<OrderListQuery>,
) -> AppResult<Json<OrderPage>> {
    let page = OrderService::new(state.db.clone()).list_orders(&query).await?;
    Ok(Json(page))
}

pub async fn create_order(
    State(state): State<AppState>,
    Json(input): Json<CreateOrderInput>,
) -> AppResult<(StatusCode, Json<Order>)> {
    let order = OrderService::new(state.db.clone()).create_order(input).await?;
    Ok((StatusCode::CREATED, Json(order)))
}

pub async fn get_order(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<Order>> {
    let order = OrderService::new(state.db.clone()).get_order(id).await?;
    Ok(Json(order))
}

pub async fn update_order(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(input): Json<UpdateOrderInput>,
) -> AppResult<Json<Order>> {
    let order = OrderService::new(state.db.clone())
        .update_order(id, input)
        .await?;
    Ok(Json(order))
}

pub async fn delete_order(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<StatusCode> {
    OrderService::new(state.db.clone()).delete_order(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
