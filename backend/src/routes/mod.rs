//! Route definitions for the Harvest ERP backend

use axum::{
    middleware,
    routing::{delete, get, patch, post, put},
    Router,
};

use crate::{handlers, middleware::auth_middleware, AppState};

/// Create API routes. The state is threaded in so the auth layer can reach
/// the JWT configuration.
pub fn api_routes(state: AppState) -> Router<AppState> {
    Router::new()
        // Health check (public)
        .route("/health", get(handlers::health_check))
        // Auth routes (public)
        .nest("/auth", auth_routes())
        // Protected domain modules
        .nest("/users", user_routes(state.clone()))
        .nest("/suppliers", supplier_routes(state.clone()))
        .nest("/purchase-orders", purchase_order_routes(state.clone()))
        .nest("/inventory", inventory_routes(state.clone()))
        .nest("/warehouse", warehouse_routes(state.clone()))
        .nest("/production", production_routes(state.clone()))
        .nest("/finance", finance_routes(state.clone()))
        .nest("/employees", employee_routes(state.clone()))
        .nest("/customers", customer_routes(state.clone()))
        .nest("/orders", order_routes(state.clone()))
        .nest("/procurement-reports", procurement_report_routes(state.clone()))
        .nest("/reports", report_catalog_routes(state))
}

fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/register", post(handlers::register))
        .route("/login", post(handlers::login))
}

fn user_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::list_users))
        .route("/me", get(handlers::me))
        .route(
            "/:user_id/approval",
            patch(handlers::set_user_approval),
        )
        .route_layer(middleware::from_fn_with_state(state, auth_middleware))
}

fn supplier_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(handlers::list_suppliers).post(handlers::create_supplier),
        )
        .route("/rankings", get(handlers::supplier_rankings))
        .route(
            "/:supplier_id",
            get(handlers::get_supplier)
                .put(handlers::update_supplier)
                .delete(handlers::delete_supplier),
        )
        .route_layer(middleware::from_fn_with_state(state, auth_middleware))
}

fn purchase_order_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(handlers::list_purchase_orders).post(handlers::create_purchase_order),
        )
        .route(
            "/:order_id",
            get(handlers::get_purchase_order)
                .put(handlers::update_purchase_order)
                .delete(handlers::delete_purchase_order),
        )
        .route_layer(middleware::from_fn_with_state(state, auth_middleware))
}

fn inventory_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::list_items).post(handlers::create_item))
        .route(
            "/:item_id",
            get(handlers::get_item)
                .put(handlers::update_item)
                .delete(handlers::delete_item),
        )
        .route("/:item_id/stock", patch(handlers::update_item_stock))
        .route_layer(middleware::from_fn_with_state(state, auth_middleware))
}

fn warehouse_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route(
            "/zones",
            get(handlers::list_zones).post(handlers::create_zone),
        )
        .route(
            "/zones/:zone_id",
            get(handlers::get_zone)
                .put(handlers::update_zone)
                .delete(handlers::delete_zone),
        )
        .route(
            "/stock-movements",
            get(handlers::list_movements).post(handlers::create_movement),
        )
        .route("/low-stock", get(handlers::low_stock))
        .route(
            "/low-stock-alert/:item_id",
            put(handlers::mark_low_stock_alert),
        )
        .route("/analytics", get(handlers::warehouse_analytics))
        .route_layer(middleware::from_fn_with_state(state, auth_middleware))
}

fn production_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(handlers::list_batches).post(handlers::create_batch),
        )
        .route(
            "/:batch_id",
            get(handlers::get_batch)
                .patch(handlers::update_batch)
                .delete(handlers::delete_batch),
        )
        .route("/:batch_id/complete", post(handlers::complete_batch))
        .route_layer(middleware::from_fn_with_state(state, auth_middleware))
}

fn finance_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route(
            "/transactions",
            get(handlers::list_transactions).post(handlers::create_transaction),
        )
        .route(
            "/transactions/:transaction_id",
            delete(handlers::delete_transaction),
        )
        .route("/summary", get(handlers::finance_summary))
        .route("/accounts", get(handlers::list_accounts))
        .route("/budgets", get(handlers::list_budgets))
        .route(
            "/assets-liabilities",
            get(handlers::list_assets_liabilities).post(handlers::create_asset_liability),
        )
        .route(
            "/assets-liabilities/:entry_id",
            delete(handlers::delete_asset_liability),
        )
        .route_layer(middleware::from_fn_with_state(state, auth_middleware))
}

fn employee_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(handlers::list_employees).post(handlers::create_employee),
        )
        .route(
            "/:employee_id",
            get(handlers::get_employee)
                .put(handlers::update_employee)
                .delete(handlers::delete_employee),
        )
        .route_layer(middleware::from_fn_with_state(state, auth_middleware))
}

fn customer_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(handlers::list_customers).post(handlers::create_customer),
        )
        .route(
            "/:customer_id",
            get(handlers::get_customer).delete(handlers::delete_customer),
        )
        .route_layer(middleware::from_fn_with_state(state, auth_middleware))
}

fn order_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::list_orders).post(handlers::create_order))
        .route(
            "/:order_id",
            get(handlers::get_order)
                .put(handlers::update_order)
                .delete(handlers::delete_order),
        )
        .route_layer(middleware::from_fn_with_state(state, auth_middleware))
}

fn procurement_report_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/supplier-ranking", post(handlers::generate_supplier_ranking))
        .route(
            "/spending-analytics",
            post(handlers::generate_spending_analytics),
        )
        .route(
            "/orders-by-supplier",
            post(handlers::generate_orders_by_supplier),
        )
        .route(
            "/procurement-cycle",
            post(handlers::generate_procurement_cycle),
        )
        .route("/", get(handlers::list_reports))
        .route(
            "/:report_id",
            get(handlers::get_report).delete(handlers::delete_report),
        )
        .route_layer(middleware::from_fn_with_state(state, auth_middleware))
}

fn report_catalog_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/dashboard", get(handlers::reports_dashboard))
        .route("/view/:slot_id", get(handlers::view_report))
        .route("/download/:slot_id", get(handlers::download_report))
        .route("/generate/:template", get(handlers::generate_report))
        .route_layer(middleware::from_fn_with_state(state, auth_middleware))
}
