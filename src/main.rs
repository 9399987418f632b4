// src/main.rs

use axum::{
    Router,
    routing::{get, patch, post},
};
use tokio::net::TcpListener;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

mod common;
mod config;
mod db;
mod docs;
mod handlers;
mod models;
mod services;

use crate::config::AppState;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt().with_target(false).compact().init();

    // If configuration or the database connection fails, the application
    // should not start.
    let app_state = AppState::new()
        .await
        .expect("failed to initialise application state");

    sqlx::migrate!()
        .run(&app_state.db_pool)
        .await
        .expect("failed to run database migrations");

    tracing::info!("database migrations applied");

    let stock_routes = Router::new()
        .route("/supply", post(handlers::stock::submit_supply))
        .route("/closing", post(handlers::stock::submit_closing));

    let ledger_routes = Router::new()
        .route("/deposits", post(handlers::ledger::post_deposit))
        .route(
            "/deposits/{id}/status",
            patch(handlers::ledger::set_deposit_status),
        )
        .route("/expenses", post(handlers::ledger::post_expense));

    let payment_routes =
        Router::new().route("/callback", post(handlers::ledger::payment_callback));

    let period_routes = Router::new()
        .route("/rotate", post(handlers::periods::rotate_period))
        .route("/lock", post(handlers::periods::lock_period))
        .route("/state", get(handlers::periods::get_period_state));

    let report_routes = Router::new()
        .route("/header", get(handlers::reports::get_header_totals))
        .route("/commissions", get(handlers::reports::get_commissions));

    let admin_routes = Router::new()
        .route("/outlets", post(handlers::admin::create_outlet))
        .route("/items", post(handlers::admin::create_item))
        .route("/supervisors", post(handlers::admin::create_supervisor));

    let app = Router::new()
        .merge(SwaggerUi::new("/docs").url("/api-docs/openapi.json", docs::ApiDoc::openapi()))
        .route("/api/health", get(|| async { "OK" }))
        .nest("/api/stock", stock_routes)
        .nest("/api/ledger", ledger_routes)
        .nest("/api/payments", payment_routes)
        .nest("/api/periods", period_routes)
        .nest("/api/reports", report_routes)
        .nest("/api/admin", admin_routes)
        .with_state(app_state);

    let addr = "0.0.0.0:3000";
    let listener = TcpListener::bind(addr)
        .await
        .expect("failed to bind TCP listener");
    tracing::info!("listening on {}", listener.local_addr().unwrap());
    axum::serve(listener, app).await.expect("server error");
}
