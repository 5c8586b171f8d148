use std::sync::Arc;

use axum::{routing::get, Router};

use crate::stock_service::StockService;

pub mod handlers;

#[derive(Clone)]
pub struct AppState {
    pub stock: Arc<StockService>,
}

/// 組出 `/stocks` 前綴下的唯讀 JSON 路由
pub fn build_router(state: AppState) -> Router {
    let stocks = Router::new()
        .route("/all", get(handlers::all))
        .route("/gear", get(handlers::gear))
        .route("/egg", get(handlers::egg))
        .route("/seeds", get(handlers::seeds));

    Router::new().nest("/stocks", stocks).with_state(state)
}
