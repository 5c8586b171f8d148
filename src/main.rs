pub mod cache;
pub mod config;
pub mod crawler;
pub mod declare;
pub mod error;
pub mod logging;
pub mod stock_service;
pub mod util;
pub mod web;

use std::{env, net::SocketAddr, sync::Arc};

use crate::{stock_service::StockService, web::AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();

    let state = AppState {
        stock: Arc::new(StockService::new()),
    };
    let app = web::build_router(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config::SETTINGS.system.http_port));
    let msg = format!(
        "GardenStockCrawler 已啟動 {} OS/Arch: {}/{}",
        addr,
        env::consts::OS,
        env::consts::ARCH
    );
    logging::info_file_async(msg.clone());
    logging::info_console(msg);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
