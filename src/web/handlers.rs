use axum::{extract::State, Json};

use crate::{
    declare::{StockCategory, StockSection, StockSnapshot},
    error::FetchError,
    web::AppState,
};

/// GET /stocks/all
pub async fn all(State(state): State<AppState>) -> Result<Json<StockSnapshot>, FetchError> {
    Ok(Json(state.stock.get_current_stock().await?))
}

/// GET /stocks/gear
pub async fn gear(State(state): State<AppState>) -> Result<Json<StockSection>, FetchError> {
    Ok(Json(state.stock.section(StockCategory::Gear).await?))
}

/// GET /stocks/egg
pub async fn egg(State(state): State<AppState>) -> Result<Json<StockSection>, FetchError> {
    Ok(Json(state.stock.section(StockCategory::Egg).await?))
}

/// GET /stocks/seeds
pub async fn seeds(State(state): State<AppState>) -> Result<Json<StockSection>, FetchError> {
    Ok(Json(state.stock.section(StockCategory::Seeds).await?))
}
