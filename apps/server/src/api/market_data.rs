use std::sync::Arc;

use axum::{
    extract::{Query, State},
    routing::get,
    Json, Router,
};
use folio_market_data::{EarningsRecord, Quote};
use serde::Deserialize;

use crate::{
    error::{ApiError, ApiResult},
    main_lib::AppState,
};

#[derive(Deserialize)]
struct SymbolQuery {
    symbol: Option<String>,
}

impl SymbolQuery {
    /// Raw symbol text; validation happens in the services.
    fn required(self) -> ApiResult<String> {
        self.symbol
            .filter(|s| !s.trim().is_empty())
            .ok_or_else(|| ApiError::BadRequest("Symbol parameter is required".to_string()))
    }
}

async fn get_quote(
    State(state): State<Arc<AppState>>,
    Query(query): Query<SymbolQuery>,
) -> ApiResult<Json<Quote>> {
    let symbol = query.required()?;
    let quote = state
        .quote_service
        .get_quote(&symbol)
        .await
        .map_err(ApiError::quote)?;
    Ok(Json(quote))
}

async fn get_earnings_date(
    State(state): State<Arc<AppState>>,
    Query(query): Query<SymbolQuery>,
) -> ApiResult<Json<EarningsRecord>> {
    let symbol = query.required()?;
    let record = state
        .earnings_service
        .get_earnings_date(&symbol)
        .await
        .map_err(ApiError::earnings)?;
    Ok(Json(record))
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/quote", get(get_quote))
        .route("/api/earnings-date", get(get_earnings_date))
}
