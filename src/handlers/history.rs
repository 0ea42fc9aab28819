use axum::{extract::State, Json};

use crate::error::{ApiError, ApiResult};
use crate::extract::{Path, Query};
use crate::models::{HistoryQuery, HistoryResponse};
use crate::services::market_data::{DEFAULT_HISTORY_PERIOD, HISTORY_PERIODS};
use crate::state::AppState;
use crate::utils::round_money;

pub async fn symbol_history(
    State(state): State<AppState>,
    Path(symbol): Path<String>,
    Query(query): Query<HistoryQuery>,
) -> ApiResult<Json<HistoryResponse>> {
    let symbol = symbol.trim().to_uppercase();
    let period = query
        .period
        .unwrap_or_else(|| DEFAULT_HISTORY_PERIOD.to_string());
    if !HISTORY_PERIODS.contains(&period.as_str()) {
        return Err(ApiError::Validation(format!(
            "Unsupported period '{period}'. Use one of: {}",
            HISTORY_PERIODS.join(", ")
        )));
    }

    let history = state.market_data.fetch_history(&symbol, &period).await;
    if history.is_empty() {
        return Err(ApiError::NotFound(format!(
            "No historical data found for {symbol}."
        )));
    }

    let info = state.market_data.fetch_metadata(&symbol).await;

    let (dates, prices) = history
        .iter()
        .map(|p| (p.date.format("%Y-%m-%d").to_string(), round_money(p.close)))
        .unzip();

    Ok(Json(HistoryResponse {
        symbol,
        stock_name: info.name,
        sector: info.sector,
        currency: info.currency,
        period,
        dates,
        prices,
    }))
}
