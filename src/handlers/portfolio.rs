use axum::{extract::State, Extension, Json};

use crate::error::ApiResult;
use crate::models::{CurrentUser, DashboardResponse, HoldingView};
use crate::services::portfolio::{self, Valuation};
use crate::services::investments;
use crate::state::AppState;
use crate::utils::round_money;

pub async fn dashboard(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
) -> ApiResult<Json<DashboardResponse>> {
    let holdings = investments::list_for_user(&state.pool, user.id).await?;
    let prices = portfolio::fetch_live_prices(state.market_data.as_ref(), &holdings).await;

    let valuation = portfolio::valuate(&holdings, |symbol| prices.get(symbol).copied().flatten());
    Ok(Json(present(valuation)))
}

/// Rounds the valuation for display. Totals were accumulated unrounded.
fn present(valuation: Valuation) -> DashboardResponse {
    let summary = valuation.summary;

    let warnings = if valuation.failed_symbols.is_empty() {
        Vec::new()
    } else {
        vec![format!(
            "Warning: Could not fetch prices for: {}",
            valuation.failed_symbols.join(", ")
        )]
    };

    let investments: Vec<HoldingView> = valuation
        .rows
        .into_iter()
        .map(|row| HoldingView {
            id: row.investment_id,
            symbol: row.symbol,
            category: row.category,
            quantity: row.quantity,
            buy_price: row.buy_price,
            current_price: round_money(row.current_price),
            value: round_money(row.value),
            profit_loss: round_money(row.profit_loss),
            pct_return: round_money(row.pct_return),
            purchase_date: row.purchase_date,
        })
        .collect();

    let (category_labels, category_values) = summary
        .categories
        .into_iter()
        .map(|c| (c.category, round_money(c.value)))
        .unzip();

    DashboardResponse {
        has_investments: !investments.is_empty(),
        investments,
        total_value: round_money(summary.total_value),
        total_cost: round_money(summary.total_cost),
        profit_loss: round_money(summary.total_profit_loss),
        return_pct: round_money(summary.total_return_pct),
        category_labels,
        category_values,
        failed_symbols: valuation.failed_symbols,
        warnings,
    }
}
