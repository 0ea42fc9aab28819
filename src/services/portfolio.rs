use crate::models::Investment;
use crate::services::market_data::MarketData;
use chrono::{DateTime, Utc};
use std::collections::HashMap;

#[derive(Debug, Clone, PartialEq)]
pub struct ValuationRow {
    pub investment_id: i64,
    pub symbol: String,
    pub category: String,
    pub quantity: f64,
    pub buy_price: f64,
    pub current_price: f64,
    pub value: f64,
    pub cost: f64,
    pub profit_loss: f64,
    pub pct_return: f64,
    pub purchase_date: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CategoryTotal {
    pub category: String,
    pub value: f64,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct PortfolioSummary {
    pub total_value: f64,
    pub total_cost: f64,
    pub total_profit_loss: f64,
    pub total_return_pct: f64,
    /// Category buckets in first-seen order.
    pub categories: Vec<CategoryTotal>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Valuation {
    pub rows: Vec<ValuationRow>,
    pub summary: PortfolioSummary,
    /// Symbols whose live price could not be resolved, first-seen order.
    pub failed_symbols: Vec<String>,
}

/// Values every holding against live prices, in input order.
///
/// `price_lookup` returns `None` when a symbol could not be priced. Such a
/// holding is still counted, at a price of zero, and its symbol is reported
/// in `failed_symbols`. Nothing here is rounded.
pub fn valuate<F>(holdings: &[Investment], mut price_lookup: F) -> Valuation
where
    F: FnMut(&str) -> Option<f64>,
{
    let mut total_value = 0.0;
    let mut total_cost = 0.0;
    let mut rows = Vec::with_capacity(holdings.len());
    let mut failed_symbols: Vec<String> = Vec::new();

    for holding in holdings {
        let current_price = match price_lookup(&holding.symbol) {
            Some(price) => price,
            None => {
                if !failed_symbols.contains(&holding.symbol) {
                    failed_symbols.push(holding.symbol.clone());
                }
                0.0
            }
        };

        let value = holding.quantity * current_price;
        let cost = holding.quantity * holding.buy_price;
        let profit_loss = value - cost;

        let pct_return = if holding.buy_price > 0.0 {
            (current_price - holding.buy_price) / holding.buy_price * 100.0
        } else {
            0.0
        };

        total_value += value;
        total_cost += cost;

        rows.push(ValuationRow {
            investment_id: holding.id,
            symbol: holding.symbol.clone(),
            category: holding.category.clone(),
            quantity: holding.quantity,
            buy_price: holding.buy_price,
            current_price,
            value,
            cost,
            profit_loss,
            pct_return,
            purchase_date: holding.purchase_date,
        });
    }

    let total_profit_loss = total_value - total_cost;
    let total_return_pct = if total_cost > 0.0 {
        total_profit_loss / total_cost * 100.0
    } else {
        0.0
    };

    let categories = category_totals(&rows);

    Valuation {
        rows,
        summary: PortfolioSummary {
            total_value,
            total_cost,
            total_profit_loss,
            total_return_pct,
            categories,
        },
        failed_symbols,
    }
}

/// Sums row values per category, keeping the order categories first appear.
pub fn category_totals(rows: &[ValuationRow]) -> Vec<CategoryTotal> {
    let mut totals: Vec<CategoryTotal> = Vec::new();
    let mut index: HashMap<&str, usize> = HashMap::new();

    for row in rows {
        match index.get(row.category.as_str()) {
            Some(&i) => totals[i].value += row.value,
            None => {
                index.insert(row.category.as_str(), totals.len());
                totals.push(CategoryTotal {
                    category: row.category.clone(),
                    value: row.value,
                });
            }
        }
    }
    totals
}

/// Resolves each distinct symbol once, one request after another.
pub async fn fetch_live_prices(
    market: &dyn MarketData,
    holdings: &[Investment],
) -> HashMap<String, Option<f64>> {
    let mut prices: HashMap<String, Option<f64>> = HashMap::new();
    for holding in holdings {
        if prices.contains_key(&holding.symbol) {
            continue;
        }
        let price = market.fetch_price(&holding.symbol).await.ok();
        prices.insert(holding.symbol.clone(), price);
    }
    prices
}
