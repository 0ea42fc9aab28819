use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::ApiError;

// ── Persisted records ───────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct User {
    pub id: i64,
    pub username: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Investment {
    pub id: i64,
    pub user_id: i64,
    pub symbol: String,
    pub category: String,
    pub quantity: f64,
    pub buy_price: f64,
    pub purchase_date: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(rename_all = "UPPERCASE")]
#[serde(rename_all = "UPPERCASE")]
pub enum TransactionType {
    Buy,
    Sell,
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Transaction {
    pub id: i64,
    pub user_id: i64,
    pub symbol: String,
    pub transaction_type: TransactionType,
    pub quantity: f64,
    pub price: f64,
    pub transaction_date: DateTime<Utc>,
}

/// A validated holding ready to be inserted.
#[derive(Debug, Clone, PartialEq)]
pub struct NewInvestment {
    pub symbol: String,
    pub category: String,
    pub quantity: f64,
    pub buy_price: f64,
}

// ── Request-scoped identity ─────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CurrentUser {
    pub id: i64,
    pub username: String,
}

// ── Forms ───────────────────────────────────────────────────────────

#[derive(Debug, Default, Deserialize)]
pub struct CredentialsForm {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

impl CredentialsForm {
    /// Registration rules: trimmed username of at least 3 characters and a
    /// password of at least 6.
    pub fn validate_registration(&self) -> Result<(String, &str), ApiError> {
        let username = self.username.trim();
        if username.chars().count() < 3 {
            return Err(ApiError::Validation(
                "Username must be at least 3 characters.".to_string(),
            ));
        }
        if self.password.chars().count() < 6 {
            return Err(ApiError::Validation(
                "Password must be at least 6 characters.".to_string(),
            ));
        }
        Ok((username.to_string(), self.password.as_str()))
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct InvestmentForm {
    #[serde(default)]
    pub symbol: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub quantity: String,
    #[serde(default)]
    pub buy_price: String,
}

impl InvestmentForm {
    pub fn validate(&self) -> Result<NewInvestment, ApiError> {
        let symbol = self.symbol.trim().to_uppercase();
        let category = self.category.trim().to_string();
        if symbol.is_empty() || category.is_empty() {
            return Err(ApiError::Validation(
                "Symbol and category are required.".to_string(),
            ));
        }
        let (quantity, buy_price) = parse_position(&self.quantity, &self.buy_price)?;
        Ok(NewInvestment {
            symbol,
            category,
            quantity,
            buy_price,
        })
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct EditInvestmentForm {
    #[serde(default)]
    pub quantity: String,
    #[serde(default)]
    pub buy_price: String,
}

impl EditInvestmentForm {
    pub fn validate(&self) -> Result<(f64, f64), ApiError> {
        parse_position(&self.quantity, &self.buy_price)
    }
}

fn parse_position(quantity: &str, buy_price: &str) -> Result<(f64, f64), ApiError> {
    let invalid =
        || ApiError::Validation("Quantity and price must be positive numbers.".to_string());
    let quantity: f64 = quantity.trim().parse().map_err(|_| invalid())?;
    let buy_price: f64 = buy_price.trim().parse().map_err(|_| invalid())?;
    // NaN fails both comparisons, so it is rejected here as well.
    if !(quantity > 0.0 && buy_price > 0.0) || !quantity.is_finite() || !buy_price.is_finite() {
        return Err(invalid());
    }
    Ok((quantity, buy_price))
}

#[derive(Debug, Deserialize)]
pub struct HistoryQuery {
    pub period: Option<String>,
}

// ── Responses ───────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub message: String,
    pub token: String,
    pub user: CurrentUser,
}

#[derive(Debug, Serialize)]
pub struct InvestmentResponse {
    pub message: String,
    pub investment: Investment,
    pub warnings: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct HoldingView {
    pub id: i64,
    pub symbol: String,
    pub category: String,
    pub quantity: f64,
    pub buy_price: f64,
    pub current_price: Decimal,
    pub value: Decimal,
    pub profit_loss: Decimal,
    pub pct_return: Decimal,
    pub purchase_date: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub struct DashboardResponse {
    pub investments: Vec<HoldingView>,
    pub total_value: Decimal,
    pub total_cost: Decimal,
    pub profit_loss: Decimal,
    pub return_pct: Decimal,
    pub category_labels: Vec<String>,
    pub category_values: Vec<Decimal>,
    pub has_investments: bool,
    pub failed_symbols: Vec<String>,
    pub warnings: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct TransactionsResponse {
    pub transactions: Vec<Transaction>,
}

#[derive(Debug, Serialize)]
pub struct ImportResponse {
    pub message: String,
    pub imported: usize,
    pub skipped: usize,
}

#[derive(Debug, Serialize)]
pub struct HistoryResponse {
    pub symbol: String,
    pub stock_name: String,
    pub sector: String,
    pub currency: String,
    pub period: String,
    pub dates: Vec<String>,
    pub prices: Vec<Decimal>,
}
