// Presentation helpers for money values

use rust_decimal::Decimal;

/// Round a float to 2 decimal places for display. Non-finite or
/// out-of-range values render as zero.
pub fn round_money(value: f64) -> Decimal {
    round_to(value, 2)
}

/// Round a float to a specific number of decimal places (half to even)
pub fn round_to(value: f64, decimals: u32) -> Decimal {
    Decimal::from_f64_retain(value)
        .map(|d| d.round_dp(decimals))
        .unwrap_or(Decimal::ZERO)
}

/// Format a float as a currency string
pub fn format_currency(value: f64) -> String {
    format!("${:.2}", round_money(value))
}
