use sqlx::SqlitePool;

use crate::error::ApiResult;
use crate::models::Transaction;

pub const HISTORY_LIMIT: i64 = 100;

/// Most recent entries of the user's BUY/SELL log, newest first.
pub async fn list_recent(pool: &SqlitePool, user_id: i64, limit: i64) -> ApiResult<Vec<Transaction>> {
    let rows = sqlx::query_as::<_, Transaction>(
        "SELECT id, user_id, symbol, transaction_type, quantity, price, transaction_date \
         FROM transactions WHERE user_id = ? \
         ORDER BY transaction_date DESC, id DESC LIMIT ?",
    )
    .bind(user_id)
    .bind(limit)
    .fetch_all(pool)
    .await?;
    Ok(rows)
}
