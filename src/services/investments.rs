use chrono::Utc;
use sqlx::{Sqlite, SqlitePool};
use tracing::info;

use crate::error::ApiResult;
use crate::models::{Investment, NewInvestment, TransactionType};

const INVESTMENT_COLUMNS: &str =
    "id, user_id, symbol, category, quantity, buy_price, purchase_date";

/// Holdings ordered by symbol, the order the dashboard presents them in.
pub async fn list_for_user(pool: &SqlitePool, user_id: i64) -> ApiResult<Vec<Investment>> {
    let rows = sqlx::query_as::<_, Investment>(&format!(
        "SELECT {INVESTMENT_COLUMNS} FROM investments WHERE user_id = ? ORDER BY symbol, id"
    ))
    .bind(user_id)
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

pub async fn find_for_user(
    pool: &SqlitePool,
    user_id: i64,
    id: i64,
) -> ApiResult<Option<Investment>> {
    let row = sqlx::query_as::<_, Investment>(&format!(
        "SELECT {INVESTMENT_COLUMNS} FROM investments WHERE id = ? AND user_id = ?"
    ))
    .bind(id)
    .bind(user_id)
    .fetch_optional(pool)
    .await?;
    Ok(row)
}

async fn insert_investment<'c, E>(
    executor: E,
    user_id: i64,
    new: &NewInvestment,
) -> Result<Investment, sqlx::Error>
where
    E: sqlx::Executor<'c, Database = Sqlite>,
{
    sqlx::query_as::<_, Investment>(&format!(
        "INSERT INTO investments (user_id, symbol, category, quantity, buy_price, purchase_date) \
         VALUES (?, ?, ?, ?, ?, ?) RETURNING {INVESTMENT_COLUMNS}"
    ))
    .bind(user_id)
    .bind(&new.symbol)
    .bind(&new.category)
    .bind(new.quantity)
    .bind(new.buy_price)
    .bind(Utc::now())
    .fetch_one(executor)
    .await
}

async fn log_transaction<'c, E>(
    executor: E,
    user_id: i64,
    symbol: &str,
    kind: TransactionType,
    quantity: f64,
    price: f64,
) -> Result<(), sqlx::Error>
where
    E: sqlx::Executor<'c, Database = Sqlite>,
{
    sqlx::query(
        "INSERT INTO transactions (user_id, symbol, transaction_type, quantity, price, transaction_date) \
         VALUES (?, ?, ?, ?, ?, ?)",
    )
    .bind(user_id)
    .bind(symbol)
    .bind(kind)
    .bind(quantity)
    .bind(price)
    .bind(Utc::now())
    .execute(executor)
    .await?;
    Ok(())
}

/// Records a new holding together with its BUY entry, atomically.
pub async fn add_investment(
    pool: &SqlitePool,
    user_id: i64,
    new: &NewInvestment,
) -> ApiResult<Investment> {
    let mut tx = pool.begin().await?;

    let investment = insert_investment(&mut *tx, user_id, new).await?;
    log_transaction(
        &mut *tx,
        user_id,
        &investment.symbol,
        TransactionType::Buy,
        investment.quantity,
        investment.buy_price,
    )
    .await?;

    tx.commit().await?;

    info!(
        "BUY recorded: user {} added {} x {} @ {}",
        user_id, investment.quantity, investment.symbol, investment.buy_price
    );
    Ok(investment)
}

/// Corrects quantity and cost basis in place. Edits are not trades, so no
/// transaction is logged.
pub async fn update_investment(
    pool: &SqlitePool,
    user_id: i64,
    id: i64,
    quantity: f64,
    buy_price: f64,
) -> ApiResult<Option<Investment>> {
    let row = sqlx::query_as::<_, Investment>(&format!(
        "UPDATE investments SET quantity = ?, buy_price = ? \
         WHERE id = ? AND user_id = ? RETURNING {INVESTMENT_COLUMNS}"
    ))
    .bind(quantity)
    .bind(buy_price)
    .bind(id)
    .bind(user_id)
    .fetch_optional(pool)
    .await?;
    Ok(row)
}

/// Appends a SELL entry for the holding and removes it, atomically.
/// Returns `None` when the user owns no such holding.
pub async fn delete_investment(
    pool: &SqlitePool,
    user_id: i64,
    id: i64,
) -> ApiResult<Option<Investment>> {
    let mut tx = pool.begin().await?;

    let investment = sqlx::query_as::<_, Investment>(&format!(
        "SELECT {INVESTMENT_COLUMNS} FROM investments WHERE id = ? AND user_id = ?"
    ))
    .bind(id)
    .bind(user_id)
    .fetch_optional(&mut *tx)
    .await?;

    let Some(investment) = investment else {
        return Ok(None);
    };

    log_transaction(
        &mut *tx,
        user_id,
        &investment.symbol,
        TransactionType::Sell,
        investment.quantity,
        investment.buy_price,
    )
    .await?;

    sqlx::query("DELETE FROM investments WHERE id = ? AND user_id = ?")
        .bind(id)
        .bind(user_id)
        .execute(&mut *tx)
        .await?;

    tx.commit().await?;

    info!(
        "SELL recorded: user {} removed {} x {}",
        user_id, investment.quantity, investment.symbol
    );
    Ok(Some(investment))
}

/// Inserts imported holdings in one transaction. Imports neither merge with
/// existing holdings nor log transactions.
pub async fn import_investments(
    pool: &SqlitePool,
    user_id: i64,
    rows: &[NewInvestment],
) -> ApiResult<usize> {
    let mut tx = pool.begin().await?;
    for row in rows {
        insert_investment(&mut *tx, user_id, row).await?;
    }
    tx.commit().await?;

    info!("Imported {} investments for user {}", rows.len(), user_id);
    Ok(rows.len())
}
