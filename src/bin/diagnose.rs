use portfolio_backend::config::Config;
use portfolio_backend::database::Database;

#[derive(Debug, sqlx::FromRow)]
struct UserSummary {
    id: i64,
    username: String,
    holdings: i64,
    buys: i64,
    sells: i64,
}

#[derive(Debug, sqlx::FromRow)]
struct InvalidHolding {
    id: i64,
    user_id: i64,
    symbol: String,
    quantity: f64,
    buy_price: f64,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = Config::from_env()?;
    let db = Database::new(&config.database_url).await?;
    let pool = db.pool();

    println!("--- PORTFOLIO STORE REPORT ---");

    let users = sqlx::query_as::<_, UserSummary>(
        "SELECT u.id, u.username, \
            (SELECT COUNT(*) FROM investments i WHERE i.user_id = u.id) AS holdings, \
            (SELECT COUNT(*) FROM transactions t WHERE t.user_id = u.id AND t.transaction_type = 'BUY') AS buys, \
            (SELECT COUNT(*) FROM transactions t WHERE t.user_id = u.id AND t.transaction_type = 'SELL') AS sells \
         FROM users u ORDER BY u.id",
    )
    .fetch_all(pool)
    .await?;

    println!("Users: {}", users.len());
    for u in &users {
        println!(
            "  [{}] {:<20} holdings={:<4} buys={:<4} sells={}",
            u.id, u.username, u.holdings, u.buys, u.sells
        );
    }

    // Positivity is only enforced by form validation, so check the rows too.
    let invalid = sqlx::query_as::<_, InvalidHolding>(
        "SELECT id, user_id, symbol, quantity, buy_price FROM investments \
         WHERE quantity <= 0 OR buy_price <= 0 ORDER BY id",
    )
    .fetch_all(pool)
    .await?;

    if invalid.is_empty() {
        println!("\nAll holdings have positive quantity and buy price.");
    } else {
        println!("\nHoldings violating the positivity invariant: {}", invalid.len());
        for h in invalid {
            println!(
                "  -> investment {} (user {}): {} qty={} buy_price={}",
                h.id, h.user_id, h.symbol, h.quantity, h.buy_price
            );
        }
    }

    println!("\n--- END REPORT ---");
    Ok(())
}
