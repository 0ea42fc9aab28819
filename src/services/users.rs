use chrono::Utc;
use sqlx::SqlitePool;

use crate::error::{conflict_on_unique, ApiResult};
use crate::models::User;

pub async fn create_user(pool: &SqlitePool, username: &str, password_hash: &str) -> ApiResult<User> {
    sqlx::query_as::<_, User>(
        "INSERT INTO users (username, password_hash, created_at) VALUES (?, ?, ?) \
         RETURNING id, username, password_hash, created_at",
    )
    .bind(username)
    .bind(password_hash)
    .bind(Utc::now())
    .fetch_one(pool)
    .await
    .map_err(|e| conflict_on_unique(e, "Username already exists. Please choose another."))
}

pub async fn find_by_username(pool: &SqlitePool, username: &str) -> ApiResult<Option<User>> {
    let user = sqlx::query_as::<_, User>(
        "SELECT id, username, password_hash, created_at FROM users WHERE username = ?",
    )
    .bind(username)
    .fetch_optional(pool)
    .await?;
    Ok(user)
}
