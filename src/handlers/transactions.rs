use axum::{extract::State, Extension, Json};

use crate::error::ApiResult;
use crate::models::{CurrentUser, TransactionsResponse};
use crate::services::transactions::{self, HISTORY_LIMIT};
use crate::state::AppState;

pub async fn list_transactions(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
) -> ApiResult<Json<TransactionsResponse>> {
    let transactions = transactions::list_recent(&state.pool, user.id, HISTORY_LIMIT).await?;
    Ok(Json(TransactionsResponse { transactions }))
}
