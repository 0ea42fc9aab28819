use axum::{extract::State, http::StatusCode, Extension, Json};

use crate::error::{ApiError, ApiResult};
use crate::extract::{Form, Path};
use crate::models::{
    CurrentUser, EditInvestmentForm, Investment, InvestmentForm, InvestmentResponse,
    MessageResponse,
};
use crate::services::investments;
use crate::state::AppState;
use crate::utils::format_currency;

fn not_found() -> ApiError {
    ApiError::NotFound("Investment not found.".to_string())
}

pub async fn add_investment(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Form(form): Form<InvestmentForm>,
) -> ApiResult<(StatusCode, Json<InvestmentResponse>)> {
    let new = form.validate()?;

    // An unverifiable symbol is still recorded; the user only gets a warning.
    let mut warnings = Vec::new();
    if state.market_data.fetch_price(&new.symbol).await.is_err() {
        warnings.push(format!(
            "Warning: Could not verify symbol '{}'. It may be invalid.",
            new.symbol
        ));
    }

    let investment = investments::add_investment(&state.pool, user.id, &new).await?;

    Ok((
        StatusCode::CREATED,
        Json(InvestmentResponse {
            message: format!(
                "Successfully added {} shares of {} at {}!",
                investment.quantity,
                investment.symbol,
                format_currency(investment.buy_price)
            ),
            investment,
            warnings,
        }),
    ))
}

pub async fn get_investment(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<i64>,
) -> ApiResult<Json<Investment>> {
    let investment = investments::find_for_user(&state.pool, user.id, id)
        .await?
        .ok_or_else(not_found)?;
    Ok(Json(investment))
}

pub async fn edit_investment(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<i64>,
    Form(form): Form<EditInvestmentForm>,
) -> ApiResult<Json<InvestmentResponse>> {
    investments::find_for_user(&state.pool, user.id, id)
        .await?
        .ok_or_else(not_found)?;

    let (quantity, buy_price) = form.validate()?;

    let investment = investments::update_investment(&state.pool, user.id, id, quantity, buy_price)
        .await?
        .ok_or_else(not_found)?;

    Ok(Json(InvestmentResponse {
        message: "Investment updated successfully!".to_string(),
        investment,
        warnings: Vec::new(),
    }))
}

pub async fn delete_investment(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<i64>,
) -> ApiResult<Json<MessageResponse>> {
    let investment = investments::delete_investment(&state.pool, user.id, id)
        .await?
        .ok_or_else(not_found)?;

    Ok(Json(MessageResponse {
        message: format!("Deleted {} from portfolio.", investment.symbol),
    }))
}
