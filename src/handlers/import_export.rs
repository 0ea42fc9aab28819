use axum::{
    extract::{multipart::MultipartRejection, Multipart, State},
    http::header,
    response::IntoResponse,
    Extension, Json,
};
use chrono::Utc;

use crate::error::{ApiError, ApiResult};
use crate::models::{CurrentUser, ImportResponse};
use crate::services::{investments, portfolio_csv};
use crate::state::AppState;

pub async fn export_csv(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
) -> ApiResult<impl IntoResponse> {
    let holdings = investments::list_for_user(&state.pool, user.id).await?;
    let body = portfolio_csv::export_csv(&holdings)?;

    let disposition = format!(
        "attachment; filename=portfolio_{}.csv",
        Utc::now().format("%Y%m%d")
    );

    Ok((
        [
            (header::CONTENT_TYPE, "text/csv".to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        body,
    ))
}

pub async fn import_csv(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    multipart: Result<Multipart, MultipartRejection>,
) -> ApiResult<Json<ImportResponse>> {
    let mut multipart = multipart?;
    let mut file_content: Option<Vec<u8>> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::Validation(format!("Failed to read multipart field: {e}")))?
    {
        if field.name() == Some("file") {
            let bytes = field
                .bytes()
                .await
                .map_err(|e| ApiError::Validation(format!("Failed to read file content: {e}")))?;
            file_content = Some(bytes.to_vec());
        }
    }

    let content = file_content
        .filter(|c| !c.is_empty())
        .ok_or_else(|| ApiError::Validation("No file selected.".to_string()))?;

    let plan = portfolio_csv::parse_import(&content)?;
    let imported = investments::import_investments(&state.pool, user.id, &plan.rows).await?;

    Ok(Json(ImportResponse {
        message: format!("Successfully imported {imported} investments!"),
        imported,
        skipped: plan.skipped,
    }))
}
