use axum::{
    extract::State,
    http::{header::SET_COOKIE, HeaderMap, HeaderValue, StatusCode},
    response::IntoResponse,
    Json,
};

use crate::auth::{hash_password, SessionManager};
use crate::error::{ApiError, ApiResult};
use crate::extract::Form;
use crate::models::{CredentialsForm, CurrentUser, LoginResponse, MessageResponse};
use crate::services::users;
use crate::state::AppState;

pub async fn register(
    State(state): State<AppState>,
    Form(form): Form<CredentialsForm>,
) -> ApiResult<impl IntoResponse> {
    let (username, password) = form.validate_registration()?;
    let password_hash = hash_password(password)?;

    let user = users::create_user(&state.pool, &username, &password_hash).await?;
    tracing::info!("Registered user {} ({})", user.username, user.id);

    Ok((
        StatusCode::CREATED,
        Json(MessageResponse {
            message: "Account created successfully! Please log in.".to_string(),
        }),
    ))
}

pub async fn login(
    State(state): State<AppState>,
    Form(form): Form<CredentialsForm>,
) -> ApiResult<impl IntoResponse> {
    let username = form.username.trim();
    let user = users::find_by_username(&state.pool, username).await?;

    let verified = state
        .sessions
        .verify_password(user.as_ref().map(|u| u.password_hash.as_str()), &form.password)?;

    let user = match user {
        Some(user) if verified => user,
        _ => {
            return Err(ApiError::Unauthorized(
                "Invalid username or password.".to_string(),
            ))
        }
    };

    let current = CurrentUser {
        id: user.id,
        username: user.username,
    };
    let token = state.sessions.issue_token(&current)?;
    let cookie = HeaderValue::from_str(&state.sessions.session_cookie(&token))
        .map_err(|e| ApiError::Internal(format!("Invalid session cookie: {e}")))?;

    Ok((
        [(SET_COOKIE, cookie)],
        Json(LoginResponse {
            message: format!("Welcome back, {}!", current.username),
            token,
            user: current,
        }),
    ))
}

pub async fn logout(State(state): State<AppState>, headers: HeaderMap) -> impl IntoResponse {
    let username = state
        .sessions
        .current_user(&headers)
        .map(|u| u.username)
        .unwrap_or_else(|| "User".to_string());

    (
        [(SET_COOKIE, SessionManager::clear_cookie())],
        Json(MessageResponse {
            message: format!("Goodbye, {username}! You've been logged out."),
        }),
    )
}
