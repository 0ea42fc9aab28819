use std::time::{Duration, SystemTime, UNIX_EPOCH};

use argon2::{
    password_hash::{rand_core::OsRng, Error as PasswordHashError, PasswordHash, SaltString},
    Argon2, PasswordHasher, PasswordVerifier,
};
use axum::{
    extract::{Request, State},
    http::{
        header::{AUTHORIZATION, COOKIE},
        HeaderMap, HeaderValue,
    },
    middleware::Next,
    response::Response,
};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::error::ApiError;
use crate::models::CurrentUser;
use crate::state::AppState;

pub const SESSION_COOKIE: &str = "session";
pub const LOGIN_REQUIRED: &str = "Please log in to access this page.";

#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    sub: String,
    username: String,
    exp: usize,
    iat: usize,
}

/// Hashes passwords and signs the session tokens that identify a user.
pub struct SessionManager {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    ttl: Duration,
    // Verified against when a username is unknown, so a miss costs the same
    // as a wrong password.
    dummy_hash: String,
}

impl SessionManager {
    pub fn new(secret: &str, ttl: Duration) -> Result<Self, ApiError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = true;
        Ok(Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            validation,
            ttl,
            dummy_hash: hash_password("not-a-real-password")?,
        })
    }

    /// Checks a candidate password against a stored hash, or against the
    /// dummy hash when there is no user.
    pub fn verify_password(&self, stored_hash: Option<&str>, candidate: &str) -> Result<bool, ApiError> {
        let matched = verify_password(stored_hash.unwrap_or(&self.dummy_hash), candidate)?;
        Ok(matched && stored_hash.is_some())
    }

    pub fn issue_token(&self, user: &CurrentUser) -> Result<String, ApiError> {
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map_err(|_| ApiError::Internal("System clock is before UNIX_EPOCH".into()))?;
        let expires = now
            .checked_add(self.ttl)
            .ok_or_else(|| ApiError::Internal("Session lifetime overflows the clock".into()))?;
        let claims = Claims {
            sub: user.id.to_string(),
            username: user.username.clone(),
            iat: now.as_secs() as usize,
            exp: expires.as_secs() as usize,
        };
        encode(&Header::default(), &claims, &self.encoding_key)
            .map_err(|e| ApiError::Internal(format!("Failed to sign session token: {e}")))
    }

    /// Resolves a token to the user it was issued for; `None` when the token
    /// is expired, tampered with or malformed.
    pub fn validate_token(&self, token: &str) -> Option<CurrentUser> {
        let data = decode::<Claims>(token, &self.decoding_key, &self.validation).ok()?;
        let id = data.claims.sub.parse::<i64>().ok()?;
        Some(CurrentUser {
            id,
            username: data.claims.username,
        })
    }

    pub fn session_cookie(&self, token: &str) -> String {
        format!(
            "{SESSION_COOKIE}={token}; Path=/; HttpOnly; SameSite=Lax; Max-Age={}",
            self.ttl.as_secs()
        )
    }

    pub fn clear_cookie() -> HeaderValue {
        HeaderValue::from_static("session=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0")
    }

    /// The session carried by a request, from the session cookie or a bearer
    /// token.
    pub fn current_user(&self, headers: &HeaderMap) -> Option<CurrentUser> {
        session_token(headers).and_then(|token| self.validate_token(&token))
    }
}

pub fn hash_password(password: &str) -> Result<String, ApiError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| ApiError::Internal(format!("Failed to hash password: {e}")))
}

pub fn verify_password(stored_hash: &str, candidate: &str) -> Result<bool, ApiError> {
    let parsed = PasswordHash::new(stored_hash)
        .map_err(|e| ApiError::Internal(format!("Invalid stored password hash: {e}")))?;
    match Argon2::default().verify_password(candidate.as_bytes(), &parsed) {
        Ok(()) => Ok(true),
        Err(PasswordHashError::Password) => Ok(false),
        Err(other) => Err(ApiError::Internal(format!(
            "Password verification failed: {other}"
        ))),
    }
}

fn session_token(headers: &HeaderMap) -> Option<String> {
    let from_cookie = headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|raw| raw.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == SESSION_COOKIE)
        .map(|(_, value)| value.trim().to_string())
        .filter(|value| !value.is_empty());

    from_cookie.or_else(|| {
        let header = headers.get(AUTHORIZATION)?.to_str().ok()?;
        let (scheme, token) = header.split_once(' ')?;
        let token = token.trim();
        (scheme.eq_ignore_ascii_case("Bearer") && !token.is_empty()).then(|| token.to_string())
    })
}

/// Gate for portfolio routes: resolves the session and hands the handler a
/// `CurrentUser` extension.
pub async fn require_session(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let user = state
        .sessions
        .current_user(request.headers())
        .ok_or_else(|| ApiError::Unauthorized(LOGIN_REQUIRED.to_string()))?;

    request.extensions_mut().insert(user);
    Ok(next.run(request).await)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn manager() -> SessionManager {
        SessionManager::new("test-secret", Duration::from_secs(3600)).unwrap()
    }

    fn alice() -> CurrentUser {
        CurrentUser {
            id: 7,
            username: "alice".into(),
        }
    }

    #[test]
    fn password_hash_round_trip() {
        let hash = hash_password("hunter22").unwrap();
        assert_ne!(hash, "hunter22");
        assert!(verify_password(&hash, "hunter22").unwrap());
        assert!(!verify_password(&hash, "hunter23").unwrap());
    }

    #[test]
    fn same_password_gets_different_salts() {
        assert_ne!(hash_password("hunter22").unwrap(), hash_password("hunter22").unwrap());
    }

    #[test]
    fn unknown_user_never_verifies() {
        let sessions = manager();
        assert!(!sessions.verify_password(None, "not-a-real-password").unwrap());
    }

    #[test]
    fn token_identifies_user() {
        let sessions = manager();
        let token = sessions.issue_token(&alice()).unwrap();
        assert_eq!(sessions.validate_token(&token), Some(alice()));
    }

    #[test]
    fn token_from_other_secret_is_rejected() {
        let token = manager().issue_token(&alice()).unwrap();
        let other = SessionManager::new("other-secret", Duration::from_secs(3600)).unwrap();
        assert_eq!(other.validate_token(&token), None);
        assert_eq!(other.validate_token("garbage"), None);
    }

    #[test]
    fn token_is_read_from_cookie_or_bearer_header() {
        let sessions = manager();
        let token = sessions.issue_token(&alice()).unwrap();

        let mut headers = HeaderMap::new();
        headers.insert(
            COOKIE,
            HeaderValue::from_str(&format!("theme=dark; session={token}")).unwrap(),
        );
        assert_eq!(sessions.current_user(&headers), Some(alice()));

        let mut headers = HeaderMap::new();
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {token}")).unwrap(),
        );
        assert_eq!(sessions.current_user(&headers), Some(alice()));

        assert_eq!(sessions.current_user(&HeaderMap::new()), None);
    }

    #[test]
    fn overflowing_lifetime_fails_to_issue() {
        let sessions = SessionManager::new("test-secret", Duration::MAX).unwrap();
        assert!(matches!(
            sessions.issue_token(&alice()),
            Err(ApiError::Internal(_))
        ));
    }

    #[test]
    fn session_cookie_is_http_only() {
        let cookie = manager().session_cookie("abc");
        assert!(cookie.starts_with("session=abc;"));
        assert!(cookie.contains("HttpOnly"));
        assert!(cookie.contains("Max-Age=3600"));
    }
}
