//! Cookie password gate.
//!
//! Deliberately minimal: one shared password, compared by SHA-256 digest, set
//! as an httponly cookie on login. Gates the pipeline entry points only.

use axum::extract::{Query, State};
use axum::response::IntoResponse;
use axum_extra::extract::cookie::{Cookie, CookieJar};
use serde::Deserialize;
use sha2::{Digest, Sha256};

use crate::config::ApiConfig;
use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

/// Cookie holding the login password.
pub const PASSWORD_COOKIE: &str = "password";

/// Compare two secrets by digest.
pub fn digest_equals(candidate: Option<&str>, expected: &str) -> bool {
    let Some(candidate) = candidate else {
        return false;
    };
    let a: [u8; 32] = Sha256::digest(candidate.as_bytes()).into();
    let b: [u8; 32] = Sha256::digest(expected.as_bytes()).into();
    a == b
}

/// Reject the request unless the password cookie matches.
pub fn authorize(config: &ApiConfig, jar: &CookieJar) -> ApiResult<()> {
    if config.disable_auth {
        return Ok(());
    }
    let cookie = jar.get(PASSWORD_COOKIE).map(|c| c.value());
    if digest_equals(cookie, &config.password) {
        Ok(())
    } else {
        Err(ApiError::unauthorized("login required"))
    }
}

#[derive(Deserialize)]
pub struct LoginParams {
    password: String,
}

/// `POST /login` — exchange the password for the session cookie.
pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    Query(params): Query<LoginParams>,
) -> impl IntoResponse {
    if !digest_equals(Some(params.password.as_str()), &state.config.password) {
        let jar = jar.remove(Cookie::from(PASSWORD_COOKIE));
        return (jar, Err::<&str, _>(ApiError::unauthorized("bad login")));
    }

    let cookie = Cookie::build((PASSWORD_COOKIE, state.config.password.clone()))
        .http_only(true)
        .path("/")
        .build();
    (jar.add(cookie), Ok("Login successful"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_digest_equals() {
        assert!(digest_equals(Some("secret"), "secret"));
        assert!(!digest_equals(Some("wrong"), "secret"));
        assert!(!digest_equals(None, "secret"));
    }

    #[test]
    fn test_authorize_respects_disable_flag() {
        let mut config = ApiConfig::default();
        config.disable_auth = true;
        let jar = CookieJar::new();
        assert!(authorize(&config, &jar).is_ok());

        config.disable_auth = false;
        assert!(authorize(&config, &jar).is_err());
    }
}
