use axum::{
    extract::{FromRef, State},
    http::StatusCode,
    routing::{get, post},
    Router,
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use tracing::{info, instrument, warn};

use super::claims::{Claims, UnprotectedClaims};
use super::dto::{LoginRequest, LoginResponse, RegisterRequest, RegisteredUser, SessionClosed, SessionUser};
use super::jwt::JwtKeys;
use super::password::{hash_password, verify_password};
use super::{SESSION_COOKIE, UNPROTECTED_COOKIE};
use crate::error::{ApiError, AuthError, UserError, ValidationError};
use crate::extract::Json;
use crate::response::Success;
use crate::state::AppState;
use crate::users::repo::{NewUser, User};
use crate::validation::{is_valid_email, MIN_PASSWORD_LEN};

pub fn session_routes() -> Router<AppState> {
    Router::new()
        .route("/sessions/register", post(register))
        .route("/sessions/login", post(login))
        .route("/sessions/current", get(current))
        .route("/sessions/logout", post(logout))
}

pub fn unprotected_routes() -> Router<AppState> {
    Router::new()
        .route("/sessions/unprotected-login", post(unprotected_login))
        .route("/sessions/unprotected-current", get(unprotected_current))
}

#[instrument(skip(state, payload))]
async fn register(
    State(state): State<AppState>,
    Json(payload): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<Success<RegisteredUser>>), ApiError> {
    let (Some(first_name), Some(last_name), Some(email), Some(password)) = (
        payload.first_name,
        payload.last_name,
        payload.email,
        payload.password,
    ) else {
        return Err(ApiError::from(ValidationError::RequiredFieldsMissing)
            .with_cause("first_name, last_name, email and password are mandatory"));
    };

    let email = email.trim().to_lowercase();
    if !is_valid_email(&email) {
        warn!(email = %email, "invalid email on register");
        return Err(UserError::InvalidEmail.into());
    }
    if password.len() < MIN_PASSWORD_LEN {
        warn!("password too short");
        return Err(UserError::WeakPassword.into());
    }

    if User::find_by_email(&state.db, &email).await?.is_some() {
        warn!(email = %email, "email already registered");
        return Err(UserError::AlreadyExists.into());
    }

    let password_hash = hash_password(&password)?;
    let user = User::create(
        &state.db,
        &NewUser {
            first_name,
            last_name,
            email,
            password_hash,
            role: "user".into(),
        },
    )
    .await?;

    info!(user_id = %user.id, email = %user.email, "user registered");
    Ok((
        StatusCode::CREATED,
        Json(Success::new(RegisteredUser {
            id: user.id,
            email: user.email.clone(),
            name: format!("{} {}", user.first_name, user.last_name),
        })),
    ))
}

/// Looks up credentials and issues the session cookie. Unknown email and bad
/// password produce the same error so accounts cannot be enumerated.
#[instrument(skip(state, payload))]
async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(payload): Json<LoginRequest>,
) -> Result<(CookieJar, Json<LoginResponse>), ApiError> {
    let (user, keys) = authenticate(&state, payload).await?;
    let token = keys.sign(&user)?;
    let jar = jar.add(session_cookie(SESSION_COOKIE, token, &keys));

    info!(user_id = %user.id, "user logged in");
    Ok((
        jar,
        Json(LoginResponse {
            success: true,
            user: SessionUser {
                name: format!("{} {}", user.first_name, user.last_name),
                email: user.email,
                role: user.role,
            },
        }),
    ))
}

#[instrument(skip(state))]
async fn current(
    State(state): State<AppState>,
    jar: CookieJar,
) -> Result<Json<Success<Claims>>, ApiError> {
    let cookie = jar.get(SESSION_COOKIE).ok_or(AuthError::TokenMissing)?;
    let keys = JwtKeys::from_ref(&state);
    let claims = keys.verify(cookie.value())?;
    Ok(Json(Success::new(claims)))
}

/// Clears both session cookies; calling it without a session is fine.
#[instrument]
async fn logout(jar: CookieJar) -> (CookieJar, Json<SessionClosed>) {
    let jar = jar
        .remove(Cookie::from(SESSION_COOKIE))
        .remove(Cookie::from(UNPROTECTED_COOKIE));
    (jar, Json(SessionClosed { success: true }))
}

#[instrument(skip(state, payload))]
async fn unprotected_login(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(payload): Json<LoginRequest>,
) -> Result<(CookieJar, Json<SessionClosed>), ApiError> {
    let (user, keys) = authenticate(&state, payload).await?;
    let token = keys.sign_unprotected(&user)?;
    let jar = jar.add(session_cookie(UNPROTECTED_COOKIE, token, &keys));

    info!(user_id = %user.id, "user logged in (unprotected path)");
    Ok((jar, Json(SessionClosed { success: true })))
}

#[instrument(skip(state))]
async fn unprotected_current(
    State(state): State<AppState>,
    jar: CookieJar,
) -> Result<Json<Success<UnprotectedClaims>>, ApiError> {
    let cookie = jar.get(UNPROTECTED_COOKIE).ok_or(AuthError::TokenMissing)?;
    let keys = JwtKeys::from_ref(&state);
    let claims = keys.verify_unprotected(cookie.value())?;
    Ok(Json(Success::new(claims)))
}

async fn authenticate(
    state: &AppState,
    payload: LoginRequest,
) -> Result<(User, JwtKeys), ApiError> {
    let (Some(email), Some(password)) = (payload.email, payload.password) else {
        return Err(ApiError::from(ValidationError::RequiredFieldsMissing)
            .with_cause("email and password are mandatory"));
    };

    let email = email.trim().to_lowercase();
    let user = User::find_by_email(&state.db, &email)
        .await?
        .ok_or_else(|| {
            warn!(email = %email, "login with unknown email");
            ApiError::from(AuthError::InvalidCredentials)
        })?;

    if !verify_password(&password, &user.password_hash)? {
        warn!(user_id = %user.id, "login with invalid password");
        return Err(AuthError::InvalidCredentials.into());
    }

    Ok((user, JwtKeys::from_ref(state)))
}

fn session_cookie(name: &'static str, token: String, keys: &JwtKeys) -> Cookie<'static> {
    let mut cookie = Cookie::new(name, token);
    cookie.set_path("/");
    cookie.set_http_only(true);
    cookie.set_same_site(SameSite::Lax);
    cookie.set_max_age(time::Duration::seconds(keys.ttl.as_secs() as i64));
    cookie
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::header::SET_COOKIE;
    use axum::response::IntoResponse;

    #[tokio::test]
    async fn logout_clears_both_cookies_and_is_idempotent() {
        // Without a session, and again on a second call, the response is the
        // same success body plus removal cookies for both session names.
        for _ in 0..2 {
            let (jar, body) = logout(CookieJar::new()).await;
            assert!(body.0.success);

            let res = (jar, body).into_response();
            let cookies: Vec<String> = res
                .headers()
                .get_all(SET_COOKIE)
                .iter()
                .map(|v| v.to_str().unwrap().to_string())
                .collect();
            assert_eq!(cookies.len(), 2);
            assert!(cookies.iter().any(|c| c.starts_with("session=")));
            assert!(cookies.iter().any(|c| c.starts_with("unprotected_session=")));
        }
    }

    #[test]
    fn session_cookie_is_http_only_and_lax() {
        let keys = JwtKeys {
            encoding: jsonwebtoken::EncodingKey::from_secret(b"test"),
            decoding: jsonwebtoken::DecodingKey::from_secret(b"test"),
            ttl: std::time::Duration::from_secs(3600),
        };
        let cookie = session_cookie(SESSION_COOKIE, "token".into(), &keys);
        assert_eq!(cookie.name(), "session");
        assert_eq!(cookie.http_only(), Some(true));
        assert_eq!(cookie.same_site(), Some(SameSite::Lax));
        assert_eq!(cookie.max_age(), Some(time::Duration::HOUR));
        assert_eq!(cookie.path(), Some("/"));
    }
}
