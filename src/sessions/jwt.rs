use std::time::Duration;

use axum::extract::FromRef;
use jsonwebtoken::{
    decode, encode, errors::ErrorKind as JwtErrorKind, Algorithm, DecodingKey, EncodingKey,
    Header, Validation,
};
use serde::de::DeserializeOwned;
use serde::Serialize;
use time::OffsetDateTime;
use tracing::debug;

pub use super::claims::{Claims, UnprotectedClaims};
use crate::error::{ApiError, AuthError, ServerError};
use crate::state::AppState;
use crate::users::repo::User;

/// JWT signing and verification keys plus the session TTL.
#[derive(Clone)]
pub struct JwtKeys {
    pub encoding: EncodingKey,
    pub decoding: DecodingKey,
    pub ttl: Duration,
}

impl FromRef<AppState> for JwtKeys {
    fn from_ref(state: &AppState) -> Self {
        let jwt = &state.config.jwt;
        Self {
            encoding: EncodingKey::from_secret(jwt.secret.as_bytes()),
            decoding: DecodingKey::from_secret(jwt.secret.as_bytes()),
            ttl: Duration::from_secs((jwt.ttl_minutes as u64) * 60),
        }
    }
}

impl JwtKeys {
    fn timestamps(&self) -> (usize, usize) {
        let now = OffsetDateTime::now_utc().unix_timestamp() as usize;
        (now, now + self.ttl.as_secs() as usize)
    }

    /// Signs the reduced user projection into a session token.
    pub fn sign(&self, user: &User) -> Result<String, ApiError> {
        let (iat, exp) = self.timestamps();
        let claims = Claims {
            sub: user.id,
            name: format!("{} {}", user.first_name, user.last_name),
            email: user.email.clone(),
            role: user.role.clone(),
            iat,
            exp,
        };
        self.encode_claims(&claims, user)
    }

    /// Signs the unfiltered payload of the lower-assurance path.
    pub fn sign_unprotected(&self, user: &User) -> Result<String, ApiError> {
        let (iat, exp) = self.timestamps();
        let claims = UnprotectedClaims {
            id: user.id,
            email: user.email.clone(),
            first_name: user.first_name.clone(),
            last_name: user.last_name.clone(),
            role: user.role.clone(),
            iat,
            exp,
        };
        self.encode_claims(&claims, user)
    }

    fn encode_claims<T: Serialize>(&self, claims: &T, user: &User) -> Result<String, ApiError> {
        let token = encode(&Header::default(), claims, &self.encoding)
            .map_err(|e| ApiError::from(ServerError::Internal).with_cause(e.to_string()))?;
        debug!(user_id = %user.id, "jwt signed");
        Ok(token)
    }

    pub fn verify(&self, token: &str) -> Result<Claims, ApiError> {
        self.decode_claims(token)
    }

    pub fn verify_unprotected(&self, token: &str) -> Result<UnprotectedClaims, ApiError> {
        self.decode_claims(token)
    }

    fn decode_claims<T: DeserializeOwned>(&self, token: &str) -> Result<T, ApiError> {
        let validation = Validation::new(Algorithm::HS256);
        match decode::<T>(token, &self.decoding, &validation) {
            Ok(data) => Ok(data.claims),
            Err(e) if matches!(e.kind(), JwtErrorKind::ExpiredSignature) => {
                Err(AuthError::SessionExpired.into())
            }
            Err(_) => Err(AuthError::TokenInvalid.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn make_keys() -> JwtKeys {
        let state = AppState::fake();
        JwtKeys::from_ref(&state)
    }

    fn make_user() -> User {
        User {
            id: Uuid::new_v4(),
            first_name: "Ana".into(),
            last_name: "Gomez".into(),
            email: "ana@test.com".into(),
            password_hash: "hash".into(),
            role: "admin".into(),
            pets: vec![],
            created_at: OffsetDateTime::now_utc(),
        }
    }

    #[tokio::test]
    async fn sign_and_verify_roundtrip() {
        let keys = make_keys();
        let user = make_user();
        let token = keys.sign(&user).expect("sign");
        let claims = keys.verify(&token).expect("verify");
        assert_eq!(claims.sub, user.id);
        assert_eq!(claims.name, "Ana Gomez");
        assert_eq!(claims.email, "ana@test.com");
        assert_eq!(claims.role, "admin");
    }

    #[tokio::test]
    async fn claims_never_carry_the_hash() {
        let keys = make_keys();
        let user = make_user();
        let token = keys.sign(&user).expect("sign");
        let claims = keys.verify(&token).expect("verify");
        let json = serde_json::to_string(&claims).unwrap();
        assert!(!json.contains("hash"));
        assert!(!json.contains("password"));
    }

    #[tokio::test]
    async fn unprotected_claims_carry_the_raw_fields() {
        let keys = make_keys();
        let user = make_user();
        let token = keys.sign_unprotected(&user).expect("sign");
        let claims = keys.verify_unprotected(&token).expect("verify");
        assert_eq!(claims.first_name, "Ana");
        assert_eq!(claims.last_name, "Gomez");
        assert_eq!(claims.id, user.id);
    }

    #[tokio::test]
    async fn expired_token_maps_to_session_expired() {
        let keys = make_keys();
        let user = make_user();
        let now = OffsetDateTime::now_utc().unix_timestamp() as usize;
        let claims = Claims {
            sub: user.id,
            name: "Ana Gomez".into(),
            email: user.email.clone(),
            role: user.role.clone(),
            iat: now - 7200,
            exp: now - 3600,
        };
        let token = encode(&Header::default(), &claims, &keys.encoding).unwrap();
        let err = keys.verify(&token).unwrap_err();
        assert_eq!(err.to_string(), "The session has expired");
        assert_eq!(err.status(), axum::http::StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn garbage_token_maps_to_token_invalid() {
        let keys = make_keys();
        let err = keys.verify("definitely.not.a-jwt").unwrap_err();
        assert_eq!(err.to_string(), "Invalid or expired authentication token");
    }

    #[tokio::test]
    async fn token_signed_with_other_secret_is_rejected() {
        let keys = make_keys();
        let other = JwtKeys {
            encoding: EncodingKey::from_secret(b"other-secret"),
            decoding: DecodingKey::from_secret(b"other-secret"),
            ttl: Duration::from_secs(3600),
        };
        let token = other.sign(&make_user()).expect("sign");
        let err = keys.verify(&token).unwrap_err();
        assert_eq!(err.name(), "AuthenticationError");
    }
}
