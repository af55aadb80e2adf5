use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Reduced user projection signed into the session token. Never carries the
/// password hash.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,
    pub name: String,
    pub email: String,
    pub role: String,
    pub iat: usize,
    pub exp: usize,
}

/// Unfiltered payload of the lower-assurance path: the user fields directly,
/// no projection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UnprotectedClaims {
    pub id: Uuid,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub role: String,
    pub iat: usize,
    pub exp: usize,
}
