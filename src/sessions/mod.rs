mod claims;
mod dto;
pub mod handlers;
pub mod jwt;
pub mod password;

use axum::Router;

use crate::config::AppConfig;
use crate::state::AppState;

/// Cookie carrying the signed session token (reduced user projection).
pub const SESSION_COOKIE: &str = "session";
/// Cookie of the lower-assurance path; wider payload, only mounted when
/// `AppConfig.unprotected_login` is set.
pub const UNPROTECTED_COOKIE: &str = "unprotected_session";

pub fn router(config: &AppConfig) -> Router<AppState> {
    let mut routes = handlers::session_routes();
    if config.unprotected_login {
        routes = routes.merge(handlers::unprotected_routes());
    }
    routes
}
