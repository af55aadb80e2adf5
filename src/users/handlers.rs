use axum::{
    extract::{Path, State},
    routing::get,
    Router,
};
use tracing::{info, instrument, warn};

use super::dto::{DeletedUser, UpdateUserRequest};
use super::repo::{User, UserChanges};
use crate::error::{ApiError, UserError, ValidationError};
use crate::extract::Json;
use crate::response::Success;
use crate::state::AppState;
use crate::validation::{is_valid_email, parse_id};

pub fn user_routes() -> Router<AppState> {
    Router::new()
        .route("/users", get(list_users))
        .route(
            "/users/:uid",
            get(get_user).put(update_user).delete(delete_user),
        )
}

#[instrument(skip(state))]
async fn list_users(State(state): State<AppState>) -> Result<Json<Success<Vec<User>>>, ApiError> {
    let users = User::find_all(&state.db).await?;
    Ok(Json(Success::new(users)))
}

#[instrument(skip(state))]
async fn get_user(
    State(state): State<AppState>,
    Path(uid): Path<String>,
) -> Result<Json<Success<User>>, ApiError> {
    let uid = parse_id(&uid)?;
    let user = User::find_by_id(&state.db, uid)
        .await?
        .ok_or(UserError::NotFound)?;
    Ok(Json(Success::new(user)))
}

#[instrument(skip(state, payload))]
async fn update_user(
    State(state): State<AppState>,
    Path(uid): Path<String>,
    Json(payload): Json<UpdateUserRequest>,
) -> Result<Json<Success<User>>, ApiError> {
    let uid = parse_id(&uid)?;
    if payload.is_empty() {
        return Err(ApiError::from(ValidationError::InvalidRequestBody)
            .with_cause("The request body cannot be empty"));
    }

    let email = match payload.email {
        Some(raw) => {
            let email = raw.trim().to_lowercase();
            if !is_valid_email(&email) {
                warn!(email = %email, "invalid email on user update");
                return Err(UserError::InvalidEmail.into());
            }
            Some(email)
        }
        None => None,
    };

    if User::find_by_id(&state.db, uid).await?.is_none() {
        return Err(UserError::NotFound.into());
    }

    let changes = UserChanges {
        first_name: payload.first_name,
        last_name: payload.last_name,
        email,
    };
    let user = User::update(&state.db, uid, &changes)
        .await?
        .ok_or(UserError::UpdateFailed)?;

    info!(user_id = %user.id, "user updated");
    Ok(Json(Success::new(user)))
}

#[instrument(skip(state))]
async fn delete_user(
    State(state): State<AppState>,
    Path(uid): Path<String>,
) -> Result<Json<Success<DeletedUser>>, ApiError> {
    let uid = parse_id(&uid)?;
    if User::find_by_id(&state.db, uid).await?.is_none() {
        return Err(UserError::NotFound.into());
    }

    if !User::delete(&state.db, uid).await? {
        return Err(UserError::DeleteFailed.into());
    }

    info!(user_id = %uid, "user deleted, owned pets released");
    Ok(Json(Success::new(DeletedUser { deleted_user_id: uid })))
}
