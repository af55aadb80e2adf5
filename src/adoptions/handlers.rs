use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use tracing::instrument;

use super::dto::AdoptionDetails;
use super::repo::Adoption;
use super::service;
use crate::error::{AdoptionError, ApiError, UserError};
use crate::response::Success;
use crate::state::AppState;
use crate::users::repo::User;
use crate::validation::parse_id;

pub fn adoption_routes() -> Router<AppState> {
    Router::new()
        .route("/adoptions", get(list_adoptions))
        .route("/adoptions/:aid", get(get_adoption))
        .route("/adoptions/user/:uid", get(get_adoptions_by_user))
        .route("/adoptions/:uid/:pid", post(create_adoption))
}

#[instrument(skip(state))]
async fn list_adoptions(
    State(state): State<AppState>,
) -> Result<Json<Success<Vec<Adoption>>>, ApiError> {
    let adoptions = Adoption::find_all(&state.db).await?;
    Ok(Json(Success::new(adoptions)))
}

#[instrument(skip(state))]
async fn get_adoption(
    State(state): State<AppState>,
    Path(aid): Path<String>,
) -> Result<Json<Success<Adoption>>, ApiError> {
    let aid = parse_id(&aid)?;
    let adoption = Adoption::find_by_id(&state.db, aid)
        .await?
        .ok_or(AdoptionError::NotFound)?;
    Ok(Json(Success::new(adoption)))
}

#[instrument(skip(state))]
async fn get_adoptions_by_user(
    State(state): State<AppState>,
    Path(uid): Path<String>,
) -> Result<Json<Success<Vec<Adoption>>>, ApiError> {
    let uid = parse_id(&uid)?;
    if User::find_by_id(&state.db, uid).await?.is_none() {
        return Err(UserError::NotFound.into());
    }
    let adoptions = Adoption::find_by_user(&state.db, uid).await?;
    Ok(Json(Success::new(adoptions)))
}

#[instrument(skip(state))]
async fn create_adoption(
    State(state): State<AppState>,
    Path((uid, pid)): Path<(String, String)>,
) -> Result<(StatusCode, Json<Success<AdoptionDetails>>), ApiError> {
    let uid = parse_id(&uid)?;
    let pid = parse_id(&pid)?;
    let details = service::create_adoption(&state.db, uid, pid).await?;
    Ok((StatusCode::CREATED, Json(Success::new(details))))
}
