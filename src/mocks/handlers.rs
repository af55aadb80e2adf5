use std::collections::HashSet;

use axum::{
    extract::State,
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};

use super::generator;
use crate::error::{ApiError, ValidationError};
use crate::extract::{Json, Query};
use crate::pets::repo::{NewPet, Pet};
use crate::response::Success;
use crate::state::AppState;
use crate::users::repo::{NewUser, User};

pub fn mock_routes() -> Router<AppState> {
    Router::new()
        .route("/mocks/mockingusers", get(mocking_users))
        .route("/mocks/mockingpets", get(mocking_pets))
        .route("/mocks/generatedata", post(generate_data))
}

#[derive(Debug, Deserialize)]
pub struct GenerateDataParams {
    #[serde(default = "default_quantity")]
    pub users: i64,
    #[serde(default = "default_quantity")]
    pub pets: i64,
}

fn default_quantity() -> i64 {
    20
}

#[derive(Debug, Serialize)]
pub struct GeneratedData {
    pub users: Vec<User>,
    pub pets: Vec<Pet>,
}

/// Returns 50 synthetic users without persisting them.
#[instrument]
async fn mocking_users() -> Result<Json<Success<Vec<NewUser>>>, ApiError> {
    let users = generator::generate_users(50)?;
    Ok(Json(Success::new(users)))
}

/// Returns 50 synthetic pets without persisting them.
#[instrument]
async fn mocking_pets() -> Json<Success<Vec<NewPet>>> {
    Json(Success::new(generator::generate_pets(50)))
}

/// Generates and persists the requested quantities of users and pets.
#[instrument(skip(state))]
async fn generate_data(
    State(state): State<AppState>,
    Query(params): Query<GenerateDataParams>,
) -> Result<Json<Success<GeneratedData>>, ApiError> {
    if params.users <= 0 || params.pets <= 0 {
        return Err(ApiError::from(ValidationError::InvalidQueryParams)
            .with_cause("users and pets quantities must be greater than zero"));
    }

    // Emails colliding with real rows are skipped, not fatal; generating
    // data twice against the same database must keep working.
    let batch = generator::generate_users(params.users as usize)?;
    let emails: Vec<String> = batch.iter().map(|u| u.email.clone()).collect();
    let existing: HashSet<String> = User::existing_emails(&state.db, &emails)
        .await?
        .into_iter()
        .collect();

    let mut users = Vec::with_capacity(batch.len());
    for new_user in generator::skip_existing(batch, &existing) {
        users.push(User::create(&state.db, &new_user).await?);
    }

    let mut pets = Vec::with_capacity(params.pets as usize);
    for new_pet in generator::generate_pets(params.pets as usize) {
        pets.push(Pet::create(&state.db, &new_pet).await?);
    }

    info!(users = users.len(), pets = pets.len(), "mock data persisted");
    Ok(Json(Success::new(GeneratedData { users, pets })))
}
