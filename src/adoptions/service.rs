use sqlx::PgPool;
use tracing::{info, warn};
use uuid::Uuid;

use super::dto::AdoptionDetails;
use super::repo::Adoption;
use crate::error::{AdoptionError, ApiError};
use crate::pets::repo::Pet;
use crate::users::repo::User;

/// Business checks over already-fetched records, in failure order:
/// self-adoption, pet availability, duplicate adoption record, duplicate
/// list membership. Self-adoption is checked before availability so that a
/// user retrying on their own pet sees SELF_ADOPTION rather than the generic
/// PET_NOT_AVAILABLE a stranger would get.
pub fn check_preconditions(
    user: &User,
    pet: &Pet,
    existing: Option<&Adoption>,
) -> Result<(), ApiError> {
    if pet.owner == Some(user.id) {
        return Err(AdoptionError::SelfAdoption.into());
    }
    if pet.adopted {
        return Err(AdoptionError::PetNotAvailable.into());
    }
    if existing.is_some() {
        return Err(AdoptionError::AlreadyExists.into());
    }
    // Redundant with the adoption lookup, but guards the user's pets list on
    // a distinct data path.
    if user.pets.contains(&pet.id) {
        return Err(AdoptionError::AlreadyExists.into());
    }
    Ok(())
}

/// Performs the adoption: preconditions, then one transaction that appends
/// the pet to the user's list, flips the pet to adopted and inserts the
/// adoption record. All three writes commit or none do; concurrent attempts
/// on the same pet are serialized by the row lock and the loser observes
/// PET_NOT_AVAILABLE.
pub async fn create_adoption(
    db: &PgPool,
    uid: Uuid,
    pid: Uuid,
) -> Result<AdoptionDetails, ApiError> {
    let user = User::find_by_id(db, uid)
        .await?
        .ok_or(AdoptionError::UserNotFound)?;
    let pet = Pet::find_by_id(db, pid)
        .await?
        .ok_or(AdoptionError::PetNotFound)?;
    let existing = Adoption::find_by_owner_and_pet(db, uid, pid).await?;
    check_preconditions(&user, &pet, existing.as_ref())?;

    let mut tx = db.begin().await.map_err(creation_failed)?;

    // Re-check availability under the row lock; a concurrent adoption that
    // committed first makes this attempt lose cleanly.
    let locked = sqlx::query_as::<_, (bool,)>("SELECT adopted FROM pets WHERE id = $1 FOR UPDATE")
        .bind(pid)
        .fetch_optional(&mut *tx)
        .await
        .map_err(creation_failed)?;
    match locked {
        None => return Err(AdoptionError::PetNotFound.into()),
        Some((true,)) => {
            warn!(user_id = %uid, pet_id = %pid, "lost adoption race");
            return Err(AdoptionError::PetNotAvailable.into());
        }
        Some((false,)) => {}
    }

    sqlx::query("UPDATE users SET pets = array_append(pets, $2) WHERE id = $1")
        .bind(uid)
        .bind(pid)
        .execute(&mut *tx)
        .await
        .map_err(creation_failed)?;

    sqlx::query("UPDATE pets SET adopted = TRUE, owner = $2 WHERE id = $1")
        .bind(pid)
        .bind(uid)
        .execute(&mut *tx)
        .await
        .map_err(creation_failed)?;

    let adoption = sqlx::query_as::<_, Adoption>(
        "INSERT INTO adoptions (owner, pet) VALUES ($1, $2) RETURNING id, owner, pet, created_at",
    )
    .bind(uid)
    .bind(pid)
    .fetch_one(&mut *tx)
    .await
    .map_err(|e| match &e {
        // The (owner, pet) unique index catches a concurrent duplicate pair.
        sqlx::Error::Database(db) if db.is_unique_violation() => {
            AdoptionError::AlreadyExists.into()
        }
        _ => creation_failed(e),
    })?;

    tx.commit().await.map_err(creation_failed)?;

    info!(user_id = %uid, pet_id = %pid, adoption_id = %adoption.id, "pet adopted");
    Ok(AdoptionDetails::from_parts(adoption, &user, &pet))
}

fn creation_failed(e: sqlx::Error) -> ApiError {
    ApiError::from(AdoptionError::CreationFailed).with_cause(e.to_string())
}
