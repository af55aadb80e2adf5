use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use time::OffsetDateTime;
use uuid::Uuid;

/// An adoption record: append-only join between a user and a pet.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Adoption {
    pub id: Uuid,
    pub owner: Uuid,
    pub pet: Uuid,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

const ADOPTION_COLUMNS: &str = "id, owner, pet, created_at";

impl Adoption {
    pub async fn find_all(db: &PgPool) -> sqlx::Result<Vec<Adoption>> {
        sqlx::query_as::<_, Adoption>(&format!(
            "SELECT {ADOPTION_COLUMNS} FROM adoptions ORDER BY created_at"
        ))
        .fetch_all(db)
        .await
    }

    pub async fn find_by_id(db: &PgPool, id: Uuid) -> sqlx::Result<Option<Adoption>> {
        sqlx::query_as::<_, Adoption>(&format!(
            "SELECT {ADOPTION_COLUMNS} FROM adoptions WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(db)
        .await
    }

    pub async fn find_by_user(db: &PgPool, owner: Uuid) -> sqlx::Result<Vec<Adoption>> {
        sqlx::query_as::<_, Adoption>(&format!(
            "SELECT {ADOPTION_COLUMNS} FROM adoptions WHERE owner = $1 ORDER BY created_at"
        ))
        .bind(owner)
        .fetch_all(db)
        .await
    }

    pub async fn find_by_owner_and_pet(
        db: &PgPool,
        owner: Uuid,
        pet: Uuid,
    ) -> sqlx::Result<Option<Adoption>> {
        sqlx::query_as::<_, Adoption>(&format!(
            "SELECT {ADOPTION_COLUMNS} FROM adoptions WHERE owner = $1 AND pet = $2"
        ))
        .bind(owner)
        .bind(pet)
        .fetch_optional(db)
        .await
    }
}
