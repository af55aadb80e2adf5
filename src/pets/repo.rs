use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use time::OffsetDateTime;
use uuid::Uuid;

/// A pet row. `adopted` is true iff `owner` is set.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Pet {
    pub id: Uuid,
    pub name: String,
    pub species: String,
    #[serde(with = "time::serde::rfc3339")]
    pub birth_date: OffsetDateTime,
    pub adopted: bool,
    pub owner: Option<Uuid>,
    pub image: Option<String>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

/// Insert data for a new pet. Species arrives already lowercase.
#[derive(Debug, Clone, Serialize)]
pub struct NewPet {
    pub name: String,
    pub species: String,
    #[serde(with = "time::serde::rfc3339")]
    pub birth_date: OffsetDateTime,
    pub image: Option<String>,
}

/// Partial update; None leaves the column untouched.
#[derive(Debug, Default)]
pub struct PetChanges {
    pub name: Option<String>,
    pub species: Option<String>,
    pub birth_date: Option<OffsetDateTime>,
    pub image: Option<String>,
}

const PET_COLUMNS: &str = "id, name, species, birth_date, adopted, owner, image, created_at";

impl Pet {
    pub async fn find_all(db: &PgPool) -> sqlx::Result<Vec<Pet>> {
        sqlx::query_as::<_, Pet>(&format!(
            "SELECT {PET_COLUMNS} FROM pets ORDER BY created_at"
        ))
        .fetch_all(db)
        .await
    }

    pub async fn find_by_id(db: &PgPool, id: Uuid) -> sqlx::Result<Option<Pet>> {
        sqlx::query_as::<_, Pet>(&format!("SELECT {PET_COLUMNS} FROM pets WHERE id = $1"))
            .bind(id)
            .fetch_optional(db)
            .await
    }

    pub async fn create(db: &PgPool, new: &NewPet) -> sqlx::Result<Pet> {
        sqlx::query_as::<_, Pet>(&format!(
            "INSERT INTO pets (name, species, birth_date, image) \
             VALUES ($1, $2, $3, $4) \
             RETURNING {PET_COLUMNS}"
        ))
        .bind(&new.name)
        .bind(&new.species)
        .bind(new.birth_date)
        .bind(&new.image)
        .fetch_one(db)
        .await
    }

    /// Returns None when no pet has the given id.
    pub async fn update(db: &PgPool, id: Uuid, changes: &PetChanges) -> sqlx::Result<Option<Pet>> {
        sqlx::query_as::<_, Pet>(&format!(
            "UPDATE pets SET \
                name = COALESCE($2, name), \
                species = COALESCE($3, species), \
                birth_date = COALESCE($4, birth_date), \
                image = COALESCE($5, image) \
             WHERE id = $1 \
             RETURNING {PET_COLUMNS}"
        ))
        .bind(id)
        .bind(&changes.name)
        .bind(&changes.species)
        .bind(changes.birth_date)
        .bind(&changes.image)
        .fetch_optional(db)
        .await
    }

    pub async fn delete(db: &PgPool, id: Uuid) -> sqlx::Result<bool> {
        let deleted = sqlx::query("DELETE FROM pets WHERE id = $1")
            .bind(id)
            .execute(db)
            .await?
            .rows_affected();
        Ok(deleted > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pet_serializes_with_rfc3339_dates() {
        let pet = Pet {
            id: Uuid::new_v4(),
            name: "Firulais".into(),
            species: "perro".into(),
            birth_date: time::macros::datetime!(2020-06-01 12:00 UTC),
            adopted: false,
            owner: None,
            image: None,
            created_at: time::macros::datetime!(2024-01-15 09:30 UTC),
        };
        let json = serde_json::to_value(&pet).unwrap();
        assert_eq!(json["species"], "perro");
        assert_eq!(json["birth_date"], "2020-06-01T12:00:00Z");
        assert_eq!(json["adopted"], false);
        assert!(json["owner"].is_null());
    }
}
