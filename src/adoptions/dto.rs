use serde::Serialize;
use time::OffsetDateTime;
use uuid::Uuid;

use super::repo::Adoption;
use crate::pets::repo::Pet;
use crate::users::repo::User;

/// The created adoption plus denormalized display fields for the response.
#[derive(Debug, Serialize)]
pub struct AdoptionDetails {
    pub id: Uuid,
    pub owner: Uuid,
    pub pet: Uuid,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    pub owner_name: String,
    pub owner_email: String,
    pub pet_name: String,
    pub pet_species: String,
}

impl AdoptionDetails {
    pub fn from_parts(adoption: Adoption, user: &User, pet: &Pet) -> Self {
        Self {
            id: adoption.id,
            owner: adoption.owner,
            pet: adoption.pet,
            created_at: adoption.created_at,
            owner_name: format!("{} {}", user.first_name, user.last_name),
            owner_email: user.email.clone(),
            pet_name: pet.name.clone(),
            pet_species: pet.species.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn details_denormalize_owner_and_pet() {
        let now = OffsetDateTime::now_utc();
        let user = User {
            id: Uuid::new_v4(),
            first_name: "Ana".into(),
            last_name: "Gomez".into(),
            email: "ana@test.com".into(),
            password_hash: "hash".into(),
            role: "user".into(),
            pets: vec![],
            created_at: now,
        };
        let pet = Pet {
            id: Uuid::new_v4(),
            name: "Michi".into(),
            species: "gato".into(),
            birth_date: now - time::Duration::days(365),
            adopted: true,
            owner: Some(user.id),
            image: None,
            created_at: now,
        };
        let adoption = Adoption {
            id: Uuid::new_v4(),
            owner: user.id,
            pet: pet.id,
            created_at: now,
        };

        let details = AdoptionDetails::from_parts(adoption, &user, &pet);
        assert_eq!(details.owner_name, "Ana Gomez");
        assert_eq!(details.owner_email, "ana@test.com");
        assert_eq!(details.pet_species, "gato");

        let json = serde_json::to_value(&details).unwrap();
        assert!(!json.to_string().contains("hash"));
    }
}
