use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

/// Creation body. Fields are optional so that missing ones map to the
/// taxonomy (MissingRequiredFields) instead of a deserialization rejection.
#[derive(Debug, Deserialize)]
pub struct CreatePetRequest {
    pub name: Option<String>,
    pub species: Option<String>,
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub birth_date: Option<OffsetDateTime>,
}

#[derive(Debug, Deserialize)]
pub struct UpdatePetRequest {
    pub name: Option<String>,
    pub species: Option<String>,
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub birth_date: Option<OffsetDateTime>,
    pub image: Option<String>,
}

impl UpdatePetRequest {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.species.is_none()
            && self.birth_date.is_none()
            && self.image.is_none()
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeletedPet {
    pub deleted_pet_id: Uuid,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_request_tolerates_missing_fields() {
        let req: CreatePetRequest = serde_json::from_str(r#"{"name":"Michi"}"#).unwrap();
        assert_eq!(req.name.as_deref(), Some("Michi"));
        assert!(req.species.is_none());
        assert!(req.birth_date.is_none());
    }

    #[test]
    fn create_request_parses_rfc3339_birth_date() {
        let req: CreatePetRequest =
            serde_json::from_str(r#"{"birth_date":"2021-03-04T00:00:00Z"}"#).unwrap();
        assert!(req.birth_date.is_some());
    }

    #[test]
    fn deleted_pet_payload_is_camel_case() {
        let id = Uuid::new_v4();
        let json = serde_json::to_value(DeletedPet { deleted_pet_id: id }).unwrap();
        assert_eq!(json["deletedPetId"], serde_json::json!(id));
    }
}
