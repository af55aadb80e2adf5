use axum::{
    extract::{multipart::MultipartError, DefaultBodyLimit, Multipart, Path, State},
    http::StatusCode,
    routing::{get, post},
    Router,
};
use time::format_description::well_known::Rfc3339;
use time::OffsetDateTime;
use tracing::{error, info, instrument, warn};
use uuid::Uuid;

use super::dto::{CreatePetRequest, DeletedPet, UpdatePetRequest};
use super::repo::{NewPet, Pet, PetChanges};
use crate::error::{ApiError, FileError, PetError, ValidationError};
use crate::extract::Json;
use crate::response::Success;
use crate::state::AppState;
use crate::validation::{is_valid_birth_date, parse_id, Species};

const MAX_IMAGE_BYTES: usize = 5 * 1024 * 1024;

pub fn pet_routes() -> Router<AppState> {
    Router::new()
        .route("/pets", get(list_pets).post(create_pet))
        .route(
            "/pets/image",
            post(create_pet_with_image).layer(DefaultBodyLimit::max(MAX_IMAGE_BYTES + 64 * 1024)),
        )
        .route(
            "/pets/:pid",
            get(get_pet).put(update_pet).delete(delete_pet),
        )
}

#[instrument(skip(state))]
async fn list_pets(State(state): State<AppState>) -> Result<Json<Success<Vec<Pet>>>, ApiError> {
    let pets = Pet::find_all(&state.db).await?;
    Ok(Json(Success::new(pets)))
}

#[instrument(skip(state))]
async fn get_pet(
    State(state): State<AppState>,
    Path(pid): Path<String>,
) -> Result<Json<Success<Pet>>, ApiError> {
    let pid = parse_id(&pid)?;
    let pet = Pet::find_by_id(&state.db, pid)
        .await?
        .ok_or(PetError::NotFound)?;
    Ok(Json(Success::new(pet)))
}

#[instrument(skip(state, payload))]
async fn create_pet(
    State(state): State<AppState>,
    Json(payload): Json<CreatePetRequest>,
) -> Result<(StatusCode, Json<Success<Pet>>), ApiError> {
    let new = validate_new_pet(payload.name, payload.species, payload.birth_date, None)?;
    let pet = Pet::create(&state.db, &new).await?;
    info!(pet_id = %pet.id, species = %pet.species, "pet created");
    Ok((StatusCode::CREATED, Json(Success::new(pet))))
}

#[instrument(skip(state, payload))]
async fn update_pet(
    State(state): State<AppState>,
    Path(pid): Path<String>,
    Json(payload): Json<UpdatePetRequest>,
) -> Result<Json<Success<Pet>>, ApiError> {
    let pid = parse_id(&pid)?;
    if payload.is_empty() {
        return Err(ApiError::from(ValidationError::InvalidRequestBody)
            .with_cause("The request body cannot be empty"));
    }

    if Pet::find_by_id(&state.db, pid).await?.is_none() {
        return Err(PetError::NotFound.into());
    }

    // Species casing is normalized before persisting.
    let species = match payload.species {
        Some(raw) => Some(raw.parse::<Species>()?.to_string()),
        None => None,
    };
    if let Some(birth_date) = payload.birth_date {
        if !is_valid_birth_date(birth_date) {
            return Err(PetError::InvalidAge.into());
        }
    }

    let changes = PetChanges {
        name: payload.name,
        species,
        birth_date: payload.birth_date,
        image: payload.image,
    };
    let pet = Pet::update(&state.db, pid, &changes)
        .await?
        .ok_or(PetError::UpdateFailed)?;

    info!(pet_id = %pet.id, "pet updated");
    Ok(Json(Success::new(pet)))
}

#[instrument(skip(state))]
async fn delete_pet(
    State(state): State<AppState>,
    Path(pid): Path<String>,
) -> Result<Json<Success<DeletedPet>>, ApiError> {
    let pid = parse_id(&pid)?;
    let pet = Pet::find_by_id(&state.db, pid)
        .await?
        .ok_or(PetError::NotFound)?;

    if pet.adopted {
        warn!(pet_id = %pid, "refusing to delete an adopted pet");
        return Err(ApiError::from(PetError::AlreadyAdopted)
            .with_cause("A pet that has already been adopted cannot be deleted"));
    }

    if !Pet::delete(&state.db, pid).await? {
        return Err(PetError::DeleteFailed.into());
    }

    info!(pet_id = %pid, "pet deleted");
    Ok(Json(Success::new(DeletedPet { deleted_pet_id: pid })))
}

/// POST /pets/image (multipart): text fields `name`, `species`, `birth_date`
/// plus an `image` file (JPG, PNG or GIF, at most 5 MiB).
#[instrument(skip(state, mp))]
async fn create_pet_with_image(
    State(state): State<AppState>,
    mut mp: Multipart,
) -> Result<(StatusCode, Json<Success<Pet>>), ApiError> {
    let mut name = None;
    let mut species = None;
    let mut birth_date = None;
    let mut file: Option<(Vec<u8>, &'static str)> = None;

    while let Some(field) = mp.next_field().await.map_err(multipart_error)? {
        let field_name = field.name().map(|s| s.to_string());
        match field_name.as_deref() {
            Some("name") => name = field.text().await.ok(),
            Some("species") => species = field.text().await.ok(),
            Some("birth_date") => {
                let raw = field
                    .text()
                    .await
                    .map_err(|_| PetError::InvalidAge)?;
                let parsed = OffsetDateTime::parse(&raw, &Rfc3339)
                    .map_err(|_| PetError::InvalidAge)?;
                birth_date = Some(parsed);
            }
            Some("image") => {
                let content_type = field.content_type().map(|s| s.to_string());
                let ext = match content_type.as_deref() {
                    Some("image/jpeg") | Some("image/jpg") => "jpg",
                    Some("image/png") => "png",
                    Some("image/gif") => "gif",
                    _ => return Err(FileError::InvalidFileType.into()),
                };
                let data = field.bytes().await.map_err(multipart_error)?;
                if data.len() > MAX_IMAGE_BYTES {
                    return Err(ApiError::from(FileError::FileTooLarge)
                        .with_cause("The image cannot exceed 5 MiB"));
                }
                file = Some((data.to_vec(), ext));
            }
            _ => {}
        }
    }

    let (data, ext) = file.ok_or_else(|| {
        ApiError::from(FileError::UploadFailed).with_cause("No image file was provided")
    })?;

    let image_name = format!("{}.{}", Uuid::new_v4(), ext);
    let image_path = format!("{}/{}", state.config.uploads_dir, image_name);
    tokio::fs::write(&image_path, &data).await.map_err(|e| {
        error!(error = %e, path = %image_path, "writing image failed");
        ApiError::from(PetError::ImageUploadFailed).with_cause(e.to_string())
    })?;

    let new = validate_new_pet(name, species, birth_date, Some(format!("/img/{image_name}")))?;
    let pet = Pet::create(&state.db, &new).await?;
    info!(pet_id = %pet.id, image = ?pet.image, "pet created with image");
    Ok((StatusCode::CREATED, Json(Success::new(pet))))
}

/// A body that outgrows the request limit surfaces as a read error on the
/// multipart stream; that case is a size problem, not an upload failure.
fn multipart_error(e: MultipartError) -> ApiError {
    if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
        return ApiError::from(FileError::FileTooLarge)
            .with_cause("The image cannot exceed 5 MiB");
    }
    error!(error = %e, "reading multipart field failed");
    ApiError::from(FileError::UploadFailed).with_cause(e.body_text())
}

fn validate_new_pet(
    name: Option<String>,
    species: Option<String>,
    birth_date: Option<OffsetDateTime>,
    image: Option<String>,
) -> Result<NewPet, ApiError> {
    let (Some(name), Some(species), Some(birth_date)) = (name, species, birth_date) else {
        return Err(PetError::MissingRequiredFields.into());
    };
    let species = species.parse::<Species>()?;
    if !is_valid_birth_date(birth_date) {
        return Err(PetError::InvalidAge.into());
    }
    Ok(NewPet {
        name,
        species: species.to_string(),
        birth_date,
        image,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::Duration;

    #[test]
    fn new_pet_normalizes_species_casing() {
        let born = OffsetDateTime::now_utc() - Duration::days(400);
        let new = validate_new_pet(
            Some("Michi".into()),
            Some("GATO".into()),
            Some(born),
            None,
        )
        .unwrap();
        assert_eq!(new.species, "gato");
    }

    #[test]
    fn new_pet_requires_all_fields() {
        let err = validate_new_pet(Some("Michi".into()), None, None, None).unwrap_err();
        assert_eq!(err.name(), "PetValidationError");
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn new_pet_rejects_future_birth_date() {
        let future = OffsetDateTime::now_utc() + Duration::minutes(5);
        let err = validate_new_pet(
            Some("Michi".into()),
            Some("gato".into()),
            Some(future),
            None,
        )
        .unwrap_err();
        assert_eq!(err.name(), "PetValidationError");
    }

    #[test]
    fn new_pet_rejects_unknown_species() {
        let born = OffsetDateTime::now_utc() - Duration::days(10);
        let err = validate_new_pet(
            Some("Rex".into()),
            Some("dinosaurio".into()),
            Some(born),
            None,
        )
        .unwrap_err();
        assert_eq!(err.name(), "PetValidationError");
    }
}
