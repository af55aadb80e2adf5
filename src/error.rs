use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::Request;
use axum::http::StatusCode;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use thiserror::Error;
use time::format_description::well_known::Rfc3339;
use time::OffsetDateTime;

/// Authentication and authorization failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum AuthError {
    #[error("Incorrect email or password")]
    InvalidCredentials,
    #[error("Invalid or expired authentication token")]
    TokenInvalid,
    #[error("Authentication token required")]
    TokenMissing,
    #[error("Access denied, insufficient permissions")]
    AccessDenied,
    #[error("The session has expired")]
    SessionExpired,
}

impl AuthError {
    fn name(self) -> &'static str {
        match self {
            AuthError::AccessDenied => "AuthorizationError",
            _ => "AuthenticationError",
        }
    }

    fn status(self) -> StatusCode {
        match self {
            AuthError::AccessDenied => StatusCode::FORBIDDEN,
            _ => StatusCode::UNAUTHORIZED,
        }
    }

    fn cause(self) -> &'static str {
        match self {
            AuthError::InvalidCredentials => "The provided credentials are not valid",
            AuthError::TokenInvalid => "The JWT is not valid or has expired",
            AuthError::TokenMissing => "No authentication token was provided",
            AuthError::AccessDenied => "The user lacks permission for this action",
            AuthError::SessionExpired => "The user session has expired",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum UserError {
    #[error("User not found")]
    NotFound,
    #[error("The user already exists")]
    AlreadyExists,
    #[error("Invalid user data")]
    InvalidData,
    #[error("The password must be at least 8 characters long")]
    WeakPassword,
    #[error("The email format is not valid")]
    InvalidEmail,
    #[error("The user could not be updated")]
    UpdateFailed,
    #[error("The user could not be deleted")]
    DeleteFailed,
}

impl UserError {
    fn name(self) -> &'static str {
        match self {
            UserError::NotFound => "UserNotFoundError",
            UserError::AlreadyExists => "UserExistsError",
            UserError::InvalidData | UserError::WeakPassword | UserError::InvalidEmail => {
                "UserValidationError"
            }
            UserError::UpdateFailed => "UserUpdateError",
            UserError::DeleteFailed => "UserDeleteError",
        }
    }

    fn status(self) -> StatusCode {
        match self {
            UserError::NotFound => StatusCode::NOT_FOUND,
            UserError::AlreadyExists => StatusCode::CONFLICT,
            UserError::InvalidData | UserError::WeakPassword | UserError::InvalidEmail => {
                StatusCode::BAD_REQUEST
            }
            UserError::UpdateFailed | UserError::DeleteFailed => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    fn cause(self) -> &'static str {
        match self {
            UserError::NotFound => "No user exists with the given id",
            UserError::AlreadyExists => "A user is already registered with this email",
            UserError::InvalidData => "The provided data does not meet the requirements",
            UserError::WeakPassword => "The password does not meet the security requirements",
            UserError::InvalidEmail => "The provided email does not have a valid format",
            UserError::UpdateFailed => "Internal error while updating the user",
            UserError::DeleteFailed => "Internal error while deleting the user",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum PetError {
    #[error("Pet not found")]
    NotFound,
    #[error("The pet has already been adopted")]
    AlreadyAdopted,
    #[error("Invalid pet data")]
    InvalidData,
    #[error("Missing required fields (name, species, birth_date)")]
    MissingRequiredFields,
    #[error("Invalid species")]
    InvalidSpecies,
    #[error("Invalid birth date")]
    InvalidAge,
    #[error("Failed to upload the pet image")]
    ImageUploadFailed,
    #[error("Invalid image format")]
    InvalidImageFormat,
    #[error("The pet could not be updated")]
    UpdateFailed,
    #[error("The pet could not be deleted")]
    DeleteFailed,
}

impl PetError {
    fn name(self) -> &'static str {
        match self {
            PetError::NotFound => "PetNotFoundError",
            PetError::AlreadyAdopted => "PetNotAvailableError",
            PetError::InvalidData
            | PetError::MissingRequiredFields
            | PetError::InvalidSpecies
            | PetError::InvalidAge => "PetValidationError",
            PetError::ImageUploadFailed | PetError::InvalidImageFormat => "PetImageError",
            PetError::UpdateFailed => "PetUpdateError",
            PetError::DeleteFailed => "PetDeleteError",
        }
    }

    fn status(self) -> StatusCode {
        match self {
            PetError::NotFound => StatusCode::NOT_FOUND,
            PetError::AlreadyAdopted => StatusCode::CONFLICT,
            PetError::InvalidData
            | PetError::MissingRequiredFields
            | PetError::InvalidSpecies
            | PetError::InvalidAge
            | PetError::InvalidImageFormat => StatusCode::BAD_REQUEST,
            PetError::ImageUploadFailed | PetError::UpdateFailed | PetError::DeleteFailed => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    fn cause(self) -> &'static str {
        match self {
            PetError::NotFound => "No pet exists with the given id",
            PetError::AlreadyAdopted => "This pet already has an owner",
            PetError::InvalidData => "The pet data is not valid",
            PetError::MissingRequiredFields => "Not all mandatory fields were provided",
            PetError::InvalidSpecies => "The species must be one of the supported animals",
            PetError::InvalidAge => "The birth date cannot be in the future",
            PetError::ImageUploadFailed => "The image could not be processed or stored",
            PetError::InvalidImageFormat => "Only JPG, PNG or GIF images are allowed",
            PetError::UpdateFailed => "Internal error while updating the pet",
            PetError::DeleteFailed => "Internal error while deleting the pet",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum AdoptionError {
    #[error("Adoption not found")]
    NotFound,
    #[error("An adoption between this user and pet already exists")]
    AlreadyExists,
    #[error("Adopting user not found")]
    UserNotFound,
    #[error("Pet not found for adoption")]
    PetNotFound,
    #[error("The pet is not available for adoption")]
    PetNotAvailable,
    #[error("A pet cannot be adopted by its own owner")]
    SelfAdoption,
    #[error("The adoption could not be processed")]
    CreationFailed,
}

impl AdoptionError {
    fn name(self) -> &'static str {
        match self {
            AdoptionError::NotFound => "AdoptionNotFoundError",
            AdoptionError::AlreadyExists => "AdoptionExistsError",
            AdoptionError::UserNotFound
            | AdoptionError::PetNotFound
            | AdoptionError::PetNotAvailable
            | AdoptionError::SelfAdoption => "AdoptionValidationError",
            AdoptionError::CreationFailed => "AdoptionCreationError",
        }
    }

    fn status(self) -> StatusCode {
        match self {
            AdoptionError::NotFound
            | AdoptionError::UserNotFound
            | AdoptionError::PetNotFound => StatusCode::NOT_FOUND,
            AdoptionError::AlreadyExists | AdoptionError::PetNotAvailable => StatusCode::CONFLICT,
            AdoptionError::SelfAdoption => StatusCode::BAD_REQUEST,
            AdoptionError::CreationFailed => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn cause(self) -> &'static str {
        match self {
            AdoptionError::NotFound => "No adoption exists with the given id",
            AdoptionError::AlreadyExists => "This user has already adopted this pet",
            AdoptionError::UserNotFound => "The user specified for the adoption does not exist",
            AdoptionError::PetNotFound => "The pet specified for the adoption does not exist",
            AdoptionError::PetNotAvailable => "The pet has already been adopted by another user",
            AdoptionError::SelfAdoption => "The user cannot adopt a pet they already own",
            AdoptionError::CreationFailed => "Internal error while processing the adoption",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Missing mandatory fields")]
    RequiredFieldsMissing,
    #[error("Invalid id format")]
    InvalidIdFormat,
    #[error("Invalid request body")]
    InvalidRequestBody,
    #[error("Invalid query parameters")]
    InvalidQueryParams,
}

impl ValidationError {
    fn name(self) -> &'static str {
        "ValidationError"
    }

    fn status(self) -> StatusCode {
        StatusCode::BAD_REQUEST
    }

    fn cause(self) -> &'static str {
        match self {
            ValidationError::RequiredFieldsMissing => "Not all required fields were provided",
            ValidationError::InvalidIdFormat => "The given id is not a valid UUID",
            ValidationError::InvalidRequestBody => "The JSON body of the request is not valid",
            ValidationError::InvalidQueryParams => "The URL parameters are not valid",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum DatabaseError {
    #[error("Database connection error")]
    ConnectionError,
    #[error("Database operation error")]
    OperationFailed,
    #[error("Duplicate value detected")]
    DuplicateKey,
    #[error("Database transaction error")]
    TransactionFailed,
}

impl DatabaseError {
    fn name(self) -> &'static str {
        match self {
            DatabaseError::ConnectionError => "DatabaseConnectionError",
            DatabaseError::OperationFailed => "DatabaseOperationError",
            DatabaseError::DuplicateKey => "DatabaseDuplicateError",
            DatabaseError::TransactionFailed => "DatabaseTransactionError",
        }
    }

    fn status(self) -> StatusCode {
        match self {
            DatabaseError::ConnectionError => StatusCode::SERVICE_UNAVAILABLE,
            DatabaseError::DuplicateKey => StatusCode::CONFLICT,
            DatabaseError::OperationFailed | DatabaseError::TransactionFailed => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    fn cause(self) -> &'static str {
        match self {
            DatabaseError::ConnectionError => "A connection to the database could not be established",
            DatabaseError::OperationFailed => "The database operation failed",
            DatabaseError::DuplicateKey => "The value already exists in the database",
            DatabaseError::TransactionFailed => "The transaction could not complete",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ServerError {
    #[error("Internal server error")]
    Internal,
    #[error("Service temporarily unavailable")]
    ServiceUnavailable,
    #[error("Request timed out")]
    Timeout,
    #[error("Request limit exceeded")]
    RateLimitExceeded,
}

impl ServerError {
    fn name(self) -> &'static str {
        match self {
            ServerError::Internal => "InternalServerError",
            ServerError::ServiceUnavailable => "ServiceUnavailableError",
            ServerError::Timeout => "TimeoutError",
            ServerError::RateLimitExceeded => "RateLimitError",
        }
    }

    fn status(self) -> StatusCode {
        match self {
            ServerError::Internal => StatusCode::INTERNAL_SERVER_ERROR,
            ServerError::ServiceUnavailable => StatusCode::SERVICE_UNAVAILABLE,
            ServerError::Timeout => StatusCode::REQUEST_TIMEOUT,
            ServerError::RateLimitExceeded => StatusCode::TOO_MANY_REQUESTS,
        }
    }

    fn cause(self) -> &'static str {
        match self {
            ServerError::Internal => "An unexpected internal error occurred",
            ServerError::ServiceUnavailable => "The service is not available right now",
            ServerError::Timeout => "The operation took too long to complete",
            ServerError::RateLimitExceeded => "Too many requests were made in a short time",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum FileError {
    #[error("Failed to upload the file")]
    UploadFailed,
    #[error("The file is too large")]
    FileTooLarge,
    #[error("File type not allowed")]
    InvalidFileType,
    #[error("File not found")]
    NotFound,
}

impl FileError {
    fn name(self) -> &'static str {
        match self {
            FileError::UploadFailed => "FileUploadError",
            FileError::FileTooLarge => "FileSizeError",
            FileError::InvalidFileType => "FileTypeError",
            FileError::NotFound => "FileNotFoundError",
        }
    }

    fn status(self) -> StatusCode {
        match self {
            FileError::UploadFailed => StatusCode::INTERNAL_SERVER_ERROR,
            FileError::FileTooLarge => StatusCode::PAYLOAD_TOO_LARGE,
            FileError::InvalidFileType => StatusCode::BAD_REQUEST,
            FileError::NotFound => StatusCode::NOT_FOUND,
        }
    }

    fn cause(self) -> &'static str {
        match self {
            FileError::UploadFailed => "The file upload could not be processed",
            FileError::FileTooLarge => "The file size exceeds the allowed limit",
            FileError::InvalidFileType => "The file type is not permitted",
            FileError::NotFound => "The specified file does not exist",
        }
    }
}

/// One kind per taxonomy category, exhaustively matched at the HTTP boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ErrorKind {
    #[error(transparent)]
    Auth(#[from] AuthError),
    #[error(transparent)]
    User(#[from] UserError),
    #[error(transparent)]
    Pet(#[from] PetError),
    #[error(transparent)]
    Adoption(#[from] AdoptionError),
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Database(#[from] DatabaseError),
    #[error(transparent)]
    Server(#[from] ServerError),
    #[error(transparent)]
    File(#[from] FileError),
}

impl ErrorKind {
    fn name(self) -> &'static str {
        match self {
            ErrorKind::Auth(e) => e.name(),
            ErrorKind::User(e) => e.name(),
            ErrorKind::Pet(e) => e.name(),
            ErrorKind::Adoption(e) => e.name(),
            ErrorKind::Validation(e) => e.name(),
            ErrorKind::Database(e) => e.name(),
            ErrorKind::Server(e) => e.name(),
            ErrorKind::File(e) => e.name(),
        }
    }

    fn status(self) -> StatusCode {
        match self {
            ErrorKind::Auth(e) => e.status(),
            ErrorKind::User(e) => e.status(),
            ErrorKind::Pet(e) => e.status(),
            ErrorKind::Adoption(e) => e.status(),
            ErrorKind::Validation(e) => e.status(),
            ErrorKind::Database(e) => e.status(),
            ErrorKind::Server(e) => e.status(),
            ErrorKind::File(e) => e.status(),
        }
    }

    fn default_cause(self) -> &'static str {
        match self {
            ErrorKind::Auth(e) => e.cause(),
            ErrorKind::User(e) => e.cause(),
            ErrorKind::Pet(e) => e.cause(),
            ErrorKind::Adoption(e) => e.cause(),
            ErrorKind::Validation(e) => e.cause(),
            ErrorKind::Database(e) => e.cause(),
            ErrorKind::Server(e) => e.cause(),
            ErrorKind::File(e) => e.cause(),
        }
    }
}

/// A taxonomy kind plus an optional cause override for diagnostics.
///
/// The public `message` is always the fixed one from the catalog; store or
/// driver detail only ever travels in `cause`.
#[derive(Debug, Clone, Error)]
#[error("{kind}")]
pub struct ApiError {
    kind: ErrorKind,
    cause: Option<String>,
}

impl ApiError {
    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    pub fn name(&self) -> &'static str {
        self.kind.name()
    }

    pub fn status(&self) -> StatusCode {
        self.kind.status()
    }

    pub fn cause(&self) -> String {
        self.cause
            .clone()
            .unwrap_or_else(|| self.kind.default_cause().to_string())
    }

    pub fn with_cause(mut self, cause: impl Into<String>) -> Self {
        self.cause = Some(cause.into());
        self
    }

    fn body(&self) -> ErrorBody {
        ErrorBody {
            name: self.name(),
            message: self.kind.to_string(),
            cause: self.cause(),
        }
    }
}

impl From<ErrorKind> for ApiError {
    fn from(kind: ErrorKind) -> Self {
        ApiError { kind, cause: None }
    }
}

impl From<AuthError> for ApiError {
    fn from(e: AuthError) -> Self {
        ErrorKind::from(e).into()
    }
}

impl From<UserError> for ApiError {
    fn from(e: UserError) -> Self {
        ErrorKind::from(e).into()
    }
}

impl From<PetError> for ApiError {
    fn from(e: PetError) -> Self {
        ErrorKind::from(e).into()
    }
}

impl From<AdoptionError> for ApiError {
    fn from(e: AdoptionError) -> Self {
        ErrorKind::from(e).into()
    }
}

impl From<ValidationError> for ApiError {
    fn from(e: ValidationError) -> Self {
        ErrorKind::from(e).into()
    }
}

impl From<DatabaseError> for ApiError {
    fn from(e: DatabaseError) -> Self {
        ErrorKind::from(e).into()
    }
}

impl From<ServerError> for ApiError {
    fn from(e: ServerError) -> Self {
        ErrorKind::from(e).into()
    }
}

impl From<FileError> for ApiError {
    fn from(e: FileError) -> Self {
        ErrorKind::from(e).into()
    }
}

/// Malformed JSON bodies never reach a handler; the extractor rejection is
/// folded into the taxonomy so the client still gets the envelope.
impl From<JsonRejection> for ApiError {
    fn from(rej: JsonRejection) -> Self {
        ApiError::from(ValidationError::InvalidRequestBody).with_cause(rej.body_text())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rej: QueryRejection) -> Self {
        ApiError::from(ValidationError::InvalidQueryParams).with_cause(rej.body_text())
    }
}

/// Maps driver errors onto the closest taxonomy entry. The driver message is
/// kept only in `cause`, never as the public message.
impl From<sqlx::Error> for ApiError {
    fn from(e: sqlx::Error) -> Self {
        match &e {
            sqlx::Error::Database(db) if db.is_unique_violation() => {
                ApiError::from(DatabaseError::DuplicateKey).with_cause(db.message().to_string())
            }
            sqlx::Error::RowNotFound => {
                ApiError::from(DatabaseError::OperationFailed).with_cause("row not found")
            }
            sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed => {
                ApiError::from(DatabaseError::ConnectionError).with_cause(e.to_string())
            }
            _ => ApiError::from(ServerError::Internal).with_cause(e.to_string()),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ErrorBody {
    pub name: &'static str,
    pub message: String,
    pub cause: String,
}

fn envelope(body: &ErrorBody, path: &str) -> serde_json::Value {
    let timestamp = OffsetDateTime::now_utc()
        .format(&Rfc3339)
        .unwrap_or_default();
    serde_json::json!({
        "success": false,
        "error": {
            "name": body.name,
            "message": body.message,
            "cause": body.cause,
            "timestamp": timestamp,
            "path": path,
        }
    })
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = self.body();
        tracing::warn!(name = body.name, message = %body.message, %status, "request failed");
        // The envelope middleware re-renders this with the request path.
        let mut res = (status, Json(envelope(&body, ""))).into_response();
        res.extensions_mut().insert(body);
        res
    }
}

/// Boundary translator: fills the request path into the error envelope so
/// every failure leaves as JSON with `{name, message, cause, timestamp, path}`.
pub async fn render_error_envelope(req: Request, next: Next) -> Response {
    let path = req.uri().path().to_string();
    let res = next.run(req).await;
    let Some(body) = res.extensions().get::<ErrorBody>().cloned() else {
        return res;
    };
    (res.status(), Json(envelope(&body, &path))).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn taxonomy_statuses_match_catalog() {
        assert_eq!(ApiError::from(AuthError::InvalidCredentials).status(), StatusCode::UNAUTHORIZED);
        assert_eq!(ApiError::from(AuthError::AccessDenied).status(), StatusCode::FORBIDDEN);
        assert_eq!(ApiError::from(UserError::AlreadyExists).status(), StatusCode::CONFLICT);
        assert_eq!(ApiError::from(UserError::NotFound).status(), StatusCode::NOT_FOUND);
        assert_eq!(ApiError::from(PetError::AlreadyAdopted).status(), StatusCode::CONFLICT);
        assert_eq!(ApiError::from(PetError::InvalidAge).status(), StatusCode::BAD_REQUEST);
        assert_eq!(ApiError::from(AdoptionError::SelfAdoption).status(), StatusCode::BAD_REQUEST);
        assert_eq!(ApiError::from(AdoptionError::PetNotAvailable).status(), StatusCode::CONFLICT);
        assert_eq!(ApiError::from(AdoptionError::CreationFailed).status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(ApiError::from(ValidationError::InvalidIdFormat).status(), StatusCode::BAD_REQUEST);
        assert_eq!(ApiError::from(DatabaseError::DuplicateKey).status(), StatusCode::CONFLICT);
        assert_eq!(ApiError::from(FileError::FileTooLarge).status(), StatusCode::PAYLOAD_TOO_LARGE);
    }

    #[test]
    fn taxonomy_names_match_catalog() {
        assert_eq!(ApiError::from(AuthError::SessionExpired).name(), "AuthenticationError");
        assert_eq!(ApiError::from(UserError::AlreadyExists).name(), "UserExistsError");
        assert_eq!(ApiError::from(UserError::WeakPassword).name(), "UserValidationError");
        assert_eq!(ApiError::from(PetError::AlreadyAdopted).name(), "PetNotAvailableError");
        assert_eq!(ApiError::from(AdoptionError::UserNotFound).name(), "AdoptionValidationError");
        assert_eq!(ApiError::from(AdoptionError::AlreadyExists).name(), "AdoptionExistsError");
        assert_eq!(ApiError::from(AdoptionError::NotFound).name(), "AdoptionNotFoundError");
        assert_eq!(ApiError::from(ServerError::Internal).name(), "InternalServerError");
    }

    #[test]
    fn cause_override_replaces_default() {
        let err = ApiError::from(AdoptionError::CreationFailed).with_cause("tx aborted");
        assert_eq!(err.cause(), "tx aborted");
        let err = ApiError::from(AdoptionError::CreationFailed);
        assert_eq!(err.cause(), "Internal error while processing the adoption");
    }

    #[test]
    fn sqlx_row_not_found_maps_to_operation_failed() {
        let err = ApiError::from(sqlx::Error::RowNotFound);
        assert_eq!(err.name(), "DatabaseOperationError");
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.cause(), "row not found");
    }

    #[test]
    fn envelope_shape_is_stable() {
        let body = ErrorBody {
            name: "PetValidationError",
            message: "Invalid birth date".into(),
            cause: "The birth date cannot be in the future".into(),
        };
        let value = envelope(&body, "/api/pets");
        assert_eq!(value["success"], false);
        assert_eq!(value["error"]["name"], "PetValidationError");
        assert_eq!(value["error"]["path"], "/api/pets");
        assert!(value["error"]["timestamp"].is_string());
    }

    #[test]
    fn into_response_sets_status_and_body_extension() {
        let res = ApiError::from(UserError::NotFound).into_response();
        assert_eq!(res.status(), StatusCode::NOT_FOUND);
        let body = res.extensions().get::<ErrorBody>().expect("body extension");
        assert_eq!(body.name, "UserNotFoundError");
    }
}
