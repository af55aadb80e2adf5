use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Registration body. Optional fields so that missing ones map to
/// RequiredFieldsMissing instead of a deserialization rejection.
#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct RegisteredUser {
    pub id: Uuid,
    pub email: String,
    pub name: String,
}

/// Public part of the user returned on login.
#[derive(Debug, Serialize)]
pub struct SessionUser {
    pub name: String,
    pub email: String,
    pub role: String,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub success: bool,
    pub user: SessionUser,
}

#[derive(Debug, Serialize)]
pub struct SessionClosed {
    pub success: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn login_response_shape() {
        let res = LoginResponse {
            success: true,
            user: SessionUser {
                name: "Ana Gomez".into(),
                email: "ana@test.com".into(),
                role: "user".into(),
            },
        };
        let json = serde_json::to_value(&res).unwrap();
        assert_eq!(json["success"], true);
        assert_eq!(json["user"]["role"], "user");
        assert!(json.get("payload").is_none());
    }

    #[test]
    fn register_request_tolerates_missing_fields() {
        let req: RegisterRequest = serde_json::from_str(r#"{"email":"a@b.com"}"#).unwrap();
        assert_eq!(req.email.as_deref(), Some("a@b.com"));
        assert!(req.password.is_none());
    }
}
