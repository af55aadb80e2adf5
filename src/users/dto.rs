use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Deserialize)]
pub struct UpdateUserRequest {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
}

impl UpdateUserRequest {
    pub fn is_empty(&self) -> bool {
        self.first_name.is_none() && self.last_name.is_none() && self.email.is_none()
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeletedUser {
    pub deleted_user_id: Uuid,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deleted_user_payload_is_camel_case() {
        let id = Uuid::new_v4();
        let json = serde_json::to_value(DeletedUser { deleted_user_id: id }).unwrap();
        assert_eq!(json["deletedUserId"], serde_json::json!(id));
    }

    #[test]
    fn empty_update_request_is_detected() {
        let req: UpdateUserRequest = serde_json::from_str("{}").unwrap();
        assert!(req.is_empty());
        let req: UpdateUserRequest = serde_json::from_str(r#"{"email":"a@b.com"}"#).unwrap();
        assert!(!req.is_empty());
    }
}
