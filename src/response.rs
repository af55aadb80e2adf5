use serde::Serialize;

/// Uniform success envelope: `{ "success": true, "payload": ... }`.
#[derive(Debug, Serialize)]
pub struct Success<T> {
    pub success: bool,
    pub payload: T,
}

impl<T> Success<T> {
    pub fn new(payload: T) -> Self {
        Self {
            success: true,
            payload,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn envelope_wraps_payload() {
        let json = serde_json::to_value(Success::new(vec![1, 2, 3])).unwrap();
        assert_eq!(json["success"], true);
        assert_eq!(json["payload"], serde_json::json!([1, 2, 3]));
    }
}
