//! Request extractors that fail with taxonomy errors.
//!
//! axum's own `Json` and `Query` reject malformed input with a plain-text
//! response, which would bypass the JSON error envelope. These wrappers
//! convert the rejection into an [`ApiError`] so every failure leaves the
//! service in the same shape.

use axum::extract::{FromRequest, FromRequestParts, Request};
use axum::http::request::Parts;
use axum::response::{IntoResponse, Response};
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::ApiError;

/// `axum::Json`, with rejections mapped onto the error taxonomy.
#[derive(Debug, Clone, Copy, Default)]
pub struct Json<T>(pub T);

#[axum::async_trait]
impl<T, S> FromRequest<S> for Json<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let axum::Json(value) = axum::Json::<T>::from_request(req, state).await?;
        Ok(Json(value))
    }
}

impl<T: Serialize> IntoResponse for Json<T> {
    fn into_response(self) -> Response {
        axum::Json(self.0).into_response()
    }
}

/// `axum::extract::Query`, with rejections mapped onto the error taxonomy.
#[derive(Debug, Clone, Copy, Default)]
pub struct Query<T>(pub T);

#[axum::async_trait]
impl<T, S> FromRequestParts<S> for Query<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let axum::extract::Query(value) =
            axum::extract::Query::<T>::from_request_parts(parts, state).await?;
        Ok(Query(value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{header, Method, StatusCode};
    use serde::Deserialize;

    #[derive(Debug, Deserialize)]
    struct Quantities {
        users: i64,
    }

    #[tokio::test]
    async fn malformed_json_body_maps_to_validation_error() {
        let req = Request::builder()
            .method(Method::POST)
            .uri("/")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from("{not valid json"))
            .unwrap();

        let err = Json::<Quantities>::from_request(req, &())
            .await
            .unwrap_err();
        assert_eq!(err.name(), "ValidationError");
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);

        // The rejection renders through the envelope path like any ApiError.
        let res = err.into_response();
        assert!(res.extensions().get::<crate::error::ErrorBody>().is_some());
    }

    #[tokio::test]
    async fn bad_query_string_maps_to_validation_error() {
        let (mut parts, _) = Request::builder()
            .uri("/mocks/generatedata?users=abc")
            .body(Body::empty())
            .unwrap()
            .into_parts();

        let err = Query::<Quantities>::from_request_parts(&mut parts, &())
            .await
            .unwrap_err();
        assert_eq!(err.name(), "ValidationError");
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn well_formed_input_passes_through() {
        let req = Request::builder()
            .method(Method::POST)
            .uri("/")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(r#"{"users": 7}"#))
            .unwrap();

        let Json(value) = Json::<Quantities>::from_request(req, &()).await.unwrap();
        assert_eq!(value.users, 7);
    }
}
