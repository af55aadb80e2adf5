use std::net::SocketAddr;

use axum::{middleware, routing::get, Router};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::state::AppState;
use crate::{adoptions, error, mocks, pets, sessions, users};

pub fn build_app(state: AppState) -> Router {
    let api = Router::new()
        .merge(users::router())
        .merge(pets::router())
        .merge(adoptions::router())
        .merge(sessions::router(&state.config))
        .merge(mocks::router());

    Router::new()
        .nest("/api", api)
        .route("/health", get(|| async { "ok" }))
        .with_state(state)
        .layer(middleware::from_fn(error::render_error_envelope))
        .layer(CorsLayer::permissive())
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|req: &axum::http::Request<_>| {
                    let method = req.method().clone();
                    let uri = req.uri().clone();
                    tracing::info_span!("http_request", %method, uri = %uri)
                })
                .on_response(
                    |res: &axum::http::Response<_>,
                     _latency: std::time::Duration,
                     span: &tracing::Span| {
                        let status = res.status();
                        span.record("status", tracing::field::display(status));
                        if status.is_server_error() {
                            tracing::error!(%status, "response");
                        } else {
                            tracing::info!(%status, "response");
                        }
                    },
                ),
        )
}

pub async fn serve(app: Router) -> anyhow::Result<()> {
    let addr: SocketAddr = format!(
        "{}:{}",
        std::env::var("APP_HOST").unwrap_or_else(|_| "0.0.0.0".into()),
        std::env::var("APP_PORT").unwrap_or_else(|_| "8080".into())
    )
    .parse()?;

    tracing::info!("listening on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{to_bytes, Body};
    use axum::http::{header, Method, Request, StatusCode};
    use tower::ServiceExt;

    async fn body_json(res: axum::response::Response) -> serde_json::Value {
        let bytes = to_bytes(res.into_body(), usize::MAX).await.expect("read body");
        serde_json::from_slice(&bytes).expect("json body")
    }

    #[tokio::test]
    async fn malformed_json_body_gets_the_error_envelope() {
        let app = build_app(AppState::fake());
        let req = Request::builder()
            .method(Method::POST)
            .uri("/api/pets")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from("{not valid json"))
            .unwrap();

        let res = app.oneshot(req).await.expect("request");
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
        let json = body_json(res).await;
        assert_eq!(json["success"], false);
        assert_eq!(json["error"]["name"], "ValidationError");
        assert_eq!(json["error"]["path"], "/api/pets");
        assert!(json["error"]["timestamp"].is_string());
    }

    #[tokio::test]
    async fn bad_query_params_get_the_error_envelope() {
        let app = build_app(AppState::fake());
        let req = Request::builder()
            .method(Method::POST)
            .uri("/api/mocks/generatedata?users=abc")
            .body(Body::empty())
            .unwrap();

        let res = app.oneshot(req).await.expect("request");
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
        let json = body_json(res).await;
        assert_eq!(json["success"], false);
        assert_eq!(json["error"]["name"], "ValidationError");
    }

    #[tokio::test]
    async fn oversized_image_upload_is_reported_as_too_large() {
        let app = build_app(AppState::fake());

        let boundary = "pet-image-upload-test";
        let mut body = Vec::new();
        body.extend_from_slice(
            format!(
                "--{boundary}\r\nContent-Disposition: form-data; name=\"image\"; \
                 filename=\"big.png\"\r\nContent-Type: image/png\r\n\r\n"
            )
            .as_bytes(),
        );
        body.extend_from_slice(&vec![0u8; 6 * 1024 * 1024]);
        body.extend_from_slice(format!("\r\n--{boundary}--\r\n").as_bytes());

        let req = Request::builder()
            .method(Method::POST)
            .uri("/api/pets/image")
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={boundary}"),
            )
            .body(Body::from(body))
            .unwrap();

        let res = app.oneshot(req).await.expect("request");
        assert_eq!(res.status(), StatusCode::PAYLOAD_TOO_LARGE);
        let json = body_json(res).await;
        assert_eq!(json["success"], false);
        assert_eq!(json["error"]["name"], "FileSizeError");
    }
}
