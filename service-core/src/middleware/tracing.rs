use axum::http::{HeaderName, HeaderValue};
use axum::{extract::Request, middleware::Next, response::Response};
use uuid::Uuid;

pub static REQUEST_ID_HEADER: HeaderName = HeaderName::from_static("x-request-id");

/// Propagate the caller's request id, or mint one, and echo it on the
/// response so log lines can be correlated across services.
pub async fn request_id_middleware(mut req: Request, next: Next) -> Response {
    let request_id = match req.headers().get(&REQUEST_ID_HEADER) {
        Some(value) => value.clone(),
        None => {
            let minted = Uuid::new_v4().to_string();
            HeaderValue::from_str(&minted).unwrap_or(HeaderValue::from_static("-"))
        }
    };

    req.headers_mut()
        .insert(&REQUEST_ID_HEADER, request_id.clone());

    let mut response = next.run(req).await;
    response.headers_mut().insert(&REQUEST_ID_HEADER, request_id);
    response
}
