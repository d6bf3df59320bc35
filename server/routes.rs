use std::io::{Cursor, Read};

use serde::Serialize;
use tiny_http::{Header, Method, Request, Response, StatusCode};
use tracing::{debug, warn};

use crate::handlers;
use crate::state::AppState;

/// Every handler answers with an in-memory body, JSON or HTML.
pub type HttpResponse = Response<Cursor<Vec<u8>>>;

// ---------------------------------------------------------------------------
// Response helpers
// ---------------------------------------------------------------------------

/// Serializes `body` and wraps it in a response with the given status.
pub fn json_response<T: Serialize>(status: u16, body: &T) -> HttpResponse {
    let bytes = serde_json::to_vec(body).unwrap_or_else(|_| b"{}".to_vec());
    let len = bytes.len();
    Response::new(
        StatusCode(status),
        vec![content_type(b"application/json")],
        Cursor::new(bytes),
        Some(len),
        None,
    )
}

pub fn html_response(body: String) -> HttpResponse {
    let bytes = body.into_bytes();
    let len = bytes.len();
    Response::new(
        StatusCode(200),
        vec![content_type(b"text/html; charset=utf-8")],
        Cursor::new(bytes),
        Some(len),
        None,
    )
}

pub fn error_response(status: u16, message: &str) -> HttpResponse {
    json_response(status, &serde_json::json!({ "error": message }))
}

pub fn not_found() -> HttpResponse {
    error_response(404, "Not found.")
}

fn content_type(value: &[u8]) -> Header {
    Header::from_bytes(&b"Content-Type"[..], value).expect("static header is valid")
}

// ---------------------------------------------------------------------------
// Request dispatcher
// ---------------------------------------------------------------------------

/// Routes a request to its handler and sends the response.
pub fn dispatch(mut request: Request, state: &AppState) {
    let method = request.method().clone();
    let path = request.url().split('?').next().unwrap_or("").to_owned();
    debug!(%method, %path, "request");

    let response = match (&method, path.as_str()) {
        (Method::Get, "/") => handlers::index::handle(state),
        (Method::Get, "/health") => handlers::health::handle(),
        (Method::Post, "/predict") => {
            let mut body = Vec::new();
            match request.as_reader().read_to_end(&mut body) {
                Ok(_) => handlers::predict::handle(&body, state),
                Err(e) => {
                    warn!(error = %e, "failed to read request body");
                    error_response(400, "Missing 'pixels' field.")
                }
            }
        }
        _ => not_found(),
    };

    if let Err(e) = request.respond(response) {
        warn!(error = %e, %path, "failed to send response");
    }
}
