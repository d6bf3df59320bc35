use crate::routes::{json_response, HttpResponse};

pub fn handle() -> HttpResponse {
    json_response(200, &serde_json::json!({ "status": "ok" }))
}
