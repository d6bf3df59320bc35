use crate::render::render_index;
use crate::routes::{html_response, HttpResponse};
use crate::state::AppState;

/// `GET /`: the drawing page.
pub fn handle(state: &AppState) -> HttpResponse {
    html_response(render_index(&state.model))
}
