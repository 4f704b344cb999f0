use crate::state::AppState;
use axum::Router;

pub mod artifacts;
mod dto;
pub mod handlers;

pub use artifacts::InferenceState;

pub fn router() -> Router<AppState> {
    handlers::router()
}
