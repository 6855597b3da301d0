use axum::Router;

use crate::state::AppState;

pub mod dto;
pub(crate) mod extractors;
pub mod handlers;
pub mod jwt;
pub mod password;
mod services;

pub fn router() -> Router<AppState> {
    handlers::router()
}
