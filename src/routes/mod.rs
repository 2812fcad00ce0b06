use axum::extract::FromRef;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::Router;
use axum_extra::extract::cookie::Key;

mod health;
mod index;
mod send_message;

use crate::template::{self, NotFoundTemplate};

#[derive(Clone)]
pub struct AppState {
    pub mailer: crate::email::Mailer,
    pub key: Key,
}

impl AppState {
    /// Build the shared state injected into every handler: the prebuilt
    /// mailer plus the cookie signing key derived from the session secret.
    pub fn new(config: &crate::config::Config, mailer: crate::email::Mailer) -> Self {
        // Config::validate guarantees the secret is long enough to derive from.
        let key = Key::derive_from(config.session.secret.as_bytes());
        Self { mailer, key }
    }
}

impl FromRef<AppState> for Key {
    fn from_ref(state: &AppState) -> Self {
        state.key.clone()
    }
}

pub async fn fallback() -> impl IntoResponse {
    (StatusCode::NOT_FOUND, template::render(NotFoundTemplate))
}

pub fn router(app_state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health))
        .route("/", get(index::page))
        .route("/send_message", post(send_message::action))
        .fallback(fallback)
        .with_state(app_state)
}
