//! Test helpers for building the app with a stubbed mail transport.

#![allow(dead_code)]

use axum::Router;
use lettre::transport::stub::StubTransport;
use postbox::config::{Config, MailConfig, ObservabilityConfig, ServerConfig, SessionConfig};
use postbox::email::Mailer;
use postbox::routes::AppState;

pub fn test_config() -> Config {
    Config {
        server: ServerConfig {
            host: "127.0.0.1".to_string(),
            port: 3000,
        },
        mail: MailConfig {
            server: "localhost".to_string(),
            port: 1025,
            use_tls: false,
            use_ssl: false,
            username: String::new(),
            password: String::new(),
            default_sender: "noreply@postbox.test".to_string(),
            recipient: "operator@postbox.test".to_string(),
        },
        session: SessionConfig {
            secret: "test_secret_key_minimum_32_characters_long".to_string(),
        },
        observability: ObservabilityConfig::default(),
    }
}

pub struct TestApp {
    pub router: Router,
    /// Recording transport handle: every message the app "sends" lands here.
    pub outbox: StubTransport,
}

/// App wired to a recording mail transport.
pub fn test_app() -> TestApp {
    let config = test_config();
    let (mailer, outbox) = Mailer::stub(&config.mail).expect("stub mailer");
    let router = postbox::routes::router(AppState::new(&config, mailer));

    TestApp { router, outbox }
}

/// App whose mail transport rejects every message.
pub fn failing_app() -> Router {
    let config = test_config();
    let mailer = Mailer::failing(&config.mail).expect("failing mailer");

    postbox::routes::router(AppState::new(&config, mailer))
}
