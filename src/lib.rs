pub mod config;
pub mod email;
pub mod flash;
pub mod observability;
pub mod routes;
pub mod template;

pub use routes::AppState;
