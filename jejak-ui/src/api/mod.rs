//! HTTP API handlers for jejak-ui

pub mod auth;
pub mod health;
pub mod sse;
pub mod ui;
pub mod upload_workflow;

pub use auth::auth_routes;
pub use health::health_routes;
pub use sse::event_stream;
pub use ui::ui_routes;
pub use upload_workflow::upload_routes;
