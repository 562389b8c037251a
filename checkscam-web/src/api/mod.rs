//! HTTP API handlers for checkscam-web

pub mod auth;
pub mod feed;
pub mod health;
pub mod posts;
pub mod report;
pub mod search;
pub mod ui;

pub use auth::{login, logout, register, require_moderator, require_session};
pub use feed::fetch_feed;
pub use health::health_routes;
pub use posts::{approve_post, create_post, delete_post, get_post, list_pending, list_posts};
pub use report::submit_report;
pub use search::search;
pub use ui::{serve_app_js, serve_index};
