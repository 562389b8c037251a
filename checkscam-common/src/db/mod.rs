//! Database models and queries

pub mod init;
pub mod models;
pub mod settings;
pub mod users;

pub use init::{create_schema, init_database};
pub use models::*;
