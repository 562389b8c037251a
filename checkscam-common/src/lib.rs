//! # CheckScam Common Library
//!
//! Shared code for the CheckScam service:
//! - Database initialization, models and settings accessors
//! - User and session management
//! - Phone normalization and risk classification core
//! - Configuration loading

pub mod config;
pub mod db;
pub mod error;
pub mod phone;

pub use error::{Error, Result};
