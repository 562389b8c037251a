//! Database access layer for checkscam-web

pub mod posts;
