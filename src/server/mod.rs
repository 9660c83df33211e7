//! Web UI and JSON API

pub mod api;
pub mod page;
