//! CLI command implementations.

pub mod access;
pub mod api;
pub mod browser;
pub mod config;
