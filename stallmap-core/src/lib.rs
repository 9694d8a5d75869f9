// Lint configuration for this crate
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

//! # `StallMap` Core
//!
//! Core types, models, and traits shared by the `StallMap` crates.
//!
//! ## Key Types
//!
//! ### Session Types
//! - [`Credentials`] - Employee email and password (password never printed)
//! - [`SessionToken`] - Opaque bearer token returned by a login
//! - [`BaseUrl`] - Normalized service root used to build endpoint URLs
//! - [`AccessRequest`] - Everything a run needs before it authenticates
//!
//! ### Stall Types
//! - [`StallRecord`] - A single stall as returned by the stalls API
//! - [`StallMap`] - The ordered record sequence plus its raw JSON
//! - [`StallSummary`] - Total / reserved / available counts
//!
//! ### Traits
//! - [`CredentialSource`] - Where an [`AccessRequest`] comes from

pub mod error;
pub mod models;
pub mod traits;

pub use error::CoreError;

pub use models::{
    // Session types
    AccessRequest,
    BaseUrl,
    Credentials,
    SessionToken,
    // Stall types
    StallMap,
    StallRecord,
    StallSummary,
    // Defaults
    DEFAULT_BACKEND_URL,
    DEFAULT_FRONTEND_URL,
};

pub use traits::{CredentialSource, StaticSource};
