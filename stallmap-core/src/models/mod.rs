//! Domain models for `StallMap`.
//!
//! ## Submodules
//!
//! - [`session`] - Login inputs and outputs (Credentials, SessionToken, BaseUrl)
//! - [`stall`] - Stall records as served by the employee stalls API

mod session;
mod stall;

pub use session::{
    AccessRequest, BaseUrl, Credentials, SessionToken, DEFAULT_BACKEND_URL, DEFAULT_FRONTEND_URL,
};
pub use stall::{StallMap, StallRecord, StallSummary};
