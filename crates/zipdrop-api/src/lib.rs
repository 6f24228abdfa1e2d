//! zipdrop API library
//!
//! HTTP shell around the upload relay: routes, the multipart adapter, error
//! rendering, telemetry and server startup.

pub mod error;
pub mod handlers;
pub mod multipart;
pub mod setup;
pub mod state;
pub mod telemetry;

pub use error::{ErrorResponse, HttpRelayError};
