//! # API Route Modules
//!
//! - `plugins`: plugin listing, single-proof verification, and single-output
//!   re-validation.
//! - `auth`: batch authentication and bundle re-validation, producing an
//!   `AuthenticationResult`.
//!
//! Plugin-specific auxiliary routes are not declared here; the host mounts
//! them under `/v1/plugins/{name}` (see [`crate::app`]).

pub mod auth;
pub mod plugins;
