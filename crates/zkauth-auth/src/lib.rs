//! # zkauth-auth — Role and Authentication Mapping
//!
//! Consumes the plugin host's per-plugin results and produces one
//! [`AuthenticationResult`]: `None`, `Partial`, or `Full`, with the union of
//! roles earned by the plugins that verified.
//!
//! - `result.rs`: the result type and the status rule.
//! - `mapper.rs`: output -> roles, from configured rules or custom functions.
//! - `authenticator.rs`: authenticate a batch; re-validate an issued bundle.
//!
//! Nothing here persists state. Issued results are owned by the caller.

pub mod authenticator;
pub mod mapper;
pub mod result;

pub use authenticator::{Authenticator, OUTPUT_STALE};
pub use mapper::{RoleFn, RoleMapper};
pub use result::{AuthStatus, AuthenticatedOutput, AuthenticationResult};
