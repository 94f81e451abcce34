//! Built-in plugin implementations, selectable by `implementation` key.

pub mod merkle_memberships;
pub mod simple_password;
