//! Use cases
//!
//! Application-level operations that orchestrate domain logic.

pub mod auth_gate;
pub mod poller;
pub mod refresh;
pub mod session_client;

#[cfg(test)]
pub(crate) mod test_support;
