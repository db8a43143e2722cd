//! Port definitions (interfaces for external adapters)
//!
//! Ports define the contracts that infrastructure adapters must implement,
//! plus the event type the application emits towards the presentation layer.

pub mod backend;
pub mod session_event;
pub mod session_store;
