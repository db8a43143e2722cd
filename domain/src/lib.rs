//! Domain layer for compend
//!
//! This crate contains the core entities and value objects of the document
//! session client. It has no dependencies on infrastructure or presentation
//! concerns and performs no I/O.
//!
//! # Core Concepts
//!
//! ## Documents
//!
//! A [`Document`] is a file the backend tracks by name, together with its
//! ingestion [`DocumentStatus`]:
//!
//! ```text
//! uploading (client only) ─▶ processing ─▶ completed
//!                                      └─▶ error: <detail>
//! ```
//!
//! ## Exchanges
//!
//! A [`Question`] is validated non-empty text; [`AskState`] tracks the single
//! question slot of a client (`idle → pending → answered | errored`).
//!
//! ## Access gate
//!
//! [`AccessGate`] compares a key with a shared secret. It is a convenience
//! gate for the UI, not a security boundary.

pub mod access;
pub mod config;
pub mod core;
pub mod document;
pub mod exchange;

// Re-export commonly used types
pub use access::{AccessGate, DEFAULT_ACCESS_KEY, SessionRecord};
pub use config::{ConfigIssue, ConfigIssueCode, OutputFormat, Severity};
pub use core::{error::DomainError, question::Question};
pub use document::{
    entities::{Document, DocumentStatus},
    format::DocumentFormat,
    listing::{DocumentListing, DocumentRow, build_rows},
};
pub use exchange::{Answer, AskState, PENDING_PLACEHOLDER};
