//! Document domain.
//!
//! - [`entities::Document`]: a backend-tracked file and its [`entities::DocumentStatus`]
//! - [`format::DocumentFormat`]: the fixed set of uploadable formats
//! - [`listing::DocumentListing`]: a de-duplicated `list()` response

pub mod entities;
pub mod format;
pub mod listing;
