//! Rendering of session client events

pub mod presenter;

pub use presenter::{EventPresenter, RowsDisplay, status_changes};
