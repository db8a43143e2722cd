//! HTTP adapter for the document store and query facades.

mod backend;
mod wire;

pub use backend::HttpBackend;
