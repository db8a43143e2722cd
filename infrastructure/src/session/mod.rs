//! Persistence of the client-local session flag.

mod file_store;

pub use file_store::FileSessionStore;
