//! Questify Catalog Server Library
//!
//! Exposes the internal modules for the server and cli binaries.

pub mod catalog;
pub mod file_auth_store;
pub mod quest;
pub mod search;
pub mod server;

pub use file_auth_store::FileAuthStore;
pub use server::{run_server, RequestsLoggingLevel};
