//! Domain model and state for the ACBO RAG pilot.
//!
//! Holds the application state store, the static scenario registry and the
//! data types shared by the execution, application and infrastructure crates.

pub mod auth;
pub mod backend;
pub mod config;
pub mod document;
pub mod error;
pub mod insight;
pub mod quality;
pub mod query;
pub mod registry;
pub mod scenario;
pub mod session;
pub mod store;
pub mod track;

// Re-export common types
pub use error::{AcboError, Result};
pub use registry::ScenarioRegistry;
pub use store::{AppState, AppStore};
