//! Infrastructure for the ACBO pilot: config file loading, filesystem paths
//! and the HTTP client for the RAG backend.

pub mod config_service;
pub mod http_backend;
pub mod paths;

pub use config_service::ConfigService;
pub use http_backend::HttpRagBackend;
pub use paths::AcboPaths;
