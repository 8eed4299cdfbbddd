//! Bootstrap layer: modules that run before any command starts.
//!
//! - **logger**: tracing-subscriber initialisation.

pub mod logger;
