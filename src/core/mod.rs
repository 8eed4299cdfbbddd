//! Core infrastructure: shared foundation used across the whole crate.
//!
//! - **config**: configuration loading and resolved types.
//! - **error**: application-wide error enum.
//! - **secret**: redacting wrapper for environment-sourced credentials.

pub mod config;
pub mod error;
pub mod secret;
