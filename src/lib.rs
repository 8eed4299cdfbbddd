//! first-agent: a search-then-answer agent and a web page extractor.
//!
//! All credentials are read from the process environment (optionally via a
//! `.env` file); the TOML config only carries non-secret tuning.

pub mod bootstrap;
pub mod cli;
pub mod commands;
pub mod core;
pub mod llm;
pub mod subsystems;

pub use core::{config, error};

#[cfg(test)]
mod testutil;
