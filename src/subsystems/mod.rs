//! Subsystem modules for the agent.

pub mod agents;
pub mod extract;
pub mod search;
