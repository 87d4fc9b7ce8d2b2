//! Configuration management for the quarry bootstrap processes.
//!
//! Provides environment detection, hierarchical configuration loading from
//! YAML files with environment-variable overrides, secret handling, and the
//! settings structs shared by the one-shot binaries.

mod environment;
mod load;
mod secret;
pub mod shared;

pub use environment::*;
pub use load::*;
pub use secret::*;
