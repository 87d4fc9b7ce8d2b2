//! Thin client SDK for the data catalog HTTP API.
//!
//! Covers the two calls the harvesters make: publishing a dataset and
//! linking a resource to a published dataset. Everything else the catalog
//! offers is out of scope; the API itself is an external collaborator.

mod client;
mod types;

pub use client::*;
pub use types::*;
