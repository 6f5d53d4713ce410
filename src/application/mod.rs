//! Application Layer
//!
//! Use cases that orchestrate the domain ports.

mod lookup_service;

pub use lookup_service::{LookupOptions, LookupService};
