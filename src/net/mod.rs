//! Networking modules for the auth REST boundary.
//!
//! SYSTEM CONTEXT
//! ==============
//! `service` defines the boundary trait and error taxonomy, `api` implements
//! it over HTTP, and `types` defines the wire schema.

pub mod api;
pub mod service;
pub mod types;
