//! Shared client-side auth state.
//!
//! DESIGN
//! ======
//! `auth` holds the framework-agnostic store; `context` exposes it to Leptos
//! components as a signal.

pub mod auth;
pub mod context;
