//! Auth coordination services.
//!
//! SYSTEM CONTEXT
//! ==============
//! `coordinator` is the public entry point; `lock`, `cache` and `requests`
//! are its building blocks and only touch storage or in-memory state.

pub mod cache;
pub mod coordinator;
pub mod lock;
pub mod requests;

#[cfg(test)]
pub(crate) mod test_support;
