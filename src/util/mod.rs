//! Utility helpers shared across the auth modules.
//!
//! SYSTEM CONTEXT
//! ==============
//! Utility modules isolate browser/environment concerns (storage, timers,
//! routing) from coordinator logic to improve reuse and testability.

pub mod auth;
pub mod clock;
pub mod storage;
