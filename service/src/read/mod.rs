//! Read models computed over domain entities.
//!
//! Everything here is a pure projection: no I/O, no side effects.

pub mod analytics;
pub mod business;
pub mod platform;
