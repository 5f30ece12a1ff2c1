//! Report [`Query`]s.
//!
//! [`Query`]: crate::Query

pub mod analytics;
pub mod platform;

pub use self::{analytics::Analytics, platform::Platform};
