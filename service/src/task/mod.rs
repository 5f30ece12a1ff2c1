//! Background [`Task`]s definitions.

mod background;
pub mod prune_events;

pub use common::Handler as Task;

pub use self::{background::Background, prune_events::PruneEvents};
