//! Marker types.

/// Marker type describing an entity creation.
#[derive(Clone, Copy, Debug)]
pub struct Creation;

/// Marker type describing an expiration of something.
#[derive(Clone, Copy, Debug)]
pub struct Expiration;

/// Marker type describing an occurrence of an event.
#[derive(Clone, Copy, Debug)]
pub struct Occurrence;
