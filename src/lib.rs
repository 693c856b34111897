//! A local-first engine for tracking which city streets you have walked.
//!
//! Feed it a decoded street resource and a stream of position fixes; it
//! marks walked segments, persists them through a key-value store, and
//! serves filtered, distance-sorted completion views to a presentation
//! layer.

pub mod engine;
pub mod location;
pub mod model;
pub mod shared;
pub mod store;
pub mod streets;

pub use engine::{Change, Engine};
pub use shared::{Coordinate, Distance};
