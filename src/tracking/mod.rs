// Event tracking
//
// Team domain events are turned into flat tracking events and handed to a
// backend; the database backend writes them to the legacy tracking log.

pub mod backend;
pub mod emitter;

pub use backend::{DatabaseBackend, TrackingBackend};
pub use emitter::{TeamEventEmitter, TrackerEventEmitter};
