//! Background work that must not hold up an HTTP response.

pub mod queue;

pub use queue::{PersistJob, PersistQueue, PersistQueueConfig};
