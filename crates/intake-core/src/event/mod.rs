//! Journal de eventos del wizard y trait EventStore.

mod store;
mod types;

pub use store::{EventStore, InMemoryEventStore};
pub use types::{WizardEvent, WizardEventKind};
