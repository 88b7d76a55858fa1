//! Sesión async de un wizard.
//!
//! Una `WizardSession` por sesión de usuario. Las operaciones se serializan
//! con un `tokio::sync::Mutex` (cola FIFO); `autosave_tick` no espera: si la
//! sesión está ocupada, se salta el tick.

mod core;
mod options;

pub use core::{AutosaveOutcome, SessionAdvance, WizardSession};
pub use options::SessionOptions;
