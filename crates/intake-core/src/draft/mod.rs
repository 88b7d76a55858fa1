//! Gateway de persistencia de borradores.
//!
//! El motor no asume tecnología de almacenamiento: llama a `DraftStore`
//! (por timer o por acción explícita) con un `DraftRecord`. Las fallas no
//! interrumpen el wizard en memoria.

mod record;
mod store;

pub use record::DraftRecord;
pub use store::{DraftStore, InMemoryDraftStore};
