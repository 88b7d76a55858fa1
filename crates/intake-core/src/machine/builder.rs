//! Builder para `WizardMachine`.
//!
//! ```ignore
//! let machine = WizardMachine::builder(definition)
//!     .clock(Arc::new(SystemClock))
//!     .resume_from(draft)
//!     .build();
//! ```

use std::sync::Arc;
use uuid::Uuid;

use crate::clock::{Clock, SystemClock};
use crate::draft::DraftRecord;
use crate::event::{EventStore, InMemoryEventStore};
use crate::machine::WizardMachine;
use crate::registry::WizardDefinition;

pub struct MachineBuilder {
    definition: Arc<WizardDefinition>,
    wizard_id: Option<Uuid>,
    clock: Arc<dyn Clock>,
    event_store: Box<dyn EventStore>,
    draft: Option<DraftRecord>,
}

impl MachineBuilder {
    pub(crate) fn new(definition: Arc<WizardDefinition>) -> Self {
        Self { definition,
               wizard_id: None,
               clock: Arc::new(SystemClock),
               event_store: Box::new(InMemoryEventStore::default()),
               draft: None }
    }

    /// Id explícito para un wizard nuevo. Ignorado si se reanuda un borrador.
    pub fn wizard_id(mut self, wizard_id: Uuid) -> Self {
        self.wizard_id = Some(wizard_id);
        self
    }

    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn event_store(mut self, store: impl EventStore + 'static) -> Self {
        self.event_store = Box::new(store);
        self
    }

    /// Reconstruye el estado desde un borrador guardado.
    pub fn resume_from(mut self, draft: DraftRecord) -> Self {
        self.draft = Some(draft);
        self
    }

    pub fn build(self) -> WizardMachine {
        match self.draft {
            Some(draft) => WizardMachine::resumed(self.definition, draft, self.clock, self.event_store),
            None => {
                let id = self.wizard_id.unwrap_or_else(Uuid::new_v4);
                WizardMachine::fresh(self.definition, id, self.clock, self.event_store)
            }
        }
    }
}
