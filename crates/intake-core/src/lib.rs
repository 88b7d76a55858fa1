//! intake-core: motor genérico de formularios multi-paso.
//!
//! Pasos ordenados con validación por campo, navegación con gating,
//! borradores persistibles y ensamblado final para submit.
pub mod clock;
pub mod constants;
pub mod draft;
pub mod errors;
pub mod event;
pub mod hashing;
pub mod machine;
pub mod merge;
pub mod registry;
pub mod session;
pub mod state;
pub mod step;
pub mod submission;
pub mod validation;

pub use clock::{Clock, FixedClock, SystemClock};
pub use draft::{DraftRecord, DraftStore, InMemoryDraftStore};
pub use errors::{AssemblyError, ConfigurationError, PersistenceError, SubmissionError, WizardError};
pub use event::{EventStore, InMemoryEventStore, WizardEvent, WizardEventKind};
pub use machine::{MachineBuilder, Progress, StepEntry, StepOutcome, WizardMachine};
pub use registry::{build_definition, DefinitionBuilder, WizardDefinition};
pub use session::{AutosaveOutcome, SessionAdvance, SessionOptions, WizardSession};
pub use state::{CapturedData, WizardState, WizardStatus};
pub use step::{StepId, StepSpec, StepState};
pub use submission::{assemble, Assembler, JsonAssembler, MergeMode, PreparedSubmission, SubmissionOutcome, SubmitReceipt,
                     Submitter};
pub use validation::{AcceptAll, FieldRule, Rule, StepSchema, StepValidator, ValidationContext, ValidationResult};
