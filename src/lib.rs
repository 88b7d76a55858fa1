//! intakeflow: formularios multi-paso con borradores y submit.
//!
//! Fachada sobre los crates del workspace:
//! - `engine` (intake-core): definición, máquina de estados y sesión.
//! - `domain` (intake-domain): objetos de negocio ensamblados.
//! - `adapters` (intake-adapters): flujos concretos y submit HTTP.
//! - `persistence` (intake-persistence, feature `postgres`): borradores en
//!   Postgres.
pub mod autosave;
pub mod config;
pub mod errors;

pub use intake_adapters as adapters;
pub use intake_core as engine;
pub use intake_domain as domain;
#[cfg(feature = "postgres")]
pub use intake_persistence as persistence;

pub use autosave::{spawn_autosave, AutosaveDriver, AutosaveSummary};
pub use config::{AppConfig, CONFIG};
pub use errors::{CoreError, DomainError};

pub mod prelude {
    pub use crate::adapters::{consultation_definition, medical_definition, ConsultationAssembler, HttpSubmitter,
                              MedicalAssembler};
    pub use crate::engine::{AutosaveOutcome, DraftStore, InMemoryDraftStore, SessionOptions, StepOutcome,
                            WizardMachine, WizardSession, WizardStatus};
    pub use crate::{spawn_autosave, AppConfig, CoreError};
}

/// Sesión lista para usar con la configuración dada.
pub fn open_session(definition: std::sync::Arc<engine::WizardDefinition>,
                    drafts: std::sync::Arc<dyn engine::DraftStore>,
                    config: &AppConfig)
                    -> engine::WizardSession {
    let machine = engine::WizardMachine::start(definition);
    engine::WizardSession::new(machine, drafts, config.session_options())
}
