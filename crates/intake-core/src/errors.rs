//! Errores del motor de wizards.
//!
//! Los resultados de validación no son errores: `go_next` los devuelve como
//! valor dentro de `StepOutcome`. Aquí viven las fallas de configuración,
//! de estado, de persistencia, de ensamblado y de submit.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::state::WizardStatus;
use crate::step::StepId;
use crate::validation::ValidationResult;

/// Definición de wizard mal construida. Fatal al arrancar la aplicación.
#[derive(Debug, Error, PartialEq, Eq, Clone)]
pub enum ConfigurationError {
    #[error("wizard definition has no steps")]
    EmptyDefinition,
    #[error("duplicate step id: {0}")]
    DuplicateStepId(StepId),
    #[error("step at position {0} has an empty id")]
    EmptyStepId(usize),
}

/// Falla del backend de borradores. Nunca interrumpe la navegación.
#[derive(Debug, Error, PartialEq, Eq, Clone, Serialize, Deserialize)]
pub enum PersistenceError {
    #[error("draft serialization failed: {0}")]
    Serialization(String),
    #[error("draft store unavailable: {0}")]
    Unavailable(String),
    #[error("draft store error: {0}")]
    Backend(String),
}

impl From<serde_json::Error> for PersistenceError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

/// Submit intentado sin datos suficientes o con datos incoherentes entre
/// pasos. Recuperable: la UI lleva al usuario al primer paso faltante.
#[derive(Debug, Error, PartialEq, Eq, Clone)]
pub enum AssemblyError {
    #[error("wizard incomplete, missing required steps: {}", .missing.join(", "))]
    IncompleteWizard { missing: Vec<StepId> },
    #[error("payload of step {step_id} could not be decoded: {reason}")]
    Decode { step_id: StepId, reason: String },
    #[error("cross-step validation failed on {} field(s)", .0.error_count())]
    CrossStep(ValidationResult),
    #[error("assembly failed: {0}")]
    Merge(String),
}

impl AssemblyError {
    /// Primer paso requerido que falta, si el error es de completitud.
    pub fn first_missing_step(&self) -> Option<&str> {
        match self {
            Self::IncompleteWizard { missing } => missing.first().map(String::as_str),
            _ => None,
        }
    }
}

/// Falla del colaborador externo de submit. El wizard sigue editable.
#[derive(Debug, Error, PartialEq, Clone)]
pub enum SubmissionError {
    #[error("submission rejected with status {status}: {error}")]
    Rejected {
        status: u16,
        error: String,
        details: Option<serde_json::Value>,
    },
    #[error("submission transport failed: {0}")]
    Transport(String),
    #[error("submission body could not be encoded: {0}")]
    Encode(String),
}

/// Error paraguas de las operaciones del motor.
#[derive(Debug, Error)]
pub enum WizardError {
    #[error("{operation} not allowed: wizard is {status}")]
    InvalidState { operation: &'static str, status: WizardStatus },
    #[error("unknown step: {0}")]
    UnknownStep(StepId),
    #[error("step {0} is locked")]
    StepLocked(StepId),
    #[error("{operation} timed out after {after_ms}ms")]
    Timeout { operation: &'static str, after_ms: u64 },
    #[error(transparent)]
    Configuration(#[from] ConfigurationError),
    #[error(transparent)]
    Persistence(#[from] PersistenceError),
    #[error(transparent)]
    Assembly(#[from] AssemblyError),
    #[error(transparent)]
    Submission(#[from] SubmissionError),
}

impl WizardError {
    pub fn is_invalid_state(&self) -> bool {
        matches!(self, Self::InvalidState { .. })
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout { .. })
    }
}
