//! Tipos de evento del wizard y estructura `WizardEvent`.
//!
//! Cada transición aceptada por `WizardMachine` emite un evento a un
//! `EventStore` append-only. Las operaciones rechazadas sobre un wizard
//! terminal no emiten nada.
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::step::StepId;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum WizardEventKind {
    /// Primer evento de un wizard nuevo.
    WizardStarted { definition_hash: String, step_count: usize },
    /// Wizard reconstruido desde un borrador.
    WizardResumed {
        current_step_id: StepId,
        completed_steps: Vec<StepId>,
        draft_saved_at: DateTime<Utc>,
    },
    /// Payload válido guardado para el paso. `payload_hash` identifica el
    /// contenido sin copiarlo al journal.
    StepCompleted { step_id: StepId, payload_hash: String },
    /// `go_next` con payload inválido; el estado no cambió.
    StepRejected { step_id: StepId, error_fields: Vec<String> },
    NavigatedBack { from: StepId, to: StepId },
    JumpedTo { from: StepId, to: StepId },
    DraftSaved { saved_at: DateTime<Utc> },
    DraftSaveFailed { reason: String },
    SubmissionFailed { reason: String },
    /// Cierre con el fingerprint del objeto enviado.
    WizardSubmitted { fingerprint: String },
    WizardAbandoned,
}

impl WizardEventKind {
    /// Nombre de la variante, para logging.
    pub fn name(&self) -> &'static str {
        match self {
            WizardEventKind::WizardStarted { .. } => "WizardStarted",
            WizardEventKind::WizardResumed { .. } => "WizardResumed",
            WizardEventKind::StepCompleted { .. } => "StepCompleted",
            WizardEventKind::StepRejected { .. } => "StepRejected",
            WizardEventKind::NavigatedBack { .. } => "NavigatedBack",
            WizardEventKind::JumpedTo { .. } => "JumpedTo",
            WizardEventKind::DraftSaved { .. } => "DraftSaved",
            WizardEventKind::DraftSaveFailed { .. } => "DraftSaveFailed",
            WizardEventKind::SubmissionFailed { .. } => "SubmissionFailed",
            WizardEventKind::WizardSubmitted { .. } => "WizardSubmitted",
            WizardEventKind::WizardAbandoned => "WizardAbandoned",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WizardEvent {
    pub seq: u64,
    pub wizard_id: Uuid,
    pub kind: WizardEventKind,
    pub ts: DateTime<Utc>,
}
