//! Implementación de `WizardMachine`.

use log::{debug, warn};
use serde::Serialize;
use serde_json::Value;
use std::fmt;
use std::sync::Arc;
use uuid::Uuid;

use crate::clock::Clock;
use crate::constants::{DRAFT_FORMAT_VERSION, ROOT_FIELD};
use crate::draft::DraftRecord;
use crate::errors::{SubmissionError, WizardError};
use crate::event::{EventStore, WizardEvent, WizardEventKind};
use crate::hashing::hash_value;
use crate::machine::MachineBuilder;
use crate::registry::WizardDefinition;
use crate::state::{WizardState, WizardStatus};
use crate::step::{StepId, StepState};
use crate::submission::{assemble, Assembler, PreparedSubmission};
use crate::validation::{ValidationContext, ValidationResult};

/// Resultado de `go_next`.
#[derive(Debug, Clone, PartialEq)]
pub enum StepOutcome {
    /// Payload válido; el wizard avanzó a `to`.
    Advanced { to: StepId, validation: ValidationResult },
    /// Payload válido en el último paso. El paso actual no cambia.
    ReadyToSubmit { validation: ValidationResult },
    /// Payload inválido; estado intacto.
    Rejected { validation: ValidationResult },
}

impl StepOutcome {
    pub fn validation(&self) -> &ValidationResult {
        match self {
            StepOutcome::Advanced { validation, .. }
            | StepOutcome::ReadyToSubmit { validation }
            | StepOutcome::Rejected { validation } => validation,
        }
    }

    pub fn is_rejected(&self) -> bool {
        matches!(self, StepOutcome::Rejected { .. })
    }
}

/// Entrada de la grilla de navegación.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StepEntry {
    pub step_id: StepId,
    pub label: String,
    pub state: StepState,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Progress {
    pub completed: usize,
    pub total: usize,
}

impl Progress {
    /// Porcentaje entero (0..=100).
    pub fn percent(&self) -> u8 {
        if self.total == 0 {
            return 0;
        }
        ((self.completed * 100) / self.total) as u8
    }
}

/// Máquina de estados de un wizard.
///
/// `InProgress → Submitted | Abandoned`. Toda operación sobre un wizard
/// terminal devuelve `WizardError::InvalidState` sin tocar el estado ni el
/// journal.
pub struct WizardMachine {
    definition: Arc<WizardDefinition>,
    state: WizardState,
    event_store: Box<dyn EventStore>,
    clock: Arc<dyn Clock>,
    /// Se incrementa con cada cambio de estado; el autosave lo compara con
    /// la última revisión persistida.
    revision: u64,
}

impl fmt::Debug for WizardMachine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WizardMachine")
         .field("state", &self.state)
         .field("revision", &self.revision)
         .field("definition_hash", &self.definition.definition_hash())
         .finish_non_exhaustive()
    }
}

impl WizardMachine {
    #[inline]
    pub fn builder(definition: Arc<WizardDefinition>) -> MachineBuilder {
        MachineBuilder::new(definition)
    }

    /// Wizard nuevo con reloj del sistema y journal en memoria.
    pub fn start(definition: Arc<WizardDefinition>) -> Self {
        Self::builder(definition).build()
    }

    pub(crate) fn fresh(definition: Arc<WizardDefinition>,
                        wizard_id: Uuid,
                        clock: Arc<dyn Clock>,
                        mut event_store: Box<dyn EventStore>)
                        -> Self {
        let state = WizardState::new(wizard_id, definition.first_step_id());
        event_store.append_kind(wizard_id,
                                WizardEventKind::WizardStarted { definition_hash: definition.definition_hash().to_string(),
                                                                 step_count: definition.len() });
        debug!("wizard:start wizard_id={} steps={}", wizard_id, definition.len());
        Self { definition,
               state,
               event_store,
               clock,
               revision: 0 }
    }

    /// Reconstruye el estado desde un borrador.
    ///
    /// Se descartan datos de pasos que la definición ya no conoce, payloads
    /// `null` y pasos completados sin payload. El paso actual es el menor (por orden de
    /// definición) entre el guardado y el primer paso incompleto.
    pub(crate) fn resumed(definition: Arc<WizardDefinition>,
                          draft: DraftRecord,
                          clock: Arc<dyn Clock>,
                          mut event_store: Box<dyn EventStore>)
                          -> Self {
        if draft.definition_hash != definition.definition_hash() {
            warn!("wizard:resume definition_mismatch wizard_id={} draft_hash={} current_hash={}",
                  draft.wizard_id,
                  draft.definition_hash,
                  definition.definition_hash());
        }
        let mut state = WizardState::new(draft.wizard_id, definition.first_step_id());
        for (step_id, payload) in draft.captured_data {
            if definition.contains(&step_id) && !payload.is_null() {
                state.captured_data.insert(step_id, payload);
            }
        }
        for step in definition.steps() {
            let id = step.id();
            if draft.completed_steps.iter().any(|c| c == id) && state.captured_data.contains_key(id) {
                state.completed_steps.insert(id.to_string());
            }
        }

        let first_incomplete = definition.steps().iter().position(|s| !state.completed_steps.contains(s.id()));
        let saved_idx = definition.index_of(&draft.current_step_id);
        let idx = match (saved_idx, first_incomplete) {
            (Some(s), Some(f)) => s.min(f),
            (Some(s), None) => s,
            (None, Some(f)) => f,
            (None, None) => definition.len() - 1,
        };
        if let Some(step) = definition.step_at(idx) {
            state.current_step_id = step.id().to_string();
        }

        event_store.append_kind(state.wizard_id,
                                WizardEventKind::WizardResumed { current_step_id: state.current_step_id.clone(),
                                                                 completed_steps: state.completed_steps.iter().cloned().collect(),
                                                                 draft_saved_at: draft.saved_at });
        debug!("wizard:resume wizard_id={} step={} completed={}",
               state.wizard_id,
               state.current_step_id,
               state.completed_steps.len());
        Self { definition,
               state,
               event_store,
               clock,
               revision: 0 }
    }

    pub fn state(&self) -> &WizardState {
        &self.state
    }

    pub fn definition(&self) -> &Arc<WizardDefinition> {
        &self.definition
    }

    pub fn wizard_id(&self) -> Uuid {
        self.state.wizard_id
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn events(&self) -> Vec<WizardEvent> {
        self.event_store.list(self.state.wizard_id)
    }

    /// Secuencia compacta de variantes del journal (útil en tests).
    pub fn event_variants(&self) -> Vec<&'static str> {
        self.events()
            .iter()
            .map(|e| match e.kind {
                WizardEventKind::WizardStarted { .. } => "S",
                WizardEventKind::WizardResumed { .. } => "R",
                WizardEventKind::StepCompleted { .. } => "C",
                WizardEventKind::StepRejected { .. } => "X",
                WizardEventKind::NavigatedBack { .. } => "B",
                WizardEventKind::JumpedTo { .. } => "J",
                WizardEventKind::DraftSaved { .. } => "D",
                WizardEventKind::DraftSaveFailed { .. } => "F",
                WizardEventKind::SubmissionFailed { .. } => "E",
                WizardEventKind::WizardSubmitted { .. } => "U",
                WizardEventKind::WizardAbandoned => "A",
            })
            .collect()
    }

    pub fn validation_context(&self) -> ValidationContext {
        ValidationContext::new(self.clock.today())
    }

    fn ensure_active(&self, operation: &'static str) -> Result<(), WizardError> {
        if self.state.status.is_terminal() {
            return Err(WizardError::InvalidState { operation,
                                                   status: self.state.status });
        }
        Ok(())
    }

    fn append(&mut self, kind: WizardEventKind) {
        debug!("wizard:event wizard_id={} kind={}", self.state.wizard_id, kind.name());
        self.event_store.append_kind(self.state.wizard_id, kind);
    }

    fn current_index(&self) -> usize {
        self.definition.index_of(&self.state.current_step_id).unwrap_or(0)
    }

    /// Índice del paso inmediatamente posterior al completado más lejano.
    fn frontier(&self) -> usize {
        self.state
            .completed_steps
            .iter()
            .filter_map(|id| self.definition.index_of(id))
            .max()
            .map(|i| i + 1)
            .unwrap_or(0)
    }

    /// Valida el payload del paso actual y, si es válido, lo guarda, marca
    /// el paso como completado y avanza.
    pub fn go_next(&mut self, payload: Value) -> Result<StepOutcome, WizardError> {
        self.ensure_active("go_next")?;
        let step_id = self.state.current_step_id.clone();
        let ctx = self.validation_context();
        let mut validation = self.definition.validate(&step_id, &payload, &ctx)?;
        // un paso completado siempre tiene payload
        if payload.is_null() {
            validation.add_error(ROOT_FIELD, "A value is required");
        }

        if !validation.is_valid() {
            debug!("go_next:rejected wizard_id={} step={} errors={}",
                   self.state.wizard_id,
                   step_id,
                   validation.error_count());
            self.append(WizardEventKind::StepRejected { step_id,
                                                        error_fields: validation.error_fields() });
            return Ok(StepOutcome::Rejected { validation });
        }

        let payload_hash = hash_value(&payload);
        self.state.captured_data.insert(step_id.clone(), payload);
        self.state.completed_steps.insert(step_id.clone());
        self.revision += 1;
        self.append(WizardEventKind::StepCompleted { step_id: step_id.clone(),
                                                     payload_hash });

        match self.definition.next_step_id(&step_id).map(str::to_string) {
            Some(next) => {
                debug!("go_next:advanced wizard_id={} from={} to={}", self.state.wizard_id, step_id, next);
                self.state.current_step_id = next.clone();
                Ok(StepOutcome::Advanced { to: next, validation })
            }
            None => {
                debug!("go_next:ready_to_submit wizard_id={} step={}", self.state.wizard_id, step_id);
                Ok(StepOutcome::ReadyToSubmit { validation })
            }
        }
    }

    /// Retrocede un paso conservando los datos capturados. `Ok(None)` en el
    /// primer paso (no-op).
    pub fn go_previous(&mut self) -> Result<Option<StepId>, WizardError> {
        self.ensure_active("go_previous")?;
        let from = self.state.current_step_id.clone();
        let Some(prev) = self.definition.previous_step_id(&from).map(str::to_string) else {
            return Ok(None);
        };
        self.state.current_step_id = prev.clone();
        self.revision += 1;
        self.append(WizardEventKind::NavigatedBack { from, to: prev.clone() });
        Ok(Some(prev))
    }

    /// `true` si `jump_to(step_id)` sería aceptado.
    ///
    /// Se permite saltar a pasos completados, a cualquier paso en o antes
    /// del actual, y al siguiente de la frontera completada.
    pub fn can_jump_to(&self, step_id: &str) -> bool {
        let Some(target) = self.definition.index_of(step_id) else {
            return false;
        };
        self.state.is_completed(step_id) || target <= self.current_index() || target <= self.frontier()
    }

    pub fn jump_to(&mut self, step_id: &str) -> Result<(), WizardError> {
        self.ensure_active("jump_to")?;
        if !self.definition.contains(step_id) {
            return Err(WizardError::UnknownStep(step_id.to_string()));
        }
        if self.state.current_step_id == step_id {
            return Ok(());
        }
        if !self.can_jump_to(step_id) {
            return Err(WizardError::StepLocked(step_id.to_string()));
        }
        let from = std::mem::replace(&mut self.state.current_step_id, step_id.to_string());
        self.revision += 1;
        self.append(WizardEventKind::JumpedTo { from,
                                                to: step_id.to_string() });
        Ok(())
    }

    pub fn step_states(&self) -> Vec<StepEntry> {
        self.definition
            .steps()
            .iter()
            .map(|s| {
                let state = if s.id() == self.state.current_step_id {
                    StepState::Current
                } else if self.state.is_completed(s.id()) {
                    StepState::Completed
                } else if self.can_jump_to(s.id()) {
                    StepState::Available
                } else {
                    StepState::Locked
                };
                StepEntry { step_id: s.id().to_string(),
                            label: s.label().to_string(),
                            state }
            })
            .collect()
    }

    pub fn progress(&self) -> Progress {
        Progress { completed: self.state.completed_steps.len(),
                   total: self.definition.len() }
    }

    /// Foto persistible del estado actual. No muta nada.
    pub fn snapshot_draft(&self) -> Result<DraftRecord, WizardError> {
        self.ensure_active("save_draft")?;
        Ok(DraftRecord { wizard_id: self.state.wizard_id,
                         definition_hash: self.definition.definition_hash().to_string(),
                         format_version: DRAFT_FORMAT_VERSION,
                         current_step_id: self.state.current_step_id.clone(),
                         captured_data: self.state.captured_data.clone(),
                         completed_steps: self.state.completed_steps.iter().cloned().collect(),
                         saved_at: self.clock.now() })
    }

    pub fn abandon(&mut self) -> Result<(), WizardError> {
        self.ensure_active("abandon")?;
        self.state.status = WizardStatus::Abandoned;
        self.revision += 1;
        self.append(WizardEventKind::WizardAbandoned);
        debug!("wizard:abandon wizard_id={}", self.state.wizard_id);
        Ok(())
    }

    /// Arma el objeto de dominio sin cambiar el estado.
    pub fn assemble<A: Assembler + ?Sized>(&self, assembler: &A) -> Result<A::Output, WizardError> {
        self.ensure_active("submit")?;
        Ok(assemble(&self.definition, &self.state, assembler)?)
    }

    /// Ensambla y serializa el cuerpo a enviar junto con su fingerprint.
    pub fn prepare_submission<A: Assembler + ?Sized>(&self,
                                                     assembler: &A)
                                                     -> Result<PreparedSubmission<A::Output>, WizardError> {
        let object = self.assemble(assembler)?;
        let body = serde_json::to_value(&object).map_err(|e| SubmissionError::Encode(e.to_string()))?;
        let fingerprint = hash_value(&body);
        Ok(PreparedSubmission { object, body, fingerprint })
    }

    pub(crate) fn mark_submitted(&mut self, fingerprint: String) -> Result<(), WizardError> {
        self.ensure_active("submit")?;
        self.state.status = WizardStatus::Submitted;
        self.revision += 1;
        debug!("wizard:submitted wizard_id={} fingerprint={}", self.state.wizard_id, fingerprint);
        self.append(WizardEventKind::WizardSubmitted { fingerprint });
        Ok(())
    }

    pub(crate) fn record_draft_saved(&mut self, draft: &DraftRecord) {
        self.append(WizardEventKind::DraftSaved { saved_at: draft.saved_at });
    }

    pub(crate) fn record_draft_failed(&mut self, reason: String) {
        self.append(WizardEventKind::DraftSaveFailed { reason });
    }

    pub(crate) fn record_submission_failure(&mut self, reason: String) {
        self.append(WizardEventKind::SubmissionFailed { reason });
    }
}
