//! `WizardSession`: coordina máquina, borradores y submit.

use chrono::{DateTime, Utc};
use log::{debug, warn};
use serde_json::Value;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::timeout;
use uuid::Uuid;

use crate::draft::{DraftRecord, DraftStore};
use crate::errors::WizardError;
use crate::event::WizardEvent;
use crate::machine::{MachineBuilder, Progress, StepEntry, StepOutcome, WizardMachine};
use crate::session::SessionOptions;
use crate::state::{WizardState, WizardStatus};
use crate::step::StepId;
use crate::submission::{Assembler, SubmissionOutcome, Submitter};

/// Resultado de un tick de autosave.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AutosaveOutcome {
    Saved { saved_at: DateTime<Utc> },
    /// Nada cambió desde el último guardado exitoso.
    Unchanged,
    /// Otra operación tiene la sesión; se salta el tick.
    Busy,
    /// Wizard terminal: no hay nada más que guardar.
    Inactive,
    Failed { reason: String },
}

/// Resultado de `WizardSession::go_next`: el de la máquina más el error del
/// guardado automático, si lo hubo. El avance se mantiene aunque falle.
#[derive(Debug)]
pub struct SessionAdvance {
    pub outcome: StepOutcome,
    pub autosave_error: Option<WizardError>,
}

impl SessionAdvance {
    pub fn validation(&self) -> &crate::validation::ValidationResult {
        self.outcome.validation()
    }

    pub fn is_rejected(&self) -> bool {
        self.outcome.is_rejected()
    }
}

struct SessionInner {
    machine: WizardMachine,
    /// Revisión de la máquina al último guardado exitoso.
    saved_revision: Option<u64>,
}

pub struct WizardSession {
    wizard_id: Uuid,
    inner: Mutex<SessionInner>,
    drafts: Arc<dyn DraftStore>,
    options: SessionOptions,
}

impl std::fmt::Debug for WizardSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WizardSession")
         .field("wizard_id", &self.wizard_id)
         .field("options", &self.options)
         .finish_non_exhaustive()
    }
}

/// Ejecuta `fut` con límite de tiempo; al vencer devuelve `Timeout`.
async fn bounded<T, E, F>(operation: &'static str, limit: Duration, fut: F) -> Result<T, WizardError>
    where F: Future<Output = Result<T, E>>,
          WizardError: From<E>
{
    match timeout(limit, fut).await {
        Ok(res) => res.map_err(WizardError::from),
        Err(_) => Err(WizardError::Timeout { operation,
                                             after_ms: limit.as_millis() as u64 }),
    }
}

impl WizardSession {
    pub fn new(machine: WizardMachine, drafts: Arc<dyn DraftStore>, options: SessionOptions) -> Self {
        let wizard_id = machine.wizard_id();
        Self { wizard_id,
               inner: Mutex::new(SessionInner { machine,
                                                saved_revision: None }),
               drafts,
               options }
    }

    /// Reanuda el wizard `wizard_id` desde su borrador. `Ok(None)` si no hay
    /// borrador guardado.
    pub async fn resume(builder: MachineBuilder,
                        drafts: Arc<dyn DraftStore>,
                        wizard_id: Uuid,
                        options: SessionOptions)
                        -> Result<Option<Self>, WizardError> {
        debug!("resume:start wizard_id={}", wizard_id);
        let Some(draft) = bounded("load_draft", options.persistence_timeout, drafts.load(wizard_id)).await? else {
            debug!("resume:no_draft wizard_id={}", wizard_id);
            return Ok(None);
        };
        let machine = builder.resume_from(draft).build();
        // el estado reconstruido ya coincide con lo persistido
        let saved_revision = Some(machine.revision());
        Ok(Some(Self { wizard_id,
                       inner: Mutex::new(SessionInner { machine, saved_revision }),
                       drafts,
                       options }))
    }

    pub fn wizard_id(&self) -> Uuid {
        self.wizard_id
    }

    pub fn options(&self) -> &SessionOptions {
        &self.options
    }

    pub async fn state(&self) -> WizardState {
        self.inner.lock().await.machine.state().clone()
    }

    pub async fn status(&self) -> WizardStatus {
        self.inner.lock().await.machine.state().status()
    }

    pub async fn step_states(&self) -> Vec<StepEntry> {
        self.inner.lock().await.machine.step_states()
    }

    pub async fn progress(&self) -> Progress {
        self.inner.lock().await.machine.progress()
    }

    pub async fn can_jump_to(&self, step_id: &str) -> bool {
        self.inner.lock().await.machine.can_jump_to(step_id)
    }

    pub async fn events(&self) -> Vec<WizardEvent> {
        self.inner.lock().await.machine.events()
    }

    pub async fn event_variants(&self) -> Vec<&'static str> {
        self.inner.lock().await.machine.event_variants()
    }

    /// `go_next` de la máquina. Con `autosave_on_advance` guarda el borrador
    /// tras un avance; si el guardado falla el avance se mantiene y el error
    /// vuelve en `autosave_error`.
    pub async fn go_next(&self, payload: Value) -> Result<SessionAdvance, WizardError> {
        let mut inner = self.inner.lock().await;
        let outcome = inner.machine.go_next(payload)?;
        let mut autosave_error = None;
        if !outcome.is_rejected() && self.options.autosave_on_advance {
            // persist ya deja el warn! y el evento DraftSaveFailed
            autosave_error = self.persist(&mut inner).await.err();
        }
        Ok(SessionAdvance { outcome, autosave_error })
    }

    pub async fn go_previous(&self) -> Result<Option<StepId>, WizardError> {
        self.inner.lock().await.machine.go_previous()
    }

    pub async fn jump_to(&self, step_id: &str) -> Result<(), WizardError> {
        self.inner.lock().await.machine.jump_to(step_id)
    }

    /// Guardado explícito. El error se reporta pero el wizard sigue usable.
    pub async fn save_draft(&self) -> Result<DraftRecord, WizardError> {
        let mut inner = self.inner.lock().await;
        self.persist(&mut inner).await
    }

    /// Variante periódica de `save_draft`.
    pub async fn autosave_tick(&self) -> AutosaveOutcome {
        let Ok(mut inner) = self.inner.try_lock() else {
            debug!("autosave:busy wizard_id={}", self.wizard_id);
            return AutosaveOutcome::Busy;
        };
        if inner.machine.state().status().is_terminal() {
            return AutosaveOutcome::Inactive;
        }
        if inner.saved_revision == Some(inner.machine.revision()) {
            return AutosaveOutcome::Unchanged;
        }
        match self.persist(&mut inner).await {
            Ok(draft) => AutosaveOutcome::Saved { saved_at: draft.saved_at },
            Err(err) => AutosaveOutcome::Failed { reason: err.to_string() },
        }
    }

    async fn persist(&self, inner: &mut SessionInner) -> Result<DraftRecord, WizardError> {
        let draft = inner.machine.snapshot_draft()?;
        let revision = inner.machine.revision();
        debug!("save_draft:start wizard_id={} step={} revision={}",
               self.wizard_id,
               draft.current_step_id,
               revision);
        match bounded("save_draft", self.options.persistence_timeout, self.drafts.save(&draft)).await {
            Ok(()) => {
                inner.saved_revision = Some(revision);
                inner.machine.record_draft_saved(&draft);
                debug!("save_draft:ok wizard_id={} saved_at={}", self.wizard_id, draft.saved_at);
                Ok(draft)
            }
            Err(err) => {
                warn!("save_draft:failed wizard_id={} err={}", self.wizard_id, err);
                inner.machine.record_draft_failed(err.to_string());
                Err(err)
            }
        }
    }

    /// Ensambla, envía y, sólo si el colaborador acepta, marca el wizard
    /// como `Submitted`. Cualquier falla deja el wizard `InProgress`.
    pub async fn submit<A>(&self,
                           assembler: &A,
                           submitter: &dyn Submitter)
                           -> Result<SubmissionOutcome<A::Output>, WizardError>
        where A: Assembler + ?Sized
    {
        let mut inner = self.inner.lock().await;
        let prepared = inner.machine.prepare_submission(assembler)?;
        debug!("submit:start wizard_id={} fingerprint={}", self.wizard_id, prepared.fingerprint);
        match bounded("submit", self.options.submission_timeout, submitter.submit(&prepared.body)).await {
            Ok(receipt) => {
                inner.machine.mark_submitted(prepared.fingerprint.clone())?;
                drop(inner);
                self.discard_draft().await;
                Ok(SubmissionOutcome { object: prepared.object,
                                       receipt,
                                       fingerprint: prepared.fingerprint })
            }
            Err(err) => {
                warn!("submit:failed wizard_id={} err={}", self.wizard_id, err);
                inner.machine.record_submission_failure(err.to_string());
                Err(err)
            }
        }
    }

    pub async fn abandon(&self) -> Result<(), WizardError> {
        self.inner.lock().await.machine.abandon()?;
        self.discard_draft().await;
        Ok(())
    }

    /// Borra el borrador de un wizard terminado. Las fallas sólo se loguean.
    async fn discard_draft(&self) {
        match bounded("delete_draft", self.options.persistence_timeout, self.drafts.delete(self.wizard_id)).await {
            Ok(existed) => debug!("delete_draft:ok wizard_id={} existed={}", self.wizard_id, existed),
            Err(err) => warn!("delete_draft:failed wizard_id={} err={}", self.wizard_id, err),
        }
    }
}
