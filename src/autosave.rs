//! Autosave periódico de una `WizardSession`.
//!
//! Un task de tokio llama a `autosave_tick` cada `period`. Los ticks
//! perdidos se descartan (`MissedTickBehavior::Skip`), un tick ocupado nunca
//! espera a la operación en curso y el task termina solo cuando el wizard
//! llega a un estado terminal.

use intake_core::{AutosaveOutcome, WizardSession};
use log::{debug, info};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};

use crate::errors::CoreError;

/// Conteo de ticks por resultado.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AutosaveSummary {
    pub ticks: u32,
    pub saved: u32,
    pub unchanged: u32,
    pub busy: u32,
    pub failed: u32,
    /// El task terminó porque el wizard ya no está en progreso.
    pub finished_inactive: bool,
}

impl AutosaveSummary {
    fn record(&mut self, outcome: &AutosaveOutcome) {
        self.ticks += 1;
        match outcome {
            AutosaveOutcome::Saved { .. } => self.saved += 1,
            AutosaveOutcome::Unchanged => self.unchanged += 1,
            AutosaveOutcome::Busy => self.busy += 1,
            AutosaveOutcome::Failed { .. } => self.failed += 1,
            AutosaveOutcome::Inactive => self.finished_inactive = true,
        }
    }
}

pub struct AutosaveDriver {
    stop: watch::Sender<bool>,
    handle: JoinHandle<AutosaveSummary>,
}

impl AutosaveDriver {
    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }

    /// Detiene el task y devuelve el resumen.
    pub async fn stop(self) -> Result<AutosaveSummary, CoreError> {
        // el receptor puede haber terminado ya
        let _ = self.stop.send(true);
        self.join().await
    }

    /// Espera a que el task termine por sí solo (wizard terminal).
    pub async fn join(self) -> Result<AutosaveSummary, CoreError> {
        self.handle
            .await
            .map_err(|e| CoreError::Internal(format!("autosave task failed: {e}")))
    }
}

/// Arranca el autosave. El primer tick ocurre después de un `period`
/// completo.
pub fn spawn_autosave(session: Arc<WizardSession>, period: Duration) -> AutosaveDriver {
    let (stop, mut stop_rx) = watch::channel(false);
    let handle = tokio::spawn(async move {
        let mut ticker = interval_at(Instant::now() + period, period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        let mut summary = AutosaveSummary::default();
        info!("autosave:start wizard_id={} period_ms={}", session.wizard_id(), period.as_millis());
        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    let outcome = session.autosave_tick().await;
                    debug!("autosave:tick wizard_id={} outcome={:?}", session.wizard_id(), outcome);
                    summary.record(&outcome);
                    if summary.finished_inactive {
                        break;
                    }
                }
                changed = stop_rx.changed() => {
                    if changed.is_err() || *stop_rx.borrow() {
                        break;
                    }
                }
            }
        }
        info!("autosave:stop wizard_id={} ticks={} saved={}", session.wizard_id(), summary.ticks, summary.saved);
        summary
    });
    AutosaveDriver { stop, handle }
}
