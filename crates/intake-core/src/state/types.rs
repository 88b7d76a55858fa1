//! `WizardState`: paso actual, datos capturados por paso, pasos completados
//! y estado del ciclo de vida.
//!
//! Invariantes (las mantiene `WizardMachine`, único que muta el estado):
//! - `current_step_id` siempre es un id de la definición.
//! - todo paso en `completed_steps` tiene entrada en `captured_data`.
//! - en `Submitted`/`Abandoned` el estado ya no cambia.

use indexmap::{IndexMap, IndexSet};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use uuid::Uuid;

use crate::errors::AssemblyError;
use crate::step::StepId;

/// Payloads por paso, en orden de primera captura.
pub type CapturedData = IndexMap<StepId, Value>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum WizardStatus {
    InProgress,
    Submitted,
    Abandoned,
}

impl WizardStatus {
    pub fn is_terminal(self) -> bool {
        !matches!(self, WizardStatus::InProgress)
    }
}

impl fmt::Display for WizardStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            WizardStatus::InProgress => "IN_PROGRESS",
            WizardStatus::Submitted => "SUBMITTED",
            WizardStatus::Abandoned => "ABANDONED",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WizardState {
    pub(crate) wizard_id: Uuid,
    pub(crate) current_step_id: StepId,
    pub(crate) captured_data: CapturedData,
    pub(crate) completed_steps: IndexSet<StepId>,
    pub(crate) status: WizardStatus,
}

impl WizardState {
    pub(crate) fn new(wizard_id: Uuid, first_step: &str) -> Self {
        Self { wizard_id,
               current_step_id: first_step.to_string(),
               captured_data: IndexMap::new(),
               completed_steps: IndexSet::new(),
               status: WizardStatus::InProgress }
    }

    pub fn wizard_id(&self) -> Uuid {
        self.wizard_id
    }

    pub fn current_step_id(&self) -> &str {
        &self.current_step_id
    }

    pub fn captured_data(&self) -> &CapturedData {
        &self.captured_data
    }

    pub fn completed_steps(&self) -> &IndexSet<StepId> {
        &self.completed_steps
    }

    pub fn status(&self) -> WizardStatus {
        self.status
    }

    pub fn is_completed(&self, step_id: &str) -> bool {
        self.completed_steps.contains(step_id)
    }

    /// Payload capturado para un paso (valores iniciales al re-entrar).
    pub fn payload(&self, step_id: &str) -> Option<&Value> {
        self.captured_data.get(step_id)
    }

    /// Decodifica el payload de un paso a un tipo concreto.
    pub fn payload_as<T: DeserializeOwned>(&self, step_id: &str) -> Result<Option<T>, AssemblyError> {
        self.payload(step_id)
            .map(|v| {
                serde_json::from_value(v.clone()).map_err(|e| AssemblyError::Decode { step_id: step_id.to_string(),
                                                                                     reason: e.to_string() })
            })
            .transpose()
    }

    /// Como `payload_as` pero el paso debe estar capturado.
    pub fn require_payload<T: DeserializeOwned>(&self, step_id: &str) -> Result<T, AssemblyError> {
        self.payload_as(step_id)?
            .ok_or_else(|| AssemblyError::IncompleteWizard { missing: vec![step_id.to_string()] })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[derive(Debug, Deserialize, PartialEq)]
    #[serde(rename_all = "camelCase")]
    struct Personal {
        first_name: String,
    }

    #[test]
    fn typed_payload_decoding() {
        let mut s = WizardState::new(Uuid::new_v4(), "personalInfo");
        s.captured_data.insert("personalInfo".into(), json!({"firstName": "Ana"}));
        s.captured_data.insert("details".into(), json!({"firstName": 3}));
        assert_eq!(s.payload_as::<Personal>("personalInfo").expect("decode"),
                   Some(Personal { first_name: "Ana".into() }));
        assert!(matches!(s.payload_as::<Personal>("details"), Err(AssemblyError::Decode { .. })));
        assert_eq!(s.payload_as::<Personal>("review").expect("absent"), None);
        assert!(s.require_payload::<Personal>("review").is_err());
    }

    #[test]
    fn status_serializes_screaming_case() {
        assert_eq!(serde_json::to_value(WizardStatus::InProgress).expect("ser"), json!("IN_PROGRESS"));
        assert!(WizardStatus::Submitted.is_terminal());
        assert!(!WizardStatus::InProgress.is_terminal());
    }
}
