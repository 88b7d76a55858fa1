use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::state::CapturedData;
use crate::step::StepId;

/// Foto persistible de un wizard en curso. Pertenece al backend de
/// borradores, no al motor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DraftRecord {
    pub wizard_id: Uuid,
    pub definition_hash: String,
    pub format_version: u32,
    pub current_step_id: StepId,
    pub captured_data: CapturedData,
    pub completed_steps: Vec<StepId>,
    pub saved_at: DateTime<Utc>,
}
