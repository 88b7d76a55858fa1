use serde_json::Value;
use std::fmt;
use std::sync::Arc;

use crate::validation::{StepValidator, ValidationContext, ValidationResult};

/// Identificador estable y único dentro de un wizard.
pub type StepId = String;

/// Declaración de un paso: id, etiqueta, validador y si es requerido para
/// el submit.
#[derive(Clone)]
pub struct StepSpec {
    id: StepId,
    label: String,
    validator: Arc<dyn StepValidator>,
    required: bool,
}

impl StepSpec {
    /// Paso requerido por defecto.
    pub fn new(id: impl Into<StepId>, label: impl Into<String>, validator: impl StepValidator + 'static) -> Self {
        Self { id: id.into(),
               label: label.into(),
               validator: Arc::new(validator),
               required: true }
    }

    /// Marca el paso como opcional: el submit no exige que esté completado.
    pub fn optional(mut self) -> Self {
        self.required = false;
        self
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn is_required(&self) -> bool {
        self.required
    }

    pub fn validate(&self, payload: &Value, ctx: &ValidationContext) -> ValidationResult {
        self.validator.validate(payload, ctx)
    }
}

impl fmt::Debug for StepSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StepSpec")
         .field("id", &self.id)
         .field("label", &self.label)
         .field("required", &self.required)
         .finish_non_exhaustive()
    }
}
