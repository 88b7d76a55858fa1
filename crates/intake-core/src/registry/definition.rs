//! Registro de pasos: definición inmutable y ordenada de un wizard.
//!
//! El orden de `steps` fija la secuencia de navegación. La definición lleva
//! un `definition_hash` (hash de los ids en orden) que viaja en los
//! borradores para detectar definiciones cambiadas al reanudar.

use serde_json::{json, Value};
use std::collections::HashMap;

use crate::errors::{ConfigurationError, WizardError};
use crate::hashing::hash_value;
use crate::step::{StepId, StepSpec};
use crate::validation::{ValidationContext, ValidationResult};

#[derive(Debug, Clone)]
pub struct WizardDefinition {
    steps: Vec<StepSpec>,
    index: HashMap<StepId, usize>,
    definition_hash: String,
}

/// Valida ids (no vacíos, únicos) y construye la definición.
pub fn build_definition(steps: Vec<StepSpec>) -> Result<WizardDefinition, ConfigurationError> {
    if steps.is_empty() {
        return Err(ConfigurationError::EmptyDefinition);
    }
    let mut index = HashMap::with_capacity(steps.len());
    for (i, step) in steps.iter().enumerate() {
        if step.id().trim().is_empty() {
            return Err(ConfigurationError::EmptyStepId(i));
        }
        if index.insert(step.id().to_string(), i).is_some() {
            return Err(ConfigurationError::DuplicateStepId(step.id().to_string()));
        }
    }
    let ids: Vec<&str> = steps.iter().map(StepSpec::id).collect();
    let definition_hash = hash_value(&json!(ids));
    Ok(WizardDefinition { steps, index, definition_hash })
}

impl WizardDefinition {
    pub fn builder() -> DefinitionBuilder {
        DefinitionBuilder { steps: Vec::new() }
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    /// Siempre falso para una definición construida; existe por simetría con
    /// `len`.
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    pub fn steps(&self) -> &[StepSpec] {
        &self.steps
    }

    pub fn definition_hash(&self) -> &str {
        &self.definition_hash
    }

    pub fn step(&self, id: &str) -> Option<&StepSpec> {
        self.index_of(id).map(|i| &self.steps[i])
    }

    pub fn step_at(&self, index: usize) -> Option<&StepSpec> {
        self.steps.get(index)
    }

    pub fn index_of(&self, id: &str) -> Option<usize> {
        self.index.get(id).copied()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.index.contains_key(id)
    }

    pub fn first_step_id(&self) -> &str {
        self.steps[0].id()
    }

    pub fn last_step_id(&self) -> &str {
        self.steps[self.steps.len() - 1].id()
    }

    /// Siguiente paso; `None` en el último o si `current` no existe.
    pub fn next_step_id(&self, current: &str) -> Option<&str> {
        let i = self.index_of(current)?;
        self.steps.get(i + 1).map(StepSpec::id)
    }

    /// Paso anterior; `None` en el primero o si `current` no existe.
    pub fn previous_step_id(&self, current: &str) -> Option<&str> {
        let i = self.index_of(current)?;
        i.checked_sub(1).map(|p| self.steps[p].id())
    }

    pub fn required_step_ids(&self) -> impl Iterator<Item = &str> + '_ {
        self.steps.iter().filter(|s| s.is_required()).map(StepSpec::id)
    }

    /// Valida el payload de un paso con el validador declarado.
    pub fn validate(&self, step_id: &str, payload: &Value, ctx: &ValidationContext) -> Result<ValidationResult, WizardError> {
        let step = self.step(step_id).ok_or_else(|| WizardError::UnknownStep(step_id.to_string()))?;
        Ok(step.validate(payload, ctx))
    }
}

/// Builder incremental de `WizardDefinition`.
#[derive(Debug, Default)]
pub struct DefinitionBuilder {
    steps: Vec<StepSpec>,
}

impl DefinitionBuilder {
    pub fn step(mut self, step: StepSpec) -> Self {
        self.steps.push(step);
        self
    }

    pub fn build(self) -> Result<WizardDefinition, ConfigurationError> {
        build_definition(self.steps)
    }
}
