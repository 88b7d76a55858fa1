//! `assemble`: exige todos los pasos requeridos completados y delega el
//! merge a un `Assembler` provisto por la aplicación (el shape final es de
//! dominio: solicitud de consulta, ficha médica, ...).

use serde::Serialize;
use serde_json::{Map, Value};

use crate::errors::AssemblyError;
use crate::merge::merge_json;
use crate::registry::WizardDefinition;
use crate::state::WizardState;

pub trait Assembler: Send + Sync {
    type Output: Serialize + Send;

    /// Combina los payloads en el objeto final y verifica invariantes entre
    /// pasos. Sólo se invoca con todos los pasos requeridos completados.
    fn merge(&self, definition: &WizardDefinition, state: &WizardState) -> Result<Self::Output, AssemblyError>;
}

/// Verifica completitud y arma el objeto de dominio.
pub fn assemble<A: Assembler + ?Sized>(definition: &WizardDefinition,
                                       state: &WizardState,
                                       assembler: &A)
                                       -> Result<A::Output, AssemblyError> {
    let missing: Vec<String> = definition.required_step_ids()
                                         .filter(|id| !state.is_completed(id))
                                         .map(str::to_string)
                                         .collect();
    if !missing.is_empty() {
        return Err(AssemblyError::IncompleteWizard { missing });
    }
    assembler.merge(definition, state)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MergeMode {
    /// `{ "<stepId>": payload, ... }`
    #[default]
    NestedByStep,
    /// Merge shallow de todos los payloads en orden de definición.
    Flatten,
}

/// Assembler genérico sobre JSON, en orden de definición y sólo con pasos
/// completados.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonAssembler {
    pub mode: MergeMode,
}

impl JsonAssembler {
    pub fn new(mode: MergeMode) -> Self {
        Self { mode }
    }
}

impl Assembler for JsonAssembler {
    type Output = Value;

    fn merge(&self, definition: &WizardDefinition, state: &WizardState) -> Result<Value, AssemblyError> {
        let completed = definition.steps()
                                  .iter()
                                  .filter(|s| state.is_completed(s.id()))
                                  .filter_map(|s| state.payload(s.id()).map(|p| (s.id(), p)));
        match self.mode {
            MergeMode::NestedByStep => {
                let map: Map<String, Value> = completed.map(|(id, p)| (id.to_string(), p.clone())).collect();
                Ok(Value::Object(map))
            }
            MergeMode::Flatten => Ok(completed.fold(Value::Object(Map::new()), |acc, (_, p)| merge_json(&acc, p))),
        }
    }
}
