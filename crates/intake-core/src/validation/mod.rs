//! Validador de campos de un paso.
//!
//! Un `StepValidator` es una función pura del payload del paso y del
//! `ValidationContext` (fecha de hoy). Nunca muta estado ni hace IO y reporta
//! todos los campos inválidos en una sola pasada, con claves anidadas unidas
//! por punto (`address.city`, `medications.0.dosage`).
//!
//! - `StepSchema`: esquema declarativo de reglas por campo.
//! - `ValidationResult`: errores y advertencias por campo.
//! - `path`: resolución de rutas con punto sobre `serde_json::Value`.

pub mod path;
mod result;
mod rules;
pub mod schema;

use chrono::NaiveDate;
use serde_json::Value;

pub use result::ValidationResult;
pub use rules::Rule;
pub use schema::{FieldRule, StepSchema};

/// Datos ambientales que una regla puede consultar.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ValidationContext {
    pub today: NaiveDate,
}

impl ValidationContext {
    pub fn new(today: NaiveDate) -> Self {
        Self { today }
    }
}

/// Contrato de validación de un paso.
pub trait StepValidator: Send + Sync {
    fn validate(&self, payload: &Value, ctx: &ValidationContext) -> ValidationResult;
}

impl<F> StepValidator for F
    where F: Fn(&Value, &ValidationContext) -> ValidationResult + Send + Sync
{
    fn validate(&self, payload: &Value, ctx: &ValidationContext) -> ValidationResult {
        self(payload, ctx)
    }
}

/// Validador que acepta cualquier payload (pasos de solo lectura, p. ej. un
/// resumen informativo).
#[derive(Debug, Default, Clone, Copy)]
pub struct AcceptAll;

impl StepValidator for AcceptAll {
    fn validate(&self, _payload: &Value, _ctx: &ValidationContext) -> ValidationResult {
        ValidationResult::ok()
    }
}
