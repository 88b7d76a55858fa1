//! Flujos de admisión concretos.

pub mod consultation;
pub mod medical;

use intake_core::{AssemblyError, ValidationResult};
use intake_domain::DomainError;

/// Traduce una violación de dominio al error de ensamblado del core. Las
/// violaciones por campo viajan como `CrossStep` para que la UI las muestre
/// junto al campo.
pub(crate) fn domain_to_assembly(err: DomainError) -> AssemblyError {
    match err {
        DomainError::FieldViolation { field, message } => {
            AssemblyError::CrossStep(ValidationResult::with_error(field, message))
        }
        DomainError::ValidationError(msg) | DomainError::SerializationError(msg) => AssemblyError::Merge(msg),
    }
}
