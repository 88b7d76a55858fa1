use thiserror::Error;

/// Error del dominio de admisión (consultas y fichas médicas).
#[derive(Debug, Error, PartialEq, Eq, Clone)]
pub enum DomainError {
    #[error("{0}")]
    ValidationError(String),
    /// Violación asociada a un campo concreto (ruta con punto).
    #[error("{field}: {message}")]
    FieldViolation { field: String, message: String },
    #[error("Error de serialización: {0}")]
    SerializationError(String),
}

impl DomainError {
    pub fn field(field: impl Into<String>, message: impl Into<String>) -> Self {
        DomainError::FieldViolation { field: field.into(),
                                      message: message.into() }
    }
}

impl From<serde_json::Error> for DomainError {
    fn from(e: serde_json::Error) -> Self {
        DomainError::SerializationError(e.to_string())
    }
}
