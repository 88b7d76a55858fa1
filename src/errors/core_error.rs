use intake_core::WizardError;
use intake_domain::DomainError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("Error interno: {0}")]
    Internal(String),
    #[error("Error de configuración: {0}")]
    Config(String),
    #[error("Error del asistente: {0}")]
    Wizard(#[from] WizardError),
    #[error("Error de dominio: {0}")]
    Domain(#[from] DomainError),
}

impl CoreError {
    /// `true` para fallas que el usuario puede corregir (validación,
    /// pasos faltantes, rechazo del servidor).
    pub fn is_user_recoverable(&self) -> bool {
        match self {
            CoreError::Wizard(e) => matches!(e,
                                             WizardError::Assembly(_)
                                             | WizardError::Submission(_)
                                             | WizardError::StepLocked(_)
                                             | WizardError::Timeout { .. }
                                             | WizardError::Persistence(_)),
            CoreError::Domain(_) => true,
            _ => false,
        }
    }
}
