use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::errors::SubmissionError;

/// Respuesta exitosa (2xx) del colaborador de submit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubmitReceipt {
    pub status: u16,
    pub body: Value,
}

/// Frontera con la API externa (`POST /resource` con el objeto ensamblado).
/// Nunca reintenta por su cuenta.
#[async_trait]
pub trait Submitter: Send + Sync {
    async fn submit(&self, body: &Value) -> Result<SubmitReceipt, SubmissionError>;
}

/// Resultado de un submit aceptado.
#[derive(Debug, Clone)]
pub struct SubmissionOutcome<T> {
    pub object: T,
    pub receipt: SubmitReceipt,
    /// Hash del JSON canónico enviado.
    pub fingerprint: String,
}

/// Objeto ensamblado y listo para enviar, con el cuerpo JSON y su
/// fingerprint ya calculados.
#[derive(Debug, Clone)]
pub struct PreparedSubmission<T> {
    pub object: T,
    pub body: Value,
    pub fingerprint: String,
}
