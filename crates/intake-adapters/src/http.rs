//! Colaborador de submit sobre HTTP.
//!
//! `POST {base_url}/{resource}` con el objeto ensamblado como JSON. Un 2xx
//! devuelve el cuerpo de la respuesta; cualquier otro status se traduce a
//! `SubmissionError::Rejected` leyendo `{ error, details? }`. No hay
//! reintentos: el header `Idempotency-Key` permite al servidor descartar
//! duplicados si el usuario reintenta a mano.

use async_trait::async_trait;
use intake_core::hashing::to_canonical_json;
use intake_core::{SubmissionError, SubmitReceipt, Submitter};
use log::{debug, warn};
use serde_json::Value;
use sha2::{Digest, Sha256};

pub const IDEMPOTENCY_HEADER: &str = "Idempotency-Key";

/// sha256 (hex) del JSON canónico del cuerpo.
pub fn idempotency_key(body: &Value) -> String {
    let mut hasher = Sha256::new();
    hasher.update(to_canonical_json(body).as_bytes());
    format!("{:x}", hasher.finalize())
}

/// Interpreta una respuesta no exitosa.
pub fn parse_failure(status: u16, body: &str) -> SubmissionError {
    let parsed: Option<Value> = serde_json::from_str(body).ok();
    let error = parsed.as_ref()
                      .and_then(|v| v.get("error"))
                      .and_then(Value::as_str)
                      .map(str::to_string)
                      .or_else(|| {
                          let trimmed = body.trim();
                          (!trimmed.is_empty() && parsed.is_none()).then(|| trimmed.to_string())
                      })
                      .unwrap_or_else(|| format!("HTTP {status}"));
    let details = parsed.as_ref().and_then(|v| v.get("details")).cloned();
    SubmissionError::Rejected { status, error, details }
}

#[derive(Debug, Clone)]
pub struct HttpSubmitter {
    client: reqwest::Client,
    endpoint: String,
}

impl HttpSubmitter {
    /// `resource` se concatena a `base_url` (p. ej. `consultations`).
    pub fn new(base_url: &str, resource: &str) -> Self {
        Self::with_client(reqwest::Client::new(), base_url, resource)
    }

    pub fn with_client(client: reqwest::Client, base_url: &str, resource: &str) -> Self {
        let endpoint = format!("{}/{}", base_url.trim_end_matches('/'), resource.trim_start_matches('/'));
        Self { client, endpoint }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl Submitter for HttpSubmitter {
    async fn submit(&self, body: &Value) -> Result<SubmitReceipt, SubmissionError> {
        let key = idempotency_key(body);
        debug!("http_submit:start endpoint={} key={}", self.endpoint, key);
        let response = self.client
                           .post(&self.endpoint)
                           .header(IDEMPOTENCY_HEADER, &key)
                           .json(body)
                           .send()
                           .await
                           .map_err(|e| SubmissionError::Transport(e.to_string()))?;

        let status = response.status().as_u16();
        let text = response.text().await.map_err(|e| SubmissionError::Transport(e.to_string()))?;
        if !(200..300).contains(&status) {
            warn!("http_submit:rejected endpoint={} status={}", self.endpoint, status);
            return Err(parse_failure(status, &text));
        }
        let body = if text.trim().is_empty() {
            Value::Null
        } else {
            serde_json::from_str(&text).unwrap_or(Value::String(text))
        };
        debug!("http_submit:ok endpoint={} status={}", self.endpoint, status);
        Ok(SubmitReceipt { status, body })
    }
}
