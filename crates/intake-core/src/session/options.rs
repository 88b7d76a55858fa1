use std::time::Duration;

/// Límites de tiempo y política de autosave de una sesión.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionOptions {
    /// Límite para cada llamada al `DraftStore`.
    pub persistence_timeout: Duration,
    /// Límite para la llamada al `Submitter`.
    pub submission_timeout: Duration,
    /// Guardar borrador tras cada `go_next` aceptado.
    pub autosave_on_advance: bool,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self { persistence_timeout: Duration::from_millis(5_000),
               submission_timeout: Duration::from_millis(15_000),
               autosave_on_advance: true }
    }
}

impl SessionOptions {
    pub fn with_persistence_timeout(mut self, timeout: Duration) -> Self {
        self.persistence_timeout = timeout;
        self
    }

    pub fn with_submission_timeout(mut self, timeout: Duration) -> Self {
        self.submission_timeout = timeout;
        self
    }

    pub fn with_autosave_on_advance(mut self, enabled: bool) -> Self {
        self.autosave_on_advance = enabled;
        self
    }
}
