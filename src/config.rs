//! Configuración de la aplicación leída del entorno (`.env` incluido).
//!
//! Variables reconocidas (todas opcionales):
//! - `INTAKE_AUTOSAVE_INTERVAL_SECS` (por defecto 30)
//! - `INTAKE_PERSISTENCE_TIMEOUT_MS` (por defecto 5000)
//! - `INTAKE_SUBMIT_TIMEOUT_MS` (por defecto 15000)
//! - `INTAKE_AUTOSAVE_ON_ADVANCE` (`true`/`false`, por defecto `true`)
//! - `INTAKE_SUBMIT_BASE_URL` (sin valor no hay submitter HTTP)

use intake_core::SessionOptions;
use log::warn;
use once_cell::sync::Lazy;
use std::str::FromStr;
use std::time::Duration;

use crate::errors::CoreError;

pub const DEFAULT_AUTOSAVE_INTERVAL: Duration = Duration::from_secs(30);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub autosave_interval: Duration,
    pub persistence_timeout: Duration,
    pub submission_timeout: Duration,
    pub autosave_on_advance: bool,
    pub submit_base_url: Option<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        let session = SessionOptions::default();
        Self { autosave_interval: DEFAULT_AUTOSAVE_INTERVAL,
               persistence_timeout: session.persistence_timeout,
               submission_timeout: session.submission_timeout,
               autosave_on_advance: session.autosave_on_advance,
               submit_base_url: None }
    }
}

fn parse_var<T: FromStr>(name: &str, raw: Option<String>) -> Result<Option<T>, CoreError> {
    match raw.map(|v| v.trim().to_string()).filter(|v| !v.is_empty()) {
        None => Ok(None),
        Some(v) => v.parse::<T>()
                    .map(Some)
                    .map_err(|_| CoreError::Config(format!("{name} inválido: {v}"))),
    }
}

impl AppConfig {
    /// Carga `.env` (si existe) y lee las variables `INTAKE_*`.
    pub fn from_env() -> Result<Self, CoreError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Igual que `from_env` pero con una fuente de variables arbitraria.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, CoreError>
        where F: Fn(&str) -> Option<String>
    {
        let defaults = Self::default();
        let autosave_secs: Option<u64> =
            parse_var("INTAKE_AUTOSAVE_INTERVAL_SECS", lookup("INTAKE_AUTOSAVE_INTERVAL_SECS"))?;
        if autosave_secs == Some(0) {
            return Err(CoreError::Config("INTAKE_AUTOSAVE_INTERVAL_SECS debe ser mayor que 0".into()));
        }
        let persistence_ms: Option<u64> =
            parse_var("INTAKE_PERSISTENCE_TIMEOUT_MS", lookup("INTAKE_PERSISTENCE_TIMEOUT_MS"))?;
        let submission_ms: Option<u64> =
            parse_var("INTAKE_SUBMIT_TIMEOUT_MS", lookup("INTAKE_SUBMIT_TIMEOUT_MS"))?;
        let on_advance: Option<bool> = parse_var("INTAKE_AUTOSAVE_ON_ADVANCE", lookup("INTAKE_AUTOSAVE_ON_ADVANCE"))?;
        let submit_base_url = lookup("INTAKE_SUBMIT_BASE_URL").map(|v| v.trim().to_string())
                                                                .filter(|v| !v.is_empty());

        Ok(Self { autosave_interval: autosave_secs.map(Duration::from_secs)
                                                  .unwrap_or(defaults.autosave_interval),
                  persistence_timeout: persistence_ms.map(Duration::from_millis)
                                                     .unwrap_or(defaults.persistence_timeout),
                  submission_timeout: submission_ms.map(Duration::from_millis)
                                                   .unwrap_or(defaults.submission_timeout),
                  autosave_on_advance: on_advance.unwrap_or(defaults.autosave_on_advance),
                  submit_base_url })
    }

    pub fn session_options(&self) -> SessionOptions {
        SessionOptions::default().with_persistence_timeout(self.persistence_timeout)
                                 .with_submission_timeout(self.submission_timeout)
                                 .with_autosave_on_advance(self.autosave_on_advance)
    }
}

/// Configuración global. Si el entorno es inválido se usan los valores por
/// defecto y se emite un `warn!`.
pub static CONFIG: Lazy<AppConfig> = Lazy::new(|| {
    AppConfig::from_env().unwrap_or_else(|err| {
                             warn!("config:invalid err={} -> usando valores por defecto", err);
                             AppConfig::default()
                         })
});

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_when_nothing_is_set() {
        let cfg = AppConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(cfg, AppConfig::default());
        assert_eq!(cfg.autosave_interval, Duration::from_secs(30));
        assert!(cfg.submit_base_url.is_none());
    }

    #[test]
    fn reads_overrides() {
        let cfg = AppConfig::from_lookup(lookup(&[("INTAKE_AUTOSAVE_INTERVAL_SECS", "10"),
                                                  ("INTAKE_PERSISTENCE_TIMEOUT_MS", "750"),
                                                  ("INTAKE_AUTOSAVE_ON_ADVANCE", "false"),
                                                  ("INTAKE_SUBMIT_BASE_URL", " http://localhost:8080/api ")])).unwrap();
        assert_eq!(cfg.autosave_interval, Duration::from_secs(10));
        assert_eq!(cfg.persistence_timeout, Duration::from_millis(750));
        assert_eq!(cfg.submission_timeout, Duration::from_millis(15_000));
        assert!(!cfg.autosave_on_advance);
        assert_eq!(cfg.submit_base_url.as_deref(), Some("http://localhost:8080/api"));

        let opts = cfg.session_options();
        assert_eq!(opts.persistence_timeout, Duration::from_millis(750));
        assert!(!opts.autosave_on_advance);
    }

    #[test]
    fn rejects_garbage_and_zero_interval() {
        let err = AppConfig::from_lookup(lookup(&[("INTAKE_SUBMIT_TIMEOUT_MS", "soon")])).unwrap_err();
        assert_eq!(err.to_string(), "Error de configuración: INTAKE_SUBMIT_TIMEOUT_MS inválido: soon");
        assert!(matches!(AppConfig::from_lookup(lookup(&[("INTAKE_AUTOSAVE_INTERVAL_SECS", "0")])),
                         Err(CoreError::Config(_))));
    }
}
