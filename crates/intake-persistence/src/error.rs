//! Errores del backend Postgres.
//! Mapea errores de Diesel / conexión a variantes semánticas y luego al
//! `PersistenceError` del core, que es lo único que ve el motor.

use diesel::result::{DatabaseErrorKind, Error as DieselError};
use intake_core::PersistenceError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PgStoreError {
    #[error("configuration error: {0}")]
    Config(String),
    #[error("check violation: {0}")]
    CheckViolation(String),
    #[error("serialization conflict (retryable)")]
    SerializationConflict,
    #[error("transient IO / connection pool error: {0}")]
    TransientIo(String),
    #[error("draft payload error: {0}")]
    Payload(String),
    #[error("unknown database error: {0}")]
    Unknown(String),
}

impl From<DieselError> for PgStoreError {
    fn from(err: DieselError) -> Self {
        match err {
            DieselError::DatabaseError(kind, info) => match kind {
                DatabaseErrorKind::CheckViolation => Self::CheckViolation(info.message().to_string()),
                DatabaseErrorKind::SerializationFailure => Self::SerializationConflict,
                DatabaseErrorKind::ClosedConnection => Self::TransientIo(info.message().to_string()),
                other => Self::Unknown(format!("db error kind {:?}: {}", other, info.message())),
            },
            DieselError::DeserializationError(e) => Self::Payload(format!("deser: {e}")),
            DieselError::SerializationError(e) => Self::Payload(format!("ser: {e}")),
            DieselError::BrokenTransactionManager => Self::TransientIo("broken transaction manager".into()),
            other => Self::Unknown(format!("unhandled diesel error: {other:?}")),
        }
    }
}

impl From<serde_json::Error> for PgStoreError {
    fn from(err: serde_json::Error) -> Self {
        Self::Payload(err.to_string())
    }
}

impl From<PgStoreError> for PersistenceError {
    fn from(err: PgStoreError) -> Self {
        match err {
            PgStoreError::TransientIo(_) | PgStoreError::SerializationConflict | PgStoreError::Config(_) => {
                PersistenceError::Unavailable(err.to_string())
            }
            PgStoreError::Payload(msg) => PersistenceError::Serialization(msg),
            PgStoreError::CheckViolation(_) | PgStoreError::Unknown(_) => PersistenceError::Backend(err.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maps_into_core_error() {
        assert!(matches!(PersistenceError::from(PgStoreError::TransientIo("pool".into())),
                         PersistenceError::Unavailable(_)));
        assert_eq!(PersistenceError::from(PgStoreError::Payload("bad json".into())),
                   PersistenceError::Serialization("bad json".into()));
        assert!(matches!(PersistenceError::from(PgStoreError::from(DieselError::NotFound)),
                         PersistenceError::Backend(_)));
    }
}
