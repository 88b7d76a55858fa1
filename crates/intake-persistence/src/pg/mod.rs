//! Implementación Postgres (Diesel) de `DraftStore`.
//!
//! - Una fila por wizard en `wizard_drafts`, upsert por `wizard_id`.
//! - `payload` guarda el `DraftRecord` completo como JSONB; las demás
//!   columnas duplican campos para consultas y constraints.
//! - Diesel es bloqueante: cada operación corre en `spawn_blocking` para no
//!   detener el runtime async.
//! - Errores transitorios se reintentan con backoff corto.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use diesel::r2d2::{self, ConnectionManager};
use diesel::upsert::excluded;
use log::{debug, warn};
use serde_json::Value;
use std::sync::Arc;
use uuid::Uuid;

use intake_core::{DraftRecord, DraftStore, PersistenceError};

use crate::error::PgStoreError;
use crate::migrations::run_pending_migrations;
use crate::schema::wizard_drafts;

/// Alias de tipo para el pool r2d2 de conexiones Postgres.
pub type PgPool = r2d2::Pool<ConnectionManager<PgConnection>>;

/// Proveedor abstracto de conexiones.
///
/// Permite inyectar un pool real o simular fallas en tests sin acoplar a
/// r2d2.
pub trait ConnectionProvider: Send + Sync + 'static {
    fn connection(&self) -> Result<r2d2::PooledConnection<ConnectionManager<PgConnection>>, PgStoreError>;
}

/// Implementación concreta de `ConnectionProvider` respaldada por un `PgPool`.
pub struct PoolProvider {
    pub pool: PgPool,
}

impl ConnectionProvider for PoolProvider {
    fn connection(&self) -> Result<r2d2::PooledConnection<ConnectionManager<PgConnection>>, PgStoreError> {
        self.pool
            .get()
            .map_err(|e| PgStoreError::TransientIo(format!("pool error: {e}")))
    }
}

#[derive(Insertable, Debug)]
#[diesel(table_name = wizard_drafts)]
struct NewDraftRow<'a> {
    wizard_id: &'a Uuid,
    definition_hash: &'a str,
    format_version: i32,
    current_step_id: &'a str,
    payload: &'a Value,
    saved_at: &'a DateTime<Utc>,
}

/// Fila leída de `wizard_drafts` (orden de columnas del esquema).
#[derive(Queryable, Debug)]
pub struct DraftRow {
    pub wizard_id: Uuid,
    pub definition_hash: String,
    pub format_version: i32,
    pub current_step_id: String,
    pub payload: Value,
    pub saved_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Determina si un error es transitorio (recomendado reintentar con backoff).
fn is_retryable(e: &PgStoreError) -> bool {
    match e {
        PgStoreError::SerializationConflict | PgStoreError::TransientIo(_) => true,
        PgStoreError::Unknown(msg) => {
            let m = msg.to_lowercase();
            m.contains("deadlock detected")
            || m.contains("terminating connection due to administrator command")
            || m.contains("connection closed")
            || m.contains("connection refused")
            || m.contains("timeout")
        }
        _ => false,
    }
}

/// Retry con backoff lineal (hasta 3 reintentos: 15ms, 30ms, 45ms). Emite
/// `warn!` por intento.
fn with_retry<F, T>(mut f: F) -> Result<T, PgStoreError>
    where F: FnMut() -> Result<T, PgStoreError>
{
    let mut attempts = 0;
    loop {
        match f() {
            Err(e) if is_retryable(&e) && attempts < 3 => {
                let delay_ms = 15 * ((attempts + 1) as u64);
                warn!("retryable error (attempt {}): {:?} -> sleeping {}ms", attempts + 1, e, delay_ms);
                std::thread::sleep(std::time::Duration::from_millis(delay_ms));
                attempts += 1;
            }
            r => return r,
        }
    }
}

/// Corre trabajo Diesel fuera del runtime async.
async fn blocking<F, T>(f: F) -> Result<T, PgStoreError>
    where F: FnOnce() -> Result<T, PgStoreError> + Send + 'static,
          T: Send + 'static
{
    tokio::task::spawn_blocking(f).await
                                  .map_err(|e| PgStoreError::TransientIo(format!("blocking task failed: {e}")))?
}

/// `DraftStore` sobre Postgres.
pub struct PgDraftStore<P: ConnectionProvider> {
    provider: Arc<P>,
}

impl<P: ConnectionProvider> Clone for PgDraftStore<P> {
    fn clone(&self) -> Self {
        Self { provider: Arc::clone(&self.provider) }
    }
}

impl<P: ConnectionProvider> PgDraftStore<P> {
    pub fn new(provider: P) -> Self {
        Self { provider: Arc::new(provider) }
    }

    /// Borra borradores guardados antes de `cutoff` (retención). Devuelve
    /// cuántos se eliminaron.
    pub async fn purge_saved_before(&self, cutoff: DateTime<Utc>) -> Result<usize, PgStoreError> {
        let provider = Arc::clone(&self.provider);
        let removed = blocking(move || {
                          with_retry(|| {
                              let mut conn = provider.connection()?;
                              Ok(diesel::delete(wizard_drafts::table.filter(wizard_drafts::saved_at.lt(cutoff)))
                                  .execute(&mut conn)?)
                          })
                      }).await?;
        debug!("purge_drafts:ok cutoff={} removed={}", cutoff, removed);
        Ok(removed)
    }

    /// Lee la fila cruda (columnas denormalizadas incluidas).
    pub async fn load_row(&self, wizard_id: Uuid) -> Result<Option<DraftRow>, PgStoreError> {
        let provider = Arc::clone(&self.provider);
        blocking(move || {
            with_retry(|| {
                let mut conn = provider.connection()?;
                Ok(wizard_drafts::table.filter(wizard_drafts::wizard_id.eq(wizard_id))
                                       .first::<DraftRow>(&mut conn)
                                       .optional()?)
            })
        }).await
    }
}

#[async_trait]
impl<P: ConnectionProvider> DraftStore for PgDraftStore<P> {
    async fn save(&self, draft: &DraftRecord) -> Result<(), PersistenceError> {
        debug!("save_draft:pg wizard_id={} step={}", draft.wizard_id, draft.current_step_id);
        let payload = serde_json::to_value(draft)?;
        let draft = draft.clone();
        let provider = Arc::clone(&self.provider);
        blocking(move || {
            with_retry(|| {
                let mut conn = provider.connection()?;
                let row = NewDraftRow { wizard_id: &draft.wizard_id,
                                        definition_hash: &draft.definition_hash,
                                        format_version: draft.format_version as i32,
                                        current_step_id: &draft.current_step_id,
                                        payload: &payload,
                                        saved_at: &draft.saved_at };
                diesel::insert_into(wizard_drafts::table).values(&row)
                                                         .on_conflict(wizard_drafts::wizard_id)
                                                         .do_update()
                                                         .set((wizard_drafts::definition_hash
                                                               .eq(excluded(wizard_drafts::definition_hash)),
                                                               wizard_drafts::format_version
                                                               .eq(excluded(wizard_drafts::format_version)),
                                                               wizard_drafts::current_step_id
                                                               .eq(excluded(wizard_drafts::current_step_id)),
                                                               wizard_drafts::payload.eq(excluded(wizard_drafts::payload)),
                                                               wizard_drafts::saved_at.eq(excluded(wizard_drafts::saved_at)),
                                                               wizard_drafts::updated_at.eq(diesel::dsl::now)))
                                                         .execute(&mut conn)?;
                Ok(())
            })
        }).await
          .map_err(PersistenceError::from)
    }

    async fn load(&self, wizard_id: Uuid) -> Result<Option<DraftRecord>, PersistenceError> {
        let Some(row) = self.load_row(wizard_id).await? else {
            return Ok(None);
        };
        let draft: DraftRecord = serde_json::from_value(row.payload)?;
        Ok(Some(draft))
    }

    async fn delete(&self, wizard_id: Uuid) -> Result<bool, PersistenceError> {
        let provider = Arc::clone(&self.provider);
        let removed = blocking(move || {
                          with_retry(|| {
                              let mut conn = provider.connection()?;
                              Ok(diesel::delete(wizard_drafts::table.filter(wizard_drafts::wizard_id.eq(wizard_id)))
                                  .execute(&mut conn)?)
                          })
                      }).await?;
        Ok(removed > 0)
    }
}

/// Construye un pool r2d2 y corre las migraciones pendientes.
pub fn build_pool(database_url: &str, min_size: u32, max_size: u32) -> Result<PgPool, PgStoreError> {
    let validated_max = max_size.max(1);
    let final_min = min_size.max(1).min(validated_max);
    if min_size > validated_max {
        warn!("min_size > max_size ({} > {}), ajustando min=max", min_size, validated_max);
    }
    let manager = ConnectionManager::<PgConnection>::new(database_url);
    let pool = r2d2::Pool::builder().min_idle(Some(final_min))
                                    .max_size(validated_max)
                                    .build(manager)
                                    .map_err(|e| PgStoreError::TransientIo(format!("pool build: {e}")))?;
    {
        let mut conn = pool.get()
                           .map_err(|e| PgStoreError::TransientIo(format!("pool get for migrations: {e}")))?;
        run_pending_migrations(&mut conn)?;
    }
    Ok(pool)
}

/// Carga `.env`, lee `DbConfig` y construye un pool ya migrado.
pub fn build_pool_from_env() -> Result<PgPool, PgStoreError> {
    crate::config::init_dotenv();
    let cfg = crate::config::DbConfig::from_env()?;
    build_pool(&cfg.url, cfg.min_connections, cfg.max_connections)
}
