//! intake-persistence
//!
//! Implementación Postgres (Diesel) del `DraftStore` del core.
//!
//! Módulos:
//! - `pg`: `PgDraftStore` (upsert por `wizard_id`, payload JSONB) y
//!   utilidades de pool.
//! - `migrations`: runner embebido de migraciones Diesel.
//! - `config`: carga de configuración desde .env.
//! - `schema`: tablas Diesel declaradas para compilar queries.

pub mod config;
pub mod error;
pub mod migrations;
pub mod pg;
pub mod schema;

pub use config::{init_dotenv, DbConfig};
pub use error::PgStoreError;
pub use pg::{build_pool, build_pool_from_env, ConnectionProvider, PgDraftStore, PgPool, PoolProvider};
