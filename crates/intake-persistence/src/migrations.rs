//! Wrapper para correr migraciones embebidas (`migrations/` de este crate).
//! Se ejecutan una vez al construir el pool.

use crate::error::PgStoreError;
use diesel::pg::PgConnection;
use diesel_migrations::{embed_migrations, EmbeddedMigrations, MigrationHarness};

pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!();

pub fn run_pending_migrations(conn: &mut PgConnection) -> Result<(), PgStoreError> {
    conn.run_pending_migrations(MIGRATIONS)
        .map(|_| ())
        .map_err(|e| PgStoreError::Unknown(format!("migration error: {e}")))
}
