//! Constantes del motor de wizards.

/// Versión del formato serializado de `DraftRecord`.
pub const DRAFT_FORMAT_VERSION: u32 = 1;

/// Clave de error para problemas del payload completo (no de un campo).
pub const ROOT_FIELD: &str = "_root";
