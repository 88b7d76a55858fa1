use serde::{Deserialize, Serialize};

/// Estado de un paso tal como lo muestra la grilla de navegación.
///
/// - `Current`: paso activo.
/// - `Completed`: validado y guardado al menos una vez.
/// - `Available`: se puede saltar a él sin estar completado (revisitar
///   pasos anteriores o el siguiente a la frontera completada).
/// - `Locked`: más allá de la frontera; `jump_to` lo rechaza.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepState {
    Current,
    Completed,
    Available,
    Locked,
}
