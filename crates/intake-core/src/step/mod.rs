//! Definiciones relacionadas a Steps.
//!
//! Un Step es una página del formulario con su propio shape de datos y su
//! validador. El payload es opaco para el motor (`serde_json::Value`).

mod spec;
mod status;

pub use spec::{StepId, StepSpec};
pub use status::StepState;
