//! Máquina de estados del wizard.
//!
//! `WizardMachine` es el único dueño mutable de `WizardState`. Es síncrona:
//! la coordinación async (persistencia, submit, timeouts, serialización de
//! operaciones) vive en `session::WizardSession`.

mod builder;
mod core;

pub use builder::MachineBuilder;
pub use core::{Progress, StepEntry, StepOutcome, WizardMachine};
