//! Estado mutable de una sesión de wizard.

mod types;

pub use types::{CapturedData, WizardState, WizardStatus};
