pub mod definition;
pub use definition::{build_definition, DefinitionBuilder, WizardDefinition};
