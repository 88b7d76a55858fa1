use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Resultado de validar un paso. `valid` es falso si y sólo si hay al menos
/// un error; las advertencias nunca bloquean.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationResult {
    pub valid: bool,
    pub field_errors: BTreeMap<String, Vec<String>>,
    pub warnings: BTreeMap<String, Vec<String>>,
}

impl Default for ValidationResult {
    fn default() -> Self {
        Self::ok()
    }
}

impl ValidationResult {
    pub fn ok() -> Self {
        Self { valid: true,
               field_errors: BTreeMap::new(),
               warnings: BTreeMap::new() }
    }

    /// Resultado con un único error.
    pub fn with_error(field: impl Into<String>, message: impl Into<String>) -> Self {
        let mut r = Self::ok();
        r.add_error(field, message);
        r
    }

    pub fn add_error(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.field_errors.entry(field.into()).or_default().push(message.into());
        self.valid = false;
    }

    pub fn add_warning(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.warnings.entry(field.into()).or_default().push(message.into());
    }

    /// Incorpora errores y advertencias de otro resultado.
    pub fn merge(&mut self, other: ValidationResult) {
        for (field, messages) in other.field_errors {
            self.field_errors.entry(field).or_default().extend(messages);
        }
        for (field, messages) in other.warnings {
            self.warnings.entry(field).or_default().extend(messages);
        }
        self.valid = self.field_errors.is_empty();
    }

    pub fn is_valid(&self) -> bool {
        self.valid
    }

    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }

    /// Cantidad de campos con error.
    pub fn error_count(&self) -> usize {
        self.field_errors.len()
    }

    pub fn errors_for(&self, field: &str) -> &[String] {
        self.field_errors.get(field).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn error_fields(&self) -> Vec<String> {
        self.field_errors.keys().cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn warnings_do_not_invalidate() {
        let mut r = ValidationResult::ok();
        r.add_warning("notes", "consider adding notes");
        assert!(r.is_valid());
        assert!(r.has_warnings());
    }

    #[test]
    fn merge_accumulates_messages_per_field() {
        let mut a = ValidationResult::with_error("email", "required");
        let mut b = ValidationResult::with_error("email", "invalid");
        b.add_error("address.city", "required");
        b.add_warning("phone", "unusual format");
        a.merge(b);
        assert!(!a.is_valid());
        assert_eq!(a.errors_for("email"), ["required".to_string(), "invalid".to_string()]);
        assert_eq!(a.error_count(), 2);
        assert_eq!(a.warnings.len(), 1);
    }

    #[test]
    fn serializes_with_camel_case_keys() {
        let r = ValidationResult::with_error("preferredDate", "in the past");
        let v = serde_json::to_value(&r).expect("serialize");
        assert_eq!(v["valid"], serde_json::json!(false));
        assert_eq!(v["fieldErrors"]["preferredDate"][0], serde_json::json!("in the past"));
    }
}
