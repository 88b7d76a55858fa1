//! Esquema declarativo de un paso.
//!
//! ```ignore
//! let schema = StepSchema::new()
//!     .field(FieldRule::new("email").required().email())
//!     .field(FieldRule::new("address.city").required().min_len(2))
//!     .each("medications", StepSchema::new().field(FieldRule::new("name").required()))
//!     .warn_if_empty("additionalNotes", "Notes help your therapist prepare")
//!     .check(|payload, _ctx, result| { /* reglas entre campos */ });
//! ```

use regex::Regex;
use serde_json::Value;
use std::fmt;
use std::sync::Arc;

use super::path::{is_blank, join, resolve};
use crate::constants::ROOT_FIELD;
use super::{Rule, StepValidator, ValidationContext, ValidationResult};

type Check = Arc<dyn Fn(&Value, &ValidationContext, &mut ValidationResult) + Send + Sync>;

/// Reglas de un campo identificado por su ruta con punto.
#[derive(Debug, Clone)]
pub struct FieldRule {
    path: String,
    required: Option<String>,
    rules: Vec<(Rule, Option<String>)>,
}

impl FieldRule {
    pub fn new(path: impl Into<String>) -> Self {
        Self { path: path.into(),
               required: None,
               rules: Vec::new() }
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    /// Campo obligatorio: ausente, null o vacío reporta error y no evalúa el
    /// resto de reglas.
    pub fn required(mut self) -> Self {
        self.required = Some("This field is required".to_string());
        self
    }

    pub fn required_with(mut self, message: impl Into<String>) -> Self {
        self.required = Some(message.into());
        self
    }

    pub fn rule(mut self, rule: Rule) -> Self {
        self.rules.push((rule, None));
        self
    }

    /// Reemplaza el mensaje de la última regla añadida.
    pub fn message(mut self, message: impl Into<String>) -> Self {
        if let Some(last) = self.rules.last_mut() {
            last.1 = Some(message.into());
        }
        self
    }

    pub fn string(self) -> Self {
        self.rule(Rule::String)
    }

    pub fn boolean(self) -> Self {
        self.rule(Rule::Boolean)
    }

    pub fn number(self) -> Self {
        self.rule(Rule::Number)
    }

    pub fn array(self) -> Self {
        self.rule(Rule::Array)
    }

    pub fn date(self) -> Self {
        self.rule(Rule::Date)
    }

    pub fn min_len(self, min: usize) -> Self {
        self.rule(Rule::MinLen(min))
    }

    pub fn max_len(self, max: usize) -> Self {
        self.rule(Rule::MaxLen(max))
    }

    pub fn email(self) -> Self {
        self.rule(Rule::Email)
    }

    pub fn phone(self) -> Self {
        self.rule(Rule::Phone)
    }

    pub fn pattern(self, regex: Regex) -> Self {
        self.rule(Rule::Pattern(regex))
    }

    pub fn one_of<I, S>(self, options: I) -> Self
        where I: IntoIterator<Item = S>,
              S: Into<String>
    {
        self.rule(Rule::OneOf(options.into_iter().map(Into::into).collect()))
    }

    pub fn range(self, min: Option<f64>, max: Option<f64>) -> Self {
        self.rule(Rule::Range { min, max })
    }

    pub fn must_be_true(self) -> Self {
        self.rule(Rule::MustBeTrue)
    }

    pub fn not_before_today(self) -> Self {
        self.rule(Rule::NotBeforeToday)
    }

    pub fn not_after_today(self) -> Self {
        self.rule(Rule::NotAfterToday)
    }

    pub fn min_items(self, min: usize) -> Self {
        self.rule(Rule::MinItems(min))
    }

    fn apply(&self, root: &Value, prefix: &str, ctx: &ValidationContext, out: &mut ValidationResult) {
        let key = join(prefix, &self.path);
        let value = resolve(root, &self.path);
        if is_blank(value) {
            if let Some(msg) = &self.required {
                out.add_error(key, msg.clone());
            }
            return;
        }
        let Some(value) = value else { return };
        for (rule, custom) in &self.rules {
            if let Err(default_msg) = rule.check(value, ctx) {
                out.add_error(key.clone(), custom.clone().unwrap_or(default_msg));
                if rule.is_type_check() {
                    break;
                }
            }
        }
    }
}

/// Esquema de un paso: reglas de campos, reglas por elemento de arreglo,
/// advertencias y chequeos entre campos.
#[derive(Clone, Default)]
pub struct StepSchema {
    fields: Vec<FieldRule>,
    items: Vec<(String, StepSchema)>,
    warnings: Vec<(String, String)>,
    checks: Vec<Check>,
}

impl fmt::Debug for StepSchema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StepSchema")
         .field("fields", &self.fields)
         .field("items", &self.items)
         .field("warnings", &self.warnings)
         .field("checks", &self.checks.len())
         .finish()
    }
}

impl StepSchema {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn field(mut self, rule: FieldRule) -> Self {
        self.fields.push(rule);
        self
    }

    /// Aplica `schema` a cada elemento del arreglo en `path`. Los errores se
    /// reportan como `path.<i>.<campo>`.
    pub fn each(mut self, path: impl Into<String>, schema: StepSchema) -> Self {
        self.items.push((path.into(), schema));
        self
    }

    pub fn warn_if_empty(mut self, path: impl Into<String>, message: impl Into<String>) -> Self {
        self.warnings.push((path.into(), message.into()));
        self
    }

    pub fn check<F>(mut self, f: F) -> Self
        where F: Fn(&Value, &ValidationContext, &mut ValidationResult) + Send + Sync + 'static
    {
        self.checks.push(Arc::new(f));
        self
    }

    pub fn validate_at(&self, root: &Value, prefix: &str, ctx: &ValidationContext, out: &mut ValidationResult) {
        if !root.is_object() && !self.fields.is_empty() {
            out.add_error(if prefix.is_empty() { ROOT_FIELD } else { prefix }, "Expected an object");
            return;
        }
        for field in &self.fields {
            field.apply(root, prefix, ctx, out);
        }
        for (path, schema) in &self.items {
            if let Some(Value::Array(elements)) = resolve(root, path) {
                let base = join(prefix, path);
                for (i, element) in elements.iter().enumerate() {
                    schema.validate_at(element, &join(&base, &i.to_string()), ctx, out);
                }
            }
        }
        for (path, message) in &self.warnings {
            if is_blank(resolve(root, path)) {
                out.add_warning(join(prefix, path), message.clone());
            }
        }
        for check in &self.checks {
            let mut local = ValidationResult::ok();
            check(root, ctx, &mut local);
            merge_prefixed(out, local, prefix);
        }
    }
}

/// Los chequeos ven el elemento como raíz; sus claves se reubican bajo
/// `prefix`.
fn merge_prefixed(out: &mut ValidationResult, local: ValidationResult, prefix: &str) {
    for (field, messages) in local.field_errors {
        for message in messages {
            out.add_error(join(prefix, &field), message);
        }
    }
    for (field, messages) in local.warnings {
        for message in messages {
            out.add_warning(join(prefix, &field), message);
        }
    }
}

impl StepValidator for StepSchema {
    fn validate(&self, payload: &Value, ctx: &ValidationContext) -> ValidationResult {
        let mut out = ValidationResult::ok();
        self.validate_at(payload, "", ctx, &mut out);
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use serde_json::json;

    fn ctx() -> ValidationContext {
        ValidationContext::new(NaiveDate::from_ymd_opt(2026, 10, 14).expect("date"))
    }

    fn contact_schema() -> StepSchema {
        StepSchema::new().field(FieldRule::new("firstName").required().string().min_len(2))
                         .field(FieldRule::new("email").required().email())
                         .field(FieldRule::new("address.city").required().min_len(2))
                         .field(FieldRule::new("dateOfBirth").date().not_after_today())
    }

    #[test]
    fn reports_every_invalid_field_at_once() {
        let payload = json!({"firstName": "A", "email": "nope", "address": {}});
        let r = contact_schema().validate(&payload, &ctx());
        assert!(!r.valid);
        assert_eq!(r.error_fields(), vec!["address.city", "email", "firstName"]);
    }

    #[test]
    fn optional_blank_fields_are_skipped() {
        let payload = json!({"firstName": "Ana", "email": "ana@example.org",
                             "address": {"city": "Lima"}, "dateOfBirth": ""});
        assert!(contact_schema().validate(&payload, &ctx()).valid);
    }

    #[test]
    fn type_failure_stops_remaining_rules_of_field() {
        let payload = json!({"firstName": 42, "email": "ana@example.org", "address": {"city": "Lima"}});
        let r = contact_schema().validate(&payload, &ctx());
        assert_eq!(r.errors_for("firstName"), ["Must be text".to_string()]);
    }

    #[test]
    fn custom_message_replaces_default() {
        let schema = StepSchema::new().field(FieldRule::new("concerns").required()
                                                                      .min_len(10)
                                                                      .message("Please describe your concerns in a bit more detail"));
        let r = schema.validate(&json!({"concerns": "sad"}), &ctx());
        assert_eq!(r.errors_for("concerns"), ["Please describe your concerns in a bit more detail".to_string()]);
    }

    #[test]
    fn array_items_use_indexed_paths() {
        let schema = StepSchema::new().each("medications",
                                            StepSchema::new().field(FieldRule::new("name").required())
                                                             .field(FieldRule::new("dosage").required()));
        let payload = json!({"medications": [{"name": "x", "dosage": "5mg"}, {"name": ""}]});
        let r = schema.validate(&payload, &ctx());
        assert_eq!(r.error_fields(), vec!["medications.1.dosage", "medications.1.name"]);
    }

    #[test]
    fn warnings_and_cross_field_checks() {
        let schema = StepSchema::new().warn_if_empty("additionalNotes", "Notes help")
                                      .check(|p, _ctx, out| {
                                          if p.get("password") != p.get("confirm") {
                                              out.add_error("confirm", "Does not match");
                                          }
                                      });
        let r = schema.validate(&json!({"password": "a", "confirm": "b"}), &ctx());
        assert_eq!(r.errors_for("confirm").len(), 1);
        assert!(r.warnings.contains_key("additionalNotes"));
    }

    #[test]
    fn item_checks_report_under_indexed_paths() {
        let item = StepSchema::new().field(FieldRule::new("name").required())
                                    .check(|p, _ctx, out| {
                                        if is_blank(p.get("dosage")) {
                                            out.add_error("dosage", "Dosage is required");
                                        }
                                        if is_blank(p.get("notes")) {
                                            out.add_warning("notes", "Add how often it is taken");
                                        }
                                    });
        let schema = StepSchema::new().each("items", item);
        let payload = json!({"items": [
            {"name": "a", "dosage": "5mg", "notes": "daily"},
            {"name": "b"},
            {"name": "c", "dosage": ""}
        ]});
        let r = schema.validate(&payload, &ctx());
        assert_eq!(r.error_fields(), vec!["items.1.dosage", "items.2.dosage"]);
        assert_eq!(r.errors_for("items.1.dosage"), ["Dosage is required".to_string()]);
        assert!(r.warnings.contains_key("items.1.notes"));
        assert!(!r.warnings.contains_key("notes"));
    }

    #[test]
    fn non_object_payload_is_rejected() {
        let r = contact_schema().validate(&json!("hello"), &ctx());
        assert!(r.errors_for("_root").len() == 1);
    }
}
