//! Ficha médica: `personalInfo → medicalHistory → medications →
//! emergencyContact → consent`. `medications` es opcional.

use intake_core::validation::path::resolve;
use intake_core::{Assembler, AssemblyError, ConfigurationError, FieldRule, StepSchema, StepSpec, ValidationContext,
                  ValidationResult, WizardDefinition, WizardState};
use intake_domain::{Consent, EmergencyContact, MedicalForm, MedicalHistory, Medication, PatientDetails};
use serde::Deserialize;
use serde_json::Value;

use super::domain_to_assembly;

pub const PERSONAL_INFO: &str = "personalInfo";
pub const MEDICAL_HISTORY: &str = "medicalHistory";
pub const MEDICATIONS: &str = "medications";
pub const EMERGENCY_CONTACT: &str = "emergencyContact";
pub const CONSENT: &str = "consent";

pub fn personal_info_schema() -> StepSchema {
    StepSchema::new().field(FieldRule::new("name").required().string().min_len(2))
                     .field(FieldRule::new("phone").required().phone())
                     .field(FieldRule::new("dateOfBirth").required()
                                                         .date()
                                                         .not_after_today()
                                                         .message("Date of birth cannot be in the future"))
                     .field(FieldRule::new("address.street").required())
                     .field(FieldRule::new("address.city").required().min_len(2))
                     .field(FieldRule::new("address.postalCode").required().string().min_len(3).max_len(10))
}

pub fn medical_history_schema() -> StepSchema {
    StepSchema::new().field(FieldRule::new("conditions").array())
                     .field(FieldRule::new("allergies").array())
                     .warn_if_empty("allergies", "No allergies recorded")
}

pub fn medications_schema() -> StepSchema {
    let item = StepSchema::new().field(FieldRule::new("name").required())
                                .field(FieldRule::new("dosage").required_with("Dosage is required"));
    StepSchema::new().field(FieldRule::new("items").array()).each("items", item)
}

pub fn emergency_contact_schema() -> StepSchema {
    StepSchema::new().field(FieldRule::new("name").required().min_len(2))
                     .field(FieldRule::new("relationship").required())
                     .field(FieldRule::new("phone").required().phone())
}

pub fn consent_schema() -> StepSchema {
    StepSchema::new().field(FieldRule::new("treatment").required()
                                                       .must_be_true()
                                                       .message("Treatment consent is required"))
                     .field(FieldRule::new("privacy").required()
                                                     .must_be_true()
                                                     .message("Privacy consent is required"))
                     .field(FieldRule::new("signature").required_with("Signature is required").string())
                     .check(|payload: &Value, _ctx: &ValidationContext, out: &mut ValidationResult| {
                         // firma: al menos dos caracteres visibles
                         if let Some(Value::String(sig)) = resolve(payload, "signature") {
                             let trimmed = sig.trim();
                             if !trimmed.is_empty() && trimmed.chars().count() < 2 {
                                 out.add_error("signature", "Signature is too short");
                             }
                         }
                     })
}

pub fn medical_definition() -> Result<WizardDefinition, ConfigurationError> {
    WizardDefinition::builder().step(StepSpec::new(PERSONAL_INFO, "Patient information", personal_info_schema()))
                               .step(StepSpec::new(MEDICAL_HISTORY, "Medical history", medical_history_schema()))
                               .step(StepSpec::new(MEDICATIONS, "Current medications", medications_schema()).optional())
                               .step(StepSpec::new(EMERGENCY_CONTACT, "Emergency contact", emergency_contact_schema()))
                               .step(StepSpec::new(CONSENT, "Consent", consent_schema()))
                               .build()
}

#[derive(Debug, Default, Deserialize)]
struct MedicationsPayload {
    #[serde(default)]
    items: Vec<Medication>,
}

/// Assembler de `MedicalForm`. El teléfono de emergencia que coincide con
/// el del paciente se reporta como `CrossStep` en `emergencyContact.phone`.
#[derive(Debug, Clone, Copy, Default)]
pub struct MedicalAssembler;

impl Assembler for MedicalAssembler {
    type Output = MedicalForm;

    fn merge(&self, _definition: &WizardDefinition, state: &WizardState) -> Result<MedicalForm, AssemblyError> {
        let patient: PatientDetails = state.require_payload(PERSONAL_INFO)?;
        let history: MedicalHistory = state.require_payload(MEDICAL_HISTORY)?;
        let medications = if state.is_completed(MEDICATIONS) {
            state.payload_as::<MedicationsPayload>(MEDICATIONS)?.unwrap_or_default().items
        } else {
            Vec::new()
        };
        let emergency_contact: EmergencyContact = state.require_payload(EMERGENCY_CONTACT)?;
        let consent: Consent = state.require_payload(CONSENT)?;
        let form = MedicalForm { patient,
                                 history,
                                 medications,
                                 emergency_contact,
                                 consent };
        form.validate().map_err(domain_to_assembly)?;
        Ok(form)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use intake_core::StepValidator;
    use serde_json::json;

    fn ctx() -> ValidationContext {
        ValidationContext::new(chrono::NaiveDate::from_ymd_opt(2026, 10, 14).unwrap())
    }

    #[test]
    fn nested_address_errors_use_dot_paths() {
        let res = personal_info_schema().validate(&json!({
                                                      "name": "Ana",
                                                      "phone": "+34 600 111 222",
                                                      "dateOfBirth": "2030-01-01",
                                                      "address": {"street": "Calle 1", "city": ""}
                                                  }),
                                                  &ctx());
        assert_eq!(res.error_fields(), vec!["address.city", "address.postalCode", "dateOfBirth"]);
        assert_eq!(res.errors_for("dateOfBirth"), ["Date of birth cannot be in the future".to_string()]);
    }

    #[test]
    fn medication_items_are_indexed() {
        let res = medications_schema().validate(&json!({"items": [
                                                    {"name": "Ibuprofen", "dosage": "200mg"},
                                                    {"name": "Loratadine"}
                                                ]}),
                                                &ctx());
        assert_eq!(res.error_fields(), vec!["items.1.dosage"]);
    }

    #[test]
    fn medications_step_is_optional() {
        let def = medical_definition().unwrap();
        let required: Vec<&str> = def.required_step_ids().collect();
        assert_eq!(required, vec![PERSONAL_INFO, MEDICAL_HISTORY, EMERGENCY_CONTACT, CONSENT]);
    }
}
