//! Solicitud de consulta: `personalInfo → details → review`.

use intake_core::{Assembler, AssemblyError, Clock, ConfigurationError, FieldRule, StepSchema, StepSpec, SystemClock,
                  WizardDefinition, WizardState};
use intake_domain::{ConsultationDetails, ConsultationRequest, ConsultationType, ContactDetails, PreferredTime};
use serde::Deserialize;
use std::sync::Arc;

use super::domain_to_assembly;

pub const PERSONAL_INFO: &str = "personalInfo";
pub const DETAILS: &str = "details";
pub const REVIEW: &str = "review";

pub fn personal_info_schema() -> StepSchema {
    StepSchema::new().field(FieldRule::new("firstName").required().string().min_len(2))
                     .field(FieldRule::new("lastName").required().string().min_len(2))
                     .field(FieldRule::new("email").required_with("Email is required").email())
                     .field(FieldRule::new("phone").required_with("Phone number is required").phone())
                     .field(FieldRule::new("dateOfBirth").date().not_after_today())
}

pub fn details_schema() -> StepSchema {
    StepSchema::new().field(FieldRule::new("consultationType").required()
                                                              .one_of(ConsultationType::ALL.iter().map(|t| t.as_str())))
                     .field(FieldRule::new("preferredDate").required().date().not_before_today())
                     .field(FieldRule::new("preferredTime").required()
                                                           .one_of(PreferredTime::ALL.iter().map(|t| t.as_str())))
                     .field(FieldRule::new("concerns").required()
                                                      .min_len(10)
                                                      .message("Please describe your concerns in at least 10 characters"))
                     .warn_if_empty("additionalNotes", "Additional notes help us prepare for your consultation")
}

pub fn review_schema() -> StepSchema {
    StepSchema::new().field(FieldRule::new("confirmed").required_with("Please confirm the information is correct")
                                                       .boolean()
                                                       .must_be_true()
                                                       .message("Please confirm the information is correct"))
}

pub fn consultation_definition() -> Result<WizardDefinition, ConfigurationError> {
    WizardDefinition::builder().step(StepSpec::new(PERSONAL_INFO, "Personal information", personal_info_schema()))
                               .step(StepSpec::new(DETAILS, "Consultation details", details_schema()))
                               .step(StepSpec::new(REVIEW, "Review and confirm", review_schema()))
                               .build()
}

#[derive(Debug, Deserialize)]
struct ReviewPayload {
    confirmed: bool,
}

/// Assembler de `ConsultationRequest`. Re-chequea la fecha preferida contra
/// el reloj: un borrador reanudado días después puede haber quedado en el
/// pasado.
#[derive(Debug, Clone)]
pub struct ConsultationAssembler {
    clock: Arc<dyn Clock>,
}

impl Default for ConsultationAssembler {
    fn default() -> Self {
        Self::new(Arc::new(SystemClock))
    }
}

impl ConsultationAssembler {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self { clock }
    }
}

impl Assembler for ConsultationAssembler {
    type Output = ConsultationRequest;

    fn merge(&self, _definition: &WizardDefinition, state: &WizardState) -> Result<ConsultationRequest, AssemblyError> {
        let contact: ContactDetails = state.require_payload(PERSONAL_INFO)?;
        let details: ConsultationDetails = state.require_payload(DETAILS)?;
        let review: ReviewPayload = state.require_payload(REVIEW)?;
        let request = ConsultationRequest::new(contact, details, review.confirmed).map_err(domain_to_assembly)?;
        request.validate(self.clock.today()).map_err(domain_to_assembly)?;
        Ok(request)
    }
}
