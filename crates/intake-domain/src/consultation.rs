use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::contact::ContactDetails;
use crate::DomainError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConsultationType {
    Initial,
    FollowUp,
    Assessment,
    Therapy,
}

impl ConsultationType {
    pub const ALL: [ConsultationType; 4] = [ConsultationType::Initial,
                                            ConsultationType::FollowUp,
                                            ConsultationType::Assessment,
                                            ConsultationType::Therapy];

    pub fn as_str(self) -> &'static str {
        match self {
            ConsultationType::Initial => "initial",
            ConsultationType::FollowUp => "follow_up",
            ConsultationType::Assessment => "assessment",
            ConsultationType::Therapy => "therapy",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PreferredTime {
    Morning,
    Afternoon,
    Evening,
}

impl PreferredTime {
    pub const ALL: [PreferredTime; 3] = [PreferredTime::Morning, PreferredTime::Afternoon, PreferredTime::Evening];

    pub fn as_str(self) -> &'static str {
        match self {
            PreferredTime::Morning => "morning",
            PreferredTime::Afternoon => "afternoon",
            PreferredTime::Evening => "evening",
        }
    }
}

/// Paso `details` de la solicitud.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConsultationDetails {
    pub consultation_type: ConsultationType,
    pub preferred_date: NaiveDate,
    pub preferred_time: PreferredTime,
    pub concerns: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub additional_notes: Option<String>,
}

/// Solicitud de consulta ensamblada para `POST /consultations`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConsultationRequest {
    pub contact: ContactDetails,
    pub details: ConsultationDetails,
}

impl ConsultationRequest {
    /// Construye la solicitud exigiendo la confirmación del paso `review`.
    pub fn new(contact: ContactDetails, details: ConsultationDetails, confirmed: bool) -> Result<Self, DomainError> {
        if !confirmed {
            return Err(DomainError::field("review.confirmed", "Please confirm the information is correct"));
        }
        Ok(ConsultationRequest { contact, details })
    }

    /// Reglas que dependen de más de un paso.
    pub fn validate(&self, today: NaiveDate) -> Result<(), DomainError> {
        if self.details.preferred_date < today {
            return Err(DomainError::field("details.preferredDate", "Date cannot be in the past"));
        }
        if let Some(dob) = self.contact.date_of_birth {
            if dob >= self.details.preferred_date {
                return Err(DomainError::field("personalInfo.dateOfBirth", "Date of birth must precede the consultation"));
            }
        }
        Ok(())
    }
}
