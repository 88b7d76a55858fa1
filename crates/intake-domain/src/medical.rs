use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::contact::{normalize_phone, Address};
use crate::DomainError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PatientDetails {
    pub name: String,
    pub phone: String,
    pub date_of_birth: NaiveDate,
    pub address: Address,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MedicalHistory {
    #[serde(default)]
    pub conditions: Vec<String>,
    #[serde(default)]
    pub allergies: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Medication {
    pub name: String,
    pub dosage: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub frequency: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmergencyContact {
    pub name: String,
    pub relationship: String,
    pub phone: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Consent {
    pub treatment: bool,
    pub privacy: bool,
    pub signature: String,
}

/// Ficha médica de admisión.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MedicalForm {
    pub patient: PatientDetails,
    pub history: MedicalHistory,
    /// Vacío si el paso opcional `medications` no se completó.
    #[serde(default)]
    pub medications: Vec<Medication>,
    pub emergency_contact: EmergencyContact,
    pub consent: Consent,
}

impl MedicalForm {
    /// Invariantes de la ficha completa. Reporta la primera violación.
    pub fn validate(&self) -> Result<(), DomainError> {
        if !self.consent.treatment {
            return Err(DomainError::field("consent.treatment", "Treatment consent is required"));
        }
        if !self.consent.privacy {
            return Err(DomainError::field("consent.privacy", "Privacy consent is required"));
        }
        if self.consent.signature.trim().is_empty() {
            return Err(DomainError::field("consent.signature", "Signature is required"));
        }
        if normalize_phone(&self.emergency_contact.phone) == normalize_phone(&self.patient.phone) {
            return Err(DomainError::field("emergencyContact.phone",
                                          "Emergency contact phone must differ from the patient's phone"));
        }
        if let Some((i, _)) = self.medications.iter().enumerate().find(|(_, m)| m.dosage.trim().is_empty()) {
            return Err(DomainError::field(format!("medications.items.{i}.dosage"), "Dosage is required"));
        }
        Ok(())
    }

    pub fn has_allergies(&self) -> bool {
        !self.history.allergies.is_empty()
    }
}
