// intake-domain library entry point
pub mod consultation;
pub mod contact;
pub mod error;
pub mod medical;
pub use consultation::{ConsultationDetails, ConsultationRequest, ConsultationType, PreferredTime};
pub use contact::{normalize_phone, Address, ContactDetails};
pub use error::DomainError;
pub use medical::{Consent, EmergencyContact, MedicalForm, MedicalHistory, Medication, PatientDetails};
