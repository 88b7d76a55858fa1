//! intake-adapters: capa de adaptación Dominio ↔ Core
//!
//! Este crate provee:
//! - Definiciones concretas de wizard (`flows::consultation`,
//!   `flows::medical`) con sus esquemas de validación por paso.
//! - Assemblers que convierten los payloads capturados en objetos de
//!   dominio (`ConsultationRequest`, `MedicalForm`).
//! - `HttpSubmitter`, colaborador de submit sobre HTTP (`POST /resource`).
//!
//! El core sólo conoce payloads `serde_json::Value` opacos; el shape de cada
//! paso vive aquí.

pub mod flows;
pub mod http;

pub use flows::consultation::{consultation_definition, ConsultationAssembler};
pub use flows::medical::{medical_definition, MedicalAssembler};
pub use http::{idempotency_key, parse_failure, HttpSubmitter, IDEMPOTENCY_HEADER};
