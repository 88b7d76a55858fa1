//! Ensamblado del objeto de dominio y handoff al colaborador de submit.

mod assembler;
mod submitter;

pub use assembler::{assemble, Assembler, JsonAssembler, MergeMode};
pub use submitter::{PreparedSubmission, SubmissionOutcome, SubmitReceipt, Submitter};
