pub mod beneficiary_service;
pub mod validation;

pub use beneficiary_service::{BeneficiaryError, BeneficiaryService};
pub use validation::{BeneficiaryPayload, BeneficiarySchema, FieldErrors};
