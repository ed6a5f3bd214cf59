pub mod beneficiary;

pub use beneficiary::{Beneficiary, BeneficiaryChanges, NewBeneficiary};
