pub mod manager;
pub mod memory;
pub mod models;
pub mod repository;
pub mod store;

pub use manager::{DatabaseError, DatabaseManager};
pub use memory::MemoryBeneficiaryStore;
pub use repository::PgBeneficiaryStore;
pub use store::BeneficiaryStore;
