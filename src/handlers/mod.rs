// Route handlers: extract the request, call the service, shape the response.
pub mod beneficiaries;
pub mod health;
pub mod users;

pub use beneficiaries::*;
pub use users::*;
