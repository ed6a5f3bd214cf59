pub mod collection;
pub mod record;

pub use collection::create as beneficiary_create;
pub use collection::create_random as beneficiary_create_random;
pub use collection::list as beneficiary_list;

pub use record::delete as beneficiary_delete;
pub use record::get as beneficiary_get;
pub use record::patch as beneficiary_patch;
pub use record::put as beneficiary_put;
