pub mod me;

pub use me::get as user_me;
