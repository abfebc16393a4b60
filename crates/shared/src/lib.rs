pub mod constants;
pub mod role;
pub mod validation;
