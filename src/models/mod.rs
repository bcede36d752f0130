pub mod application;
pub mod reason;
pub mod status;
