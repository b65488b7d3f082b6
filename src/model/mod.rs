pub mod branch;
pub mod punch;
pub mod role;
pub mod user;
