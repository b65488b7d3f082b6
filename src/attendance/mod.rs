pub mod aggregate;
pub mod payroll;
pub mod recorder;
pub mod store;
pub mod validator;
