pub mod constants;
pub mod errors;
pub mod file_operations;
pub mod types;
