pub mod models;
pub mod services;
pub mod store;

// Re-export models and services for external use
pub use models::*;
pub use services::*;
