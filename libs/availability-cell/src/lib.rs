pub mod handlers;
pub mod models;
pub mod router;
pub mod services;
pub mod timeutil;

// Re-export models and services for external use
pub use models::*;
pub use services::*;
