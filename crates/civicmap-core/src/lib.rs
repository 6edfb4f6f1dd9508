//! Shared foundation for the Civicmap backend.
//!
//! Defines the unified error type, configuration schemas, pagination types,
//! and the traits that decouple the business services from infrastructure.

pub mod config;
pub mod error;
pub mod result;
pub mod traits;
pub mod types;

pub use error::{AppError, ErrorKind};
pub use result::AppResult;
