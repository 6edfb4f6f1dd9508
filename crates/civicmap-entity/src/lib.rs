//! Domain entity models for Civicmap.
//!
//! Plain data structs mapped to PostgreSQL rows via `sqlx::FromRow`;
//! status enums are PostgreSQL enum types via `sqlx::Type`.

pub mod collaboration;
pub mod incident;
pub mod job;
pub mod notification;
pub mod user;
