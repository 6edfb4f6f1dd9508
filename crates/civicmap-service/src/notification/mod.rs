//! Notification listing and read-flag management.

pub mod service;

pub use service::NotificationService;
