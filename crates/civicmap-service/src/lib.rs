//! Business services for Civicmap.

pub mod collaboration;
pub mod context;
pub mod notification;
