//! Collaboration lifecycle and side-effect dispatch.

pub mod dispatch;
pub mod service;

pub use dispatch::CollaborationDispatcher;
pub use service::{CollaborationService, CreateCollaboration};
