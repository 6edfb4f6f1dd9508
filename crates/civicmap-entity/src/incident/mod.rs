//! Incident entity — consumed read-only by the collaboration workflow.

pub mod model;

pub use model::{Incident, IncidentStatus};
