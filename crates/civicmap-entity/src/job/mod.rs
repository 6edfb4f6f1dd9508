//! Background job entity.

pub mod model;
pub mod status;

pub use model::Job;
pub use status::{JobPriority, JobStatus};
