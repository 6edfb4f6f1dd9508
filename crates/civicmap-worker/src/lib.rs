//! Background job processing for Civicmap.
//!
//! The HTTP layer hands work to a PostgreSQL-backed queue; a polling runner
//! claims jobs and dispatches them to registered handlers. The only job type
//! today is outbound email delivery.

pub mod executor;
pub mod jobs;
pub mod mailer;
pub mod queue;
pub mod runner;
