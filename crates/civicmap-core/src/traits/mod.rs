//! Cross-crate trait seams.

pub mod mailer;

pub use mailer::{EmailMessage, Mailer};
