//! Cross-cutting services.

pub mod likes;
pub mod publish_date;
