//! Data models

pub mod applicant;
pub mod score;

pub use applicant::*;
pub use score::*;
