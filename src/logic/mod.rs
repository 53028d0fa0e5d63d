//! Scoring logic: feature layout, artifacts, models and explanations

pub mod artifacts;
pub mod explain;
pub mod features;
pub mod model;
pub mod report;

pub use artifacts::Artifacts;
