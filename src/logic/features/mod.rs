//! Features Module - fixed feature layout and the vectors built on it

pub mod layout;
pub mod vector;

// Re-export common types
pub use layout::{check_layout, Feature, LayoutInfo, FEATURE_COUNT, FEATURE_LAYOUT};
pub use vector::{FeatureVector, ScaledFeatureVector};
