//! Model Module - scaler, classifiers and the adapter that routes between them

pub mod forest;
pub mod inference;
pub mod logistic;
pub mod scaler;
pub mod threshold;

// Re-export common types
pub use forest::RandomForestModel;
pub use inference::{predict, CreditModel, InferenceError, ModelInput, ModelKind, Prediction};
pub use logistic::LogisticModel;
pub use scaler::StandardScaler;
pub use threshold::{Decision, DEFAULT_THRESHOLD};
