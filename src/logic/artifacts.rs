//! Artifact Loader
//!
//! Reads the fitted scaler and both classifiers from the models directory
//! once, at startup. The result is immutable and shared read-only by every
//! request.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::logic::features::{check_layout, LayoutInfo, FEATURE_COUNT};
use crate::logic::model::forest::ForestArtifact;
use crate::logic::model::logistic::LogisticArtifact;
use crate::logic::model::scaler::ScalerArtifact;
use crate::logic::model::{CreditModel, LogisticModel, ModelKind, RandomForestModel, StandardScaler};

pub const SCALER_FILE: &str = "scaler.json";
pub const LOGISTIC_FILE: &str = "log_model.json";
pub const FOREST_FILE: &str = "rf_model.json";

// ============================================================================
// ERRORS
// ============================================================================

/// Artifact content that cannot be used
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("{0}")]
pub struct InvalidArtifact(pub String);

/// Fatal startup failure
#[derive(Debug, thiserror::Error)]
pub enum ArtifactError {
    #[error("model artifacts missing ({}); expected {}", join(.missing), join(.expected))]
    Missing {
        expected: [PathBuf; 3],
        missing: Vec<PathBuf>,
    },

    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid artifact {path}: {reason}")]
    Invalid { path: PathBuf, reason: InvalidArtifact },
}

impl ArtifactError {
    /// Operator-facing guidance
    pub fn remediation(&self) -> String {
        match self {
            ArtifactError::Missing { expected, .. } => {
                let mut text = String::from("Model files not found. Make sure these exist:\n");
                for path in expected {
                    text.push_str(&format!("- {}\n", path.display()));
                }
                text
            }
            other => format!("{}\nRe-export the artifacts from the training pipeline.", other),
        }
    }
}

fn join(paths: &[PathBuf]) -> String {
    paths
        .iter()
        .map(|p| p.display().to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

// ============================================================================
// VALIDATION HELPERS (shared by the model modules)
// ============================================================================

/// Recorded columns must match the feature layout
pub(crate) fn require_layout(names: &[String]) -> Result<(), InvalidArtifact> {
    check_layout(names).map_err(|e| InvalidArtifact(format!("feature_names mismatch: {}", e)))
}

/// Exactly one value per feature
pub(crate) fn fixed_len(field: &str, values: Vec<f64>) -> Result<[f64; FEATURE_COUNT], InvalidArtifact> {
    let len = values.len();
    <[f64; FEATURE_COUNT]>::try_from(values).map_err(|_| {
        InvalidArtifact(format!("{} has {} values, expected {}", field, len, FEATURE_COUNT))
    })
}

/// Position of class `1` in `classes`
pub(crate) fn require_positive_class(classes: &[i64]) -> Result<usize, InvalidArtifact> {
    classes
        .iter()
        .position(|c| *c == 1)
        .ok_or_else(|| InvalidArtifact(format!("positive class 1 not in classes {:?}", classes)))
}

// ============================================================================
// PATHS
// ============================================================================

/// The three files expected under one directory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactPaths {
    pub scaler: PathBuf,
    pub logistic: PathBuf,
    pub forest: PathBuf,
}

impl ArtifactPaths {
    pub fn in_dir(dir: impl AsRef<Path>) -> Self {
        let dir = dir.as_ref();
        Self {
            scaler: dir.join(SCALER_FILE),
            logistic: dir.join(LOGISTIC_FILE),
            forest: dir.join(FOREST_FILE),
        }
    }

    pub fn all(&self) -> [PathBuf; 3] {
        [self.scaler.clone(), self.logistic.clone(), self.forest.clone()]
    }

    fn missing(&self) -> Vec<PathBuf> {
        self.all().into_iter().filter(|p| !p.is_file()).collect()
    }
}

// ============================================================================
// ARTIFACTS
// ============================================================================

/// The loaded triple
#[derive(Debug)]
pub struct Artifacts {
    pub scaler: StandardScaler,
    pub logistic: LogisticModel,
    pub forest: RandomForestModel,
    pub paths: ArtifactPaths,
    pub loaded_at: DateTime<Utc>,
}

/// Loaded artifact metadata for the API
#[derive(Debug, Clone, Serialize)]
pub struct ArtifactSummary {
    pub scaler_path: String,
    pub logistic_path: String,
    pub forest_path: String,
    pub logistic_intercept: f64,
    pub forest_trees: usize,
    pub forest_nodes: usize,
    pub models: Vec<ModelKind>,
    pub layout: LayoutInfo,
    pub loaded_at: DateTime<Utc>,
}

impl Artifacts {
    /// Load all three artifacts from `dir`
    ///
    /// Presence of every file is checked before any is parsed, so a
    /// missing file is always reported as [`ArtifactError::Missing`].
    pub fn load(dir: impl AsRef<Path>) -> Result<Self, ArtifactError> {
        let paths = ArtifactPaths::in_dir(dir);

        let missing = paths.missing();
        if !missing.is_empty() {
            return Err(ArtifactError::Missing {
                expected: paths.all(),
                missing,
            });
        }

        let scaler = read_artifact::<ScalerArtifact, StandardScaler>(&paths.scaler)?;
        tracing::info!(path = %paths.scaler.display(), "scaler loaded");

        let logistic = read_artifact::<LogisticArtifact, LogisticModel>(&paths.logistic)?;
        tracing::info!(path = %paths.logistic.display(), "logistic regression loaded");

        let forest = read_artifact::<ForestArtifact, RandomForestModel>(&paths.forest)?;
        tracing::info!(
            path = %paths.forest.display(),
            trees = forest.tree_count(),
            "random forest loaded"
        );

        Ok(Self {
            scaler,
            logistic,
            forest,
            paths,
            loaded_at: Utc::now(),
        })
    }

    /// Model selected by `kind`
    pub fn model(&self, kind: ModelKind) -> &dyn CreditModel {
        match kind {
            ModelKind::Logistic => &self.logistic,
            ModelKind::RandomForest => &self.forest,
        }
    }

    pub fn summary(&self) -> ArtifactSummary {
        ArtifactSummary {
            scaler_path: self.paths.scaler.display().to_string(),
            logistic_path: self.paths.logistic.display().to_string(),
            forest_path: self.paths.forest.display().to_string(),
            logistic_intercept: self.logistic.intercept(),
            forest_trees: self.forest.tree_count(),
            forest_nodes: self.forest.node_count(),
            models: ModelKind::ALL.to_vec(),
            layout: LayoutInfo::current(),
            loaded_at: self.loaded_at,
        }
    }
}

fn read_artifact<A, T>(path: &Path) -> Result<T, ArtifactError>
where
    A: DeserializeOwned,
    T: TryFrom<A, Error = InvalidArtifact>,
{
    let bytes = std::fs::read(path).map_err(|source| ArtifactError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    let artifact: A = serde_json::from_slice(&bytes).map_err(|source| ArtifactError::Parse {
        path: path.to_path_buf(),
        source,
    })?;

    T::try_from(artifact).map_err(|reason| ArtifactError::Invalid {
        path: path.to_path_buf(),
        reason,
    })
}
