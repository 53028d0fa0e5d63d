//! Random Forest
//!
//! Opaque model scored on the raw (unscaled) vector. Trees are stored in
//! the flat array form produced by the training library: node `i` splits on
//! `feature[i]` at `threshold[i]`, going left when `x <= threshold`, and
//! leaves carry per-class sample weights in `value[i]`.

use serde::{Deserialize, Serialize};

use crate::logic::artifacts::{require_layout, require_positive_class, InvalidArtifact};
use crate::logic::features::{FeatureVector, FEATURE_COUNT};
use super::inference::{CreditModel, InferenceError, ModelInput, ModelKind};

/// Child index marking a leaf
const TREE_LEAF: i64 = -1;

// ============================================================================
// ARTIFACT
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TreeArtifact {
    pub children_left: Vec<i64>,
    pub children_right: Vec<i64>,
    pub feature: Vec<i64>,
    pub threshold: Vec<f64>,
    pub value: Vec<Vec<f64>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ForestArtifact {
    pub feature_names: Vec<String>,
    pub classes: Vec<i64>,
    pub trees: Vec<TreeArtifact>,
}

// ============================================================================
// TREE
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
enum Node {
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
    },
    Leaf {
        /// Fraction of the leaf's weight belonging to the positive class
        positive: f64,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct DecisionTree {
    nodes: Vec<Node>,
}

impl DecisionTree {
    fn from_artifact(
        tree: TreeArtifact,
        n_classes: usize,
        positive_index: usize,
    ) -> Result<Self, InvalidArtifact> {
        let n = tree.children_left.len();
        if n == 0 {
            return Err(InvalidArtifact("tree has no nodes".to_string()));
        }
        if tree.children_right.len() != n
            || tree.feature.len() != n
            || tree.threshold.len() != n
            || tree.value.len() != n
        {
            return Err(InvalidArtifact("tree arrays have different lengths".to_string()));
        }

        let mut nodes = Vec::with_capacity(n);
        for i in 0..n {
            let (left, right) = (tree.children_left[i], tree.children_right[i]);

            if left == TREE_LEAF && right == TREE_LEAF {
                let weights = &tree.value[i];
                if weights.len() != n_classes {
                    return Err(InvalidArtifact(format!(
                        "node {} has {} class weights, expected {}",
                        i,
                        weights.len(),
                        n_classes
                    )));
                }
                let total: f64 = weights.iter().sum();
                if !total.is_finite() || total <= 0.0 || weights.iter().any(|w| *w < 0.0) {
                    return Err(InvalidArtifact(format!("node {} has invalid class weights", i)));
                }
                nodes.push(Node::Leaf { positive: weights[positive_index] / total });
                continue;
            }

            // Children always come after their parent, which also rules out cycles
            let child = |c: i64| -> Result<usize, InvalidArtifact> {
                usize::try_from(c)
                    .ok()
                    .filter(|c| *c > i && *c < n)
                    .ok_or_else(|| InvalidArtifact(format!("node {} has invalid child {}", i, c)))
            };
            let feature = usize::try_from(tree.feature[i])
                .ok()
                .filter(|f| *f < FEATURE_COUNT)
                .ok_or_else(|| {
                    InvalidArtifact(format!("node {} splits on unknown feature {}", i, tree.feature[i]))
                })?;
            let threshold = tree.threshold[i];
            if threshold.is_nan() {
                return Err(InvalidArtifact(format!("node {} has a NaN threshold", i)));
            }

            nodes.push(Node::Split {
                feature,
                threshold,
                left: child(left)?,
                right: child(right)?,
            });
        }

        Ok(Self { nodes })
    }

    /// Positive-class fraction of the leaf `raw` falls into
    fn predict(&self, raw: &FeatureVector) -> f64 {
        let values = raw.as_array();
        let mut index = 0;

        loop {
            match self.nodes[index] {
                Node::Leaf { positive } => return positive,
                Node::Split { feature, threshold, left, right } => {
                    // Splits were learned on single-precision inputs
                    let x = f64::from(values[feature] as f32);
                    index = if x <= threshold { left } else { right };
                }
            }
        }
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }
}

// ============================================================================
// FOREST
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
pub struct RandomForestModel {
    trees: Vec<DecisionTree>,
}

impl RandomForestModel {
    pub fn tree_count(&self) -> usize {
        self.trees.len()
    }

    pub fn node_count(&self) -> usize {
        self.trees.iter().map(DecisionTree::node_count).sum()
    }
}

impl CreditModel for RandomForestModel {
    fn kind(&self) -> ModelKind {
        ModelKind::RandomForest
    }

    fn predict_probability(&self, input: &ModelInput) -> Result<f64, InferenceError> {
        let total: f64 = self.trees.iter().map(|tree| tree.predict(&input.raw)).sum();
        let p = total / self.trees.len() as f64;
        if !p.is_finite() {
            return Err(InferenceError::NonFiniteScore { model: self.kind() });
        }
        Ok(p)
    }
}

impl TryFrom<ForestArtifact> for RandomForestModel {
    type Error = InvalidArtifact;

    fn try_from(artifact: ForestArtifact) -> Result<Self, Self::Error> {
        require_layout(&artifact.feature_names)?;
        let positive_index = require_positive_class(&artifact.classes)?;
        if artifact.trees.is_empty() {
            return Err(InvalidArtifact("forest has no trees".to_string()));
        }

        let n_classes = artifact.classes.len();
        let trees = artifact
            .trees
            .into_iter()
            .enumerate()
            .map(|(t, tree)| {
                DecisionTree::from_artifact(tree, n_classes, positive_index)
                    .map_err(|e| InvalidArtifact(format!("tree {}: {}", t, e.0)))
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self { trees })
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::logic::features::{Feature, ScaledFeatureVector, FEATURE_LAYOUT};

    /// Stump splitting on `feature` at `threshold`: left leaf, right leaf
    pub(crate) fn stump(feature: Feature, threshold: f64, left: [f64; 2], right: [f64; 2]) -> TreeArtifact {
        TreeArtifact {
            children_left: vec![1, -1, -1],
            children_right: vec![2, -1, -1],
            feature: vec![feature.index() as i64, -2, -2],
            threshold: vec![threshold, -2.0, -2.0],
            value: vec![
                vec![left[0] + right[0], left[1] + right[1]],
                left.to_vec(),
                right.to_vec(),
            ],
        }
    }

    fn forest(trees: Vec<TreeArtifact>) -> RandomForestModel {
        RandomForestModel::try_from(ForestArtifact {
            feature_names: FEATURE_LAYOUT.iter().map(|s| s.to_string()).collect(),
            classes: vec![0, 1],
            trees,
        })
        .unwrap()
    }

    fn input(raw: [f64; FEATURE_COUNT]) -> ModelInput {
        ModelInput {
            raw: FeatureVector::from_values(raw),
            // Deliberately far from raw so a mix-up changes every split
            scaled: ScaledFeatureVector::from_values([-100.0; FEATURE_COUNT]),
        }
    }

    #[test]
    fn test_split_goes_left_on_equal_threshold() {
        let model = forest(vec![stump(Feature::Late90PlusDays, 1.0, [9.0, 1.0], [2.0, 8.0])]);

        let mut raw = [0.0; FEATURE_COUNT];
        raw[Feature::Late90PlusDays.index()] = 1.0;
        assert!((model.predict_probability(&input(raw)).unwrap() - 0.1).abs() < 1e-12);

        raw[Feature::Late90PlusDays.index()] = 2.0;
        assert!((model.predict_probability(&input(raw)).unwrap() - 0.8).abs() < 1e-12);
    }

    #[test]
    fn test_forest_averages_tree_probabilities() {
        let model = forest(vec![
            stump(Feature::Age, 30.5, [2.0, 8.0], [8.0, 2.0]),
            stump(Feature::MonthlyIncome, 3000.0, [4.0, 6.0], [9.0, 1.0]),
        ]);

        let mut raw = [0.0; FEATURE_COUNT];
        raw[Feature::Age.index()] = 35.0;
        raw[Feature::MonthlyIncome.index()] = 4000.0;

        // (0.2 + 0.1) / 2
        let p = model.predict_probability(&input(raw)).unwrap();
        assert!((p - 0.15).abs() < 1e-12);
        assert_eq!(model.tree_count(), 2);
    }

    #[test]
    fn test_scores_raw_vector_not_scaled() {
        let model = forest(vec![stump(Feature::Age, 30.5, [0.0, 10.0], [10.0, 0.0])]);

        let mut raw = [0.0; FEATURE_COUNT];
        raw[Feature::Age.index()] = 35.0;

        // Raw age 35 goes right (p = 0); scaled -100 would have gone left (p = 1)
        assert_eq!(model.predict_probability(&input(raw)).unwrap(), 0.0);
    }

    #[test]
    fn test_positive_class_position_follows_classes() {
        let model = RandomForestModel::try_from(ForestArtifact {
            feature_names: FEATURE_LAYOUT.iter().map(|s| s.to_string()).collect(),
            classes: vec![1, 0],
            trees: vec![stump(Feature::Age, 30.5, [3.0, 1.0], [3.0, 1.0])],
        })
        .unwrap();

        let p = model.predict_probability(&input([0.0; FEATURE_COUNT])).unwrap();
        assert!((p - 0.75).abs() < 1e-12);
    }

    #[test]
    fn test_rejects_backward_child_reference() {
        let mut tree = stump(Feature::Age, 30.5, [1.0, 1.0], [1.0, 1.0]);
        tree.children_left[0] = 0;

        let err = RandomForestModel::try_from(ForestArtifact {
            feature_names: FEATURE_LAYOUT.iter().map(|s| s.to_string()).collect(),
            classes: vec![0, 1],
            trees: vec![tree],
        })
        .unwrap_err();
        assert!(err.0.starts_with("tree 0"));
    }

    #[test]
    fn test_rejects_unknown_feature_and_empty_forest() {
        let mut tree = stump(Feature::Age, 30.5, [1.0, 1.0], [1.0, 1.0]);
        tree.feature[0] = FEATURE_COUNT as i64;
        let names: Vec<String> = FEATURE_LAYOUT.iter().map(|s| s.to_string()).collect();

        assert!(RandomForestModel::try_from(ForestArtifact {
            feature_names: names.clone(),
            classes: vec![0, 1],
            trees: vec![tree],
        })
        .is_err());

        assert!(RandomForestModel::try_from(ForestArtifact {
            feature_names: names,
            classes: vec![0, 1],
            trees: vec![],
        })
        .is_err());
    }
}
