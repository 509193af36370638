//! Gradient-boosted regression tree ensemble
//!
//! Each tree is stored as a flat node list with the root at index 0. A split
//! sends a feature vector left when `x[feature] < threshold`; missing values
//! (`NaN`) follow the split's default direction. The prediction is the base
//! score plus the sum of the reached leaves.

use crate::error::{ForecastError, Result};
use crate::models::{check_width, RegressionModel};
use serde::{Deserialize, Serialize};

/// Internal decision node
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Split {
    /// Index of the feature tested
    pub feature: usize,
    /// Values strictly below go left
    pub threshold: f64,
    /// Index of the left child
    pub left: usize,
    /// Index of the right child
    pub right: usize,
    /// Direction taken when the feature is missing
    #[serde(default)]
    pub default_left: bool,
}

/// Terminal node
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Leaf {
    pub value: f64,
}

/// Node of a regression tree
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TreeNode {
    Split(Split),
    Leaf(Leaf),
}

/// Single regression tree
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegressionTree {
    pub nodes: Vec<TreeNode>,
}

impl RegressionTree {
    /// Leaf value reached by a feature vector.
    ///
    /// A path visits each node at most once, so a walk longer than the node
    /// list means the tree is malformed.
    fn evaluate(&self, features: &[f64]) -> Result<f64> {
        let mut index = 0;
        for _ in 0..self.nodes.len() {
            let node = self.nodes.get(index).ok_or_else(|| {
                ForecastError::ComputationError(format!("Tree node {} does not exist", index))
            })?;

            match node {
                TreeNode::Leaf(leaf) => return Ok(leaf.value),
                TreeNode::Split(split) => {
                    let x = *features.get(split.feature).ok_or_else(|| {
                        ForecastError::ComputationError(format!(
                            "Tree node {} tests missing feature {}",
                            index, split.feature
                        ))
                    })?;
                    let go_left = if x.is_nan() {
                        split.default_left
                    } else {
                        x < split.threshold
                    };
                    index = if go_left { split.left } else { split.right };
                }
            }
        }

        Err(ForecastError::ComputationError(
            "Tree traversal did not reach a leaf".to_string(),
        ))
    }

    /// Children must come after their parent so traversal always terminates
    fn validate(&self, n_features: usize) -> std::result::Result<(), String> {
        if self.nodes.is_empty() {
            return Err("tree has no nodes".to_string());
        }

        for (index, node) in self.nodes.iter().enumerate() {
            match node {
                TreeNode::Leaf(leaf) => {
                    if !leaf.value.is_finite() {
                        return Err(format!("leaf {} has a non-finite value", index));
                    }
                }
                TreeNode::Split(split) => {
                    if split.feature >= n_features {
                        return Err(format!(
                            "node {} tests feature {} but the model has {} features",
                            index, split.feature, n_features
                        ));
                    }
                    for child in [split.left, split.right] {
                        if child <= index || child >= self.nodes.len() {
                            return Err(format!(
                                "node {} has invalid child index {}",
                                index, child
                            ));
                        }
                    }
                }
            }
        }

        Ok(())
    }
}

/// Additive ensemble of regression trees
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TreeEnsemble {
    /// Constant added to the sum of tree outputs
    pub base_score: f64,
    /// Width of the input vector
    pub n_features: usize,
    pub trees: Vec<RegressionTree>,
}

impl TreeEnsemble {
    /// Check every tree's structure against the declared width
    pub fn validate(&self) -> Result<()> {
        if !self.base_score.is_finite() {
            return Err(ForecastError::SchemaLoadError(
                "Tree ensemble has a non-finite base score".to_string(),
            ));
        }

        for (i, tree) in self.trees.iter().enumerate() {
            tree.validate(self.n_features).map_err(|e| {
                ForecastError::SchemaLoadError(format!("Tree {}: {}", i, e))
            })?;
        }

        Ok(())
    }
}

impl RegressionModel for TreeEnsemble {
    fn predict(&self, features: &[f64]) -> Result<f64> {
        check_width(self, features)?;

        let total = self
            .trees
            .iter()
            .map(|tree| tree.evaluate(features))
            .sum::<Result<f64>>()?;
        Ok(self.base_score + total)
    }

    fn n_features(&self) -> usize {
        self.n_features
    }

    fn name(&self) -> &str {
        "Gradient Boosted Trees"
    }
}
