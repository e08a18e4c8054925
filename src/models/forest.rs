//! Decision-tree ensemble evaluated by majority vote.
//!
//! Trees are stored the way they were exported from training: internal nodes
//! split on `features[feature] <= threshold` (left) versus `>` (right), and
//! leaves carry a class label. A NaN feature fails the `<=` test and therefore
//! always goes right. Split indices are checked when a `Forest` is built or
//! deserialized.

use std::collections::BTreeMap;

use serde::Deserialize;

use crate::domain::{FEATURE_LEN, Label};

/// Internal split node.
#[derive(Debug, Clone, Deserialize)]
pub struct Split {
    /// Index into the feature vector.
    pub feature: usize,
    pub threshold: f64,
    pub left: Box<TreeNode>,
    pub right: Box<TreeNode>,
}

/// Terminal node carrying the predicted label.
#[derive(Debug, Clone, Deserialize)]
pub struct Leaf {
    pub label: i64,
}

/// A node in a decision tree (either a split or a leaf).
#[derive(Debug, Clone, Deserialize)]
pub enum TreeNode {
    Split(Split),
    Leaf(Leaf),
}

impl TreeNode {
    /// Leaves have depth 0; splits are 1 + the deeper child.
    pub fn depth(&self) -> usize {
        match self {
            TreeNode::Leaf(_) => 0,
            TreeNode::Split(split) => 1 + split.left.depth().max(split.right.depth()),
        }
    }

    pub fn predict(&self, features: &[f64]) -> Label {
        let mut node = self;
        loop {
            match node {
                TreeNode::Leaf(leaf) => return Label(leaf.label),
                TreeNode::Split(split) => {
                    // A missing feature behaves like NaN and goes right.
                    let value = features.get(split.feature).copied().unwrap_or(f64::NAN);
                    node = if value <= split.threshold {
                        &split.left
                    } else {
                        &split.right
                    };
                }
            }
        }
    }

    fn check_features(&self) -> Result<(), String> {
        match self {
            TreeNode::Leaf(_) => Ok(()),
            TreeNode::Split(split) => {
                if split.feature >= FEATURE_LEN {
                    return Err(format!(
                        "split on feature index {} but only {FEATURE_LEN} features exist",
                        split.feature
                    ));
                }
                if split.threshold.is_nan() {
                    return Err(format!("split on feature {} has a NaN threshold", split.feature));
                }
                split.left.check_features()?;
                split.right.check_features()
            }
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
struct ForestSpec {
    trees: Vec<TreeNode>,
}

/// A validated forest of decision trees.
#[derive(Debug, Clone, Deserialize)]
#[serde(try_from = "ForestSpec")]
pub struct Forest {
    trees: Vec<TreeNode>,
}

impl TryFrom<ForestSpec> for Forest {
    type Error = String;

    fn try_from(spec: ForestSpec) -> Result<Self, Self::Error> {
        Forest::new(spec.trees)
    }
}

impl Forest {
    /// Build a forest, rejecting empty forests and out-of-range splits.
    pub fn new(trees: Vec<TreeNode>) -> Result<Self, String> {
        let forest = Self { trees };
        forest.validate()?;
        Ok(forest)
    }

    pub fn trees(&self) -> &[TreeNode] {
        &self.trees
    }

    /// Majority vote across trees; ties go to the smallest label.
    pub fn predict(&self, features: &[f64]) -> Label {
        let mut votes: BTreeMap<Label, usize> = BTreeMap::new();
        for tree in &self.trees {
            *votes.entry(tree.predict(features)).or_insert(0) += 1;
        }

        // BTreeMap iterates in ascending label order, so a strict `>` keeps the
        // smallest label among equal counts.
        let mut best = Label(0);
        let mut best_votes = 0;
        for (label, count) in votes {
            if count > best_votes {
                best = label;
                best_votes = count;
            }
        }
        best
    }

    pub fn max_depth(&self) -> usize {
        self.trees.iter().map(TreeNode::depth).max().unwrap_or(0)
    }

    fn validate(&self) -> Result<(), String> {
        if self.trees.is_empty() {
            return Err("forest has no trees".to_string());
        }
        for (i, tree) in self.trees.iter().enumerate() {
            tree.check_features().map_err(|e| format!("tree {i}: {e}"))?;
        }
        Ok(())
    }
}
