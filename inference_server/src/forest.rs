//! Random forest classifier over the three price features.
//!
//! CART trees split on Gini impurity and are grown on bootstrap samples with a
//! random subset of features considered at each node. Class probabilities are
//! the mean of the per-tree leaf frequencies.

use feature_processing::{Features, NUM_FEATURES, TrainingSet};
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::engine::{ClassProbabilities, Classifier, TrainableClassifier};
use crate::error::ModelError;

type Row = [f64; NUM_FEATURES];

/// Splits must improve impurity by more than this.
const MIN_IMPURITY_DECREASE: f64 = 1e-12;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ForestConfig {
    pub n_trees: usize,
    /// `None` grows each tree until its leaves are pure.
    pub max_depth: Option<usize>,
    pub min_samples_split: usize,
    pub min_samples_leaf: usize,
    /// Features tried per split; `None` means `ceil(sqrt(n_features))`.
    pub max_features: Option<usize>,
    pub bootstrap: bool,
    pub seed: u64,
}

impl Default for ForestConfig {
    fn default() -> Self {
        Self {
            n_trees: 100,
            max_depth: None,
            min_samples_split: 2,
            min_samples_leaf: 1,
            max_features: None,
            bootstrap: true,
            seed: 42,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
enum Node {
    Leaf {
        up: f64,
    },
    Split {
        feature: usize,
        threshold: f64,
        left: Box<Node>,
        right: Box<Node>,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct DecisionTree {
    root: Node,
}

impl DecisionTree {
    fn predict_up(&self, row: &Row) -> f64 {
        let mut node = &self.root;
        loop {
            match node {
                Node::Leaf { up } => return *up,
                Node::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    node = if row[*feature] <= *threshold { left } else { right };
                }
            }
        }
    }
}

struct Split {
    feature: usize,
    threshold: f64,
    /// Number of samples that go left once sorted by `feature`.
    position: usize,
}

struct TreeBuilder<'a> {
    rows: &'a [Row],
    labels: &'a [u8],
    config: &'a ForestConfig,
    max_features: usize,
    rng: ChaCha8Rng,
}

impl TreeBuilder<'_> {
    fn build(&mut self, indices: &mut [usize], depth: usize) -> Node {
        let n = indices.len();
        let positives = self.count_up(indices);
        let leaf = Node::Leaf {
            up: positives as f64 / n as f64,
        };

        let depth_reached = self.config.max_depth.is_some_and(|max| depth >= max);
        if depth_reached || n < self.config.min_samples_split || positives == 0 || positives == n {
            return leaf;
        }

        let Some(split) = self.best_split(indices, positives) else {
            return leaf;
        };

        self.sort_by_feature(indices, split.feature);
        let (left, right) = indices.split_at_mut(split.position);
        let left = self.build(left, depth + 1);
        let right = self.build(right, depth + 1);

        Node::Split {
            feature: split.feature,
            threshold: split.threshold,
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    fn best_split(&mut self, indices: &mut [usize], positives: usize) -> Option<Split> {
        let n = indices.len();
        let min_leaf = self.config.min_samples_leaf.max(1);

        let mut candidates: Vec<usize> = (0..NUM_FEATURES).collect();
        candidates.shuffle(&mut self.rng);
        candidates.truncate(self.max_features);

        let mut best: Option<Split> = None;
        let mut best_impurity = gini(positives, n) - MIN_IMPURITY_DECREASE;

        for feature in candidates {
            self.sort_by_feature(indices, feature);

            let mut left_up = 0;
            for k in 1..n {
                left_up += usize::from(self.labels[indices[k - 1]] == 1);

                let lo = self.rows[indices[k - 1]][feature];
                let hi = self.rows[indices[k]][feature];
                if lo >= hi || k < min_leaf || n - k < min_leaf {
                    continue;
                }

                let impurity = (k as f64 * gini(left_up, k)
                    + (n - k) as f64 * gini(positives - left_up, n - k))
                    / n as f64;

                if impurity < best_impurity {
                    best_impurity = impurity;
                    let mid = lo + (hi - lo) / 2.0;
                    best = Some(Split {
                        feature,
                        threshold: if mid < hi { mid } else { lo },
                        position: k,
                    });
                }
            }
        }

        best
    }

    fn sort_by_feature(&self, indices: &mut [usize], feature: usize) {
        let rows = self.rows;
        indices.sort_unstable_by(|&a, &b| rows[a][feature].total_cmp(&rows[b][feature]));
    }

    fn count_up(&self, indices: &[usize]) -> usize {
        indices.iter().filter(|&&i| self.labels[i] == 1).count()
    }
}

fn gini(positives: usize, n: usize) -> f64 {
    if n == 0 {
        return 0.0;
    }
    let p = positives as f64 / n as f64;
    2.0 * p * (1.0 - p)
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RandomForest {
    config: ForestConfig,
    trees: Vec<DecisionTree>,
}

impl RandomForest {
    pub fn fit_with(config: ForestConfig, samples: &TrainingSet) -> Result<Self, ModelError> {
        if samples.features.len() != samples.labels.len() {
            return Err(ModelError::LabelMismatch {
                features: samples.features.len(),
                labels: samples.labels.len(),
            });
        }
        if samples.is_empty() {
            return Err(ModelError::EmptyTrainingSet);
        }

        let rows: Vec<Row> = samples.features.iter().map(Features::to_array).collect();
        let n = rows.len();
        let max_features = config
            .max_features
            .unwrap_or_else(|| (NUM_FEATURES as f64).sqrt().ceil() as usize)
            .clamp(1, NUM_FEATURES);

        // Per-tree seeds keep the result independent of rayon's scheduling.
        let trees = (0..config.n_trees)
            .into_par_iter()
            .map(|i| {
                let mut rng = ChaCha8Rng::seed_from_u64(config.seed.wrapping_add(i as u64));
                let mut indices: Vec<usize> = if config.bootstrap {
                    (0..n).map(|_| rng.random_range(0..n)).collect()
                } else {
                    (0..n).collect()
                };

                let mut builder = TreeBuilder {
                    rows: &rows,
                    labels: &samples.labels,
                    config: &config,
                    max_features,
                    rng,
                };
                DecisionTree {
                    root: builder.build(&mut indices, 0),
                }
            })
            .collect();

        Ok(Self { config, trees })
    }

    pub fn n_trees(&self) -> usize {
        self.trees.len()
    }

    pub fn config(&self) -> &ForestConfig {
        &self.config
    }
}

impl Classifier for RandomForest {
    fn name(&self) -> &'static str {
        "random_forest"
    }

    fn predict_proba(&self, features: &Features) -> ClassProbabilities {
        if self.trees.is_empty() {
            return ClassProbabilities::from_up(0.5);
        }
        let row = features.to_array();
        let up = self.trees.iter().map(|t| t.predict_up(&row)).sum::<f64>() / self.trees.len() as f64;
        ClassProbabilities::from_up(up)
    }
}

impl TrainableClassifier for RandomForest {
    fn fit(samples: &TrainingSet) -> Result<Self, ModelError> {
        Self::fit_with(ForestConfig::default(), samples)
    }

    fn to_bytes(&self) -> Result<Vec<u8>, ModelError> {
        Ok(bincode::serialize(self)?)
    }

    fn from_bytes(bytes: &[u8]) -> Result<Self, ModelError> {
        Ok(bincode::deserialize(bytes)?)
    }
}
