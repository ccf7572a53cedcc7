//! Random forest regressor.
//!
//! Trees are grown on bootstrap samples with variance reduction as the split
//! criterion. At every node features are visited in a random order until
//! `floor(sqrt(n_features))` of them that vary across the node's samples have
//! been evaluated; constant features are skipped without using up the draw.
//! Thresholds sit halfway between adjacent distinct values. Predictions
//! average the leaf means of all trees.

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::error::{EstimatorError, Result};
use crate::scale;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForestConfig {
    pub n_trees: usize,
    pub max_depth: usize,
    pub min_samples_split: usize,
    pub min_samples_leaf: usize,
    pub seed: u64,
}

impl ForestConfig {
    /// Production forest: 100 trees, depth 8.
    pub fn standard() -> Self {
        Self {
            n_trees: 100,
            max_depth: 8,
            min_samples_split: 5,
            min_samples_leaf: 3,
            seed: 42,
        }
    }

    /// Reduced capacity forest tried when the standard one overfits.
    pub fn simplified() -> Self {
        Self {
            n_trees: 50,
            max_depth: 5,
            min_samples_split: 10,
            min_samples_leaf: 5,
            seed: 42,
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.n_trees == 0 {
            return Err(EstimatorError::InvalidConfig(
                "forest needs at least one tree".into(),
            ));
        }
        if self.max_depth == 0 {
            return Err(EstimatorError::InvalidConfig(
                "max_depth must be positive".into(),
            ));
        }
        if self.min_samples_leaf == 0 || self.min_samples_split < 2 {
            return Err(EstimatorError::InvalidConfig(
                "min_samples_leaf must be >= 1 and min_samples_split >= 2".into(),
            ));
        }
        Ok(())
    }

    /// Human readable summary used in training statistics.
    pub fn describe(&self) -> String {
        format!(
            "{} trees, max_depth={}, min_samples_split={}, min_samples_leaf={}",
            self.n_trees, self.max_depth, self.min_samples_split, self.min_samples_leaf
        )
    }
}

impl Default for ForestConfig {
    fn default() -> Self {
        Self::standard()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
enum Node {
    Leaf {
        value: f64,
    },
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct Tree {
    nodes: Vec<Node>,
}

impl Tree {
    fn predict(&self, features: &[f64]) -> f64 {
        let mut idx = 0;
        loop {
            match &self.nodes[idx] {
                Node::Leaf { value } => return *value,
                Node::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    idx = if features[*feature] <= *threshold {
                        *left
                    } else {
                        *right
                    };
                }
            }
        }
    }
}

struct BestSplit {
    feature: usize,
    threshold: f64,
    /// Sum of squared errors removed by the split.
    gain: f64,
}

/// Grows one tree and records impurity decrease per feature.
struct TreeBuilder<'a> {
    x: &'a [Vec<f64>],
    y: &'a [f64],
    config: &'a ForestConfig,
    max_features: usize,
    n_features: usize,
    rng: StdRng,
    nodes: Vec<Node>,
    importances: Vec<f64>,
}

impl<'a> TreeBuilder<'a> {
    fn build(mut self, samples: Vec<usize>) -> (Tree, Vec<f64>) {
        self.grow(samples, 0);
        (Tree { nodes: self.nodes }, self.importances)
    }

    /// Append the subtree for `samples` and return its root index.
    fn grow(&mut self, samples: Vec<usize>, depth: usize) -> usize {
        let idx = self.nodes.len();
        let value = mean(samples.iter().map(|&i| self.y[i]));
        self.nodes.push(Node::Leaf { value });

        if depth >= self.config.max_depth || samples.len() < self.config.min_samples_split {
            return idx;
        }

        let Some(best) = self.best_split(&samples) else {
            return idx;
        };

        self.importances[best.feature] += best.gain;

        let (left, right): (Vec<usize>, Vec<usize>) = samples
            .into_iter()
            .partition(|&i| self.x[i][best.feature] <= best.threshold);

        let left = self.grow(left, depth + 1);
        let right = self.grow(right, depth + 1);
        self.nodes[idx] = Node::Split {
            feature: best.feature,
            threshold: best.threshold,
            left,
            right,
        };
        idx
    }

    fn best_split(&mut self, samples: &[usize]) -> Option<BestSplit> {
        let n = samples.len();
        let min_leaf = self.config.min_samples_leaf;
        if n < 2 * min_leaf {
            return None;
        }

        let total_sum: f64 = samples.iter().map(|&i| self.y[i]).sum();
        let total_sq: f64 = samples.iter().map(|&i| self.y[i] * self.y[i]).sum();
        let parent_sse = total_sq - total_sum * total_sum / n as f64;
        if parent_sse <= f64::EPSILON {
            return None;
        }

        let mut features: Vec<usize> = (0..self.n_features).collect();
        features.shuffle(&mut self.rng);

        let mut best: Option<BestSplit> = None;
        let mut order = samples.to_vec();
        let mut visited = 0;

        for feature in features {
            if visited == self.max_features {
                break;
            }
            if self.is_constant(samples, feature) {
                continue;
            }
            visited += 1;

            order.sort_by(|&a, &b| self.x[a][feature].total_cmp(&self.x[b][feature]));

            let mut left_sum = 0.0;
            let mut left_sq = 0.0;
            for pos in 0..n - 1 {
                let y = self.y[order[pos]];
                left_sum += y;
                left_sq += y * y;

                let n_left = pos + 1;
                let n_right = n - n_left;
                if n_left < min_leaf || n_right < min_leaf {
                    continue;
                }

                let here = self.x[order[pos]][feature];
                let next = self.x[order[pos + 1]][feature];
                if here >= next {
                    continue;
                }

                let right_sum = total_sum - left_sum;
                let right_sq = total_sq - left_sq;
                let left_sse = left_sq - left_sum * left_sum / n_left as f64;
                let right_sse = right_sq - right_sum * right_sum / n_right as f64;
                let gain = parent_sse - left_sse - right_sse;

                if gain > best.as_ref().map_or(0.0, |b| b.gain) {
                    best = Some(BestSplit {
                        feature,
                        threshold: here + (next - here) / 2.0,
                        gain,
                    });
                }
            }
        }

        best
    }

    fn is_constant(&self, samples: &[usize], feature: usize) -> bool {
        let first = self.x[samples[0]][feature];
        samples.iter().all(|&i| self.x[i][feature] == first)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RandomForest {
    config: ForestConfig,
    trees: Vec<Tree>,
    n_features: usize,
    feature_importances: Vec<f64>,
}

impl RandomForest {
    pub fn new(config: ForestConfig) -> Self {
        Self {
            config,
            trees: Vec::new(),
            n_features: 0,
            feature_importances: Vec::new(),
        }
    }

    pub fn config(&self) -> &ForestConfig {
        &self.config
    }

    pub fn is_fitted(&self) -> bool {
        !self.trees.is_empty()
    }

    /// Width of the vectors the forest was fitted on.
    pub fn n_features(&self) -> usize {
        self.n_features
    }

    /// Normalised impurity decrease per feature, summing to one (or all zero
    /// when no tree ever split).
    pub fn feature_importances(&self) -> &[f64] {
        &self.feature_importances
    }

    /// Fit on rows `x` with targets `y`, replacing any previous fit.
    pub fn fit(&mut self, x: &[Vec<f64>], y: &[f64]) -> Result<()> {
        self.config.validate()?;
        if x.is_empty() {
            return Err(EstimatorError::EmptyTrainingSet);
        }
        if x.len() != y.len() {
            return Err(EstimatorError::InvalidConfig(format!(
                "{} feature rows but {} targets",
                x.len(),
                y.len()
            )));
        }

        let n_features = x[0].len();
        if let Some(row) = x.iter().find(|row| row.len() != n_features) {
            return Err(EstimatorError::FeatureMismatch {
                expected: n_features,
                actual: row.len(),
            });
        }

        if n_features == 0 {
            return Err(EstimatorError::InvalidConfig("feature rows are empty".into()));
        }

        let n_samples = x.len();
        let max_features = ((n_features as f64).sqrt().floor() as usize).clamp(1, n_features);
        let mut rng = StdRng::seed_from_u64(self.config.seed);
        let mut trees = Vec::with_capacity(self.config.n_trees);
        let mut importances = vec![0.0; n_features];

        for _ in 0..self.config.n_trees {
            let bootstrap: Vec<usize> =
                (0..n_samples).map(|_| rng.gen_range(0..n_samples)).collect();
            let builder = TreeBuilder {
                x,
                y,
                config: &self.config,
                max_features,
                n_features,
                rng: StdRng::seed_from_u64(rng.gen()),
                nodes: Vec::new(),
                importances: vec![0.0; n_features],
            };
            let (tree, tree_importances) = builder.build(bootstrap);

            let total: f64 = tree_importances.iter().sum();
            if total > 0.0 {
                for (acc, value) in importances.iter_mut().zip(&tree_importances) {
                    *acc += value / total;
                }
            }
            trees.push(tree);
        }

        let total: f64 = importances.iter().sum();
        if total > 0.0 {
            for value in &mut importances {
                *value /= total;
            }
        }

        self.trees = trees;
        self.n_features = n_features;
        self.feature_importances = importances;

        tracing::debug!(
            trees = self.trees.len(),
            samples = n_samples,
            features = n_features,
            "Fitted random forest"
        );
        Ok(())
    }

    /// Continuous score for one feature vector.
    pub fn predict(&self, features: &[f64]) -> Result<f64> {
        if !self.is_fitted() {
            return Err(EstimatorError::UntrainedModel);
        }
        if features.len() != self.n_features {
            return Err(EstimatorError::FeatureMismatch {
                expected: self.n_features,
                actual: features.len(),
            });
        }

        let total: f64 = self.trees.iter().map(|tree| tree.predict(features)).sum();
        Ok(total / self.trees.len() as f64)
    }

    pub fn predict_many(&self, rows: &[Vec<f64>]) -> Result<Vec<f64>> {
        rows.iter().map(|row| self.predict(row)).collect()
    }

    /// Snap a score onto the story point scale. Requires a fitted forest.
    pub fn discretize(&self, score: f64) -> Result<u32> {
        if !self.is_fitted() {
            return Err(EstimatorError::UntrainedModel);
        }
        Ok(scale::discretize(score))
    }
}

fn mean(values: impl Iterator<Item = f64>) -> f64 {
    let (sum, count) = values.fold((0.0, 0usize), |(s, c), v| (s + v, c + 1));
    if count == 0 {
        0.0
    } else {
        sum / count as f64
    }
}
