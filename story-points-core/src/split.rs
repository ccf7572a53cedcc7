//! Seeded shuffling splits of sample indices.

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};

/// Sample indices per split.
#[derive(Debug, Clone, PartialEq)]
pub enum SplitPlan {
    /// 70% train, 15% validation, 15% test.
    ThreeWay {
        train: Vec<usize>,
        validation: Vec<usize>,
        test: Vec<usize>,
    },
    /// 80% train, 20% test.
    TrainTest { train: Vec<usize>, test: Vec<usize> },
    /// Too few samples to hold any out: train and test on everything.
    Resubstitution { all: Vec<usize> },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SplitKind {
    ThreeWay,
    TrainTest,
    Resubstitution,
}

impl SplitPlan {
    pub fn kind(&self) -> SplitKind {
        match self {
            SplitPlan::ThreeWay { .. } => SplitKind::ThreeWay,
            SplitPlan::TrainTest { .. } => SplitKind::TrainTest,
            SplitPlan::Resubstitution { .. } => SplitKind::Resubstitution,
        }
    }

    pub fn train(&self) -> &[usize] {
        match self {
            SplitPlan::ThreeWay { train, .. } | SplitPlan::TrainTest { train, .. } => train,
            SplitPlan::Resubstitution { all } => all,
        }
    }

    pub fn validation(&self) -> Option<&[usize]> {
        match self {
            SplitPlan::ThreeWay { validation, .. } => Some(validation),
            _ => None,
        }
    }

    pub fn test(&self) -> &[usize] {
        match self {
            SplitPlan::ThreeWay { test, .. } | SplitPlan::TrainTest { test, .. } => test,
            SplitPlan::Resubstitution { all } => all,
        }
    }
}

/// Shuffle `indices` with `seed` and cut off `ceil(test_fraction * n)` for testing.
///
/// Returns `(train, test)`.
pub fn train_test_split(
    indices: &[usize],
    test_fraction: f64,
    seed: u64,
) -> (Vec<usize>, Vec<usize>) {
    let mut shuffled = indices.to_vec();
    let mut rng = StdRng::seed_from_u64(seed);
    shuffled.shuffle(&mut rng);

    let n_test = ((indices.len() as f64) * test_fraction).ceil() as usize;
    let n_test = n_test.min(indices.len());
    let train = shuffled.split_off(n_test);
    (train, shuffled)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_rounds_up() {
        let indices: Vec<usize> = (0..14).collect();
        let (train, test) = train_test_split(&indices, 0.2, 42);

        assert_eq!(test.len(), 3);
        assert_eq!(train.len(), 11);
    }

    #[test]
    fn split_is_a_partition() {
        let indices: Vec<usize> = (0..50).collect();
        let (train, test) = train_test_split(&indices, 0.3, 7);

        let mut all: Vec<usize> = train.iter().chain(&test).copied().collect();
        all.sort();
        assert_eq!(all, indices);
    }

    #[test]
    fn same_seed_same_split() {
        let indices: Vec<usize> = (0..30).collect();
        assert_eq!(
            train_test_split(&indices, 0.2, 42),
            train_test_split(&indices, 0.2, 42)
        );
    }

    #[test]
    fn resubstitution_uses_everything_twice() {
        let plan = SplitPlan::Resubstitution { all: vec![0, 1, 2] };
        assert_eq!(plan.train(), plan.test());
        assert!(plan.validation().is_none());
        assert_eq!(plan.kind(), SplitKind::Resubstitution);
    }
}
