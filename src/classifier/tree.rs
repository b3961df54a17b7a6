//! CART decision tree with Gini impurity for two classes

use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::types::Features;

type Sample = [f64; Features::COUNT];

/// Number of classes (unhealthy, healthy)
pub const CLASSES: usize = 2;

/// Growth limits for a single tree
#[derive(Debug, Clone, Copy)]
pub struct TreeParams {
    pub max_depth: Option<usize>,
    pub min_samples_split: usize,
    /// Non-constant features to examine per split before settling
    pub max_features: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
enum Node {
    Leaf {
        /// Class probabilities, indexed by class
        proba: [f64; CLASSES],
    },
    Split {
        feature: usize,
        /// Samples with value <= threshold go left
        threshold: f64,
        left: Box<Node>,
        right: Box<Node>,
    },
}

/// A fitted decision tree
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecisionTree {
    root: Node,
}

struct Candidate {
    feature: usize,
    threshold: f64,
    impurity: f64,
}

impl DecisionTree {
    /// Grow a tree over `indices` into `samples`/`labels`. Indices may repeat (bootstrap).
    pub fn fit<R: Rng + ?Sized>(
        samples: &[Sample],
        labels: &[usize],
        indices: Vec<usize>,
        params: &TreeParams,
        rng: &mut R,
    ) -> Self {
        let builder = Builder {
            samples,
            labels,
            params,
        };
        Self {
            root: builder.grow(indices, 0, rng),
        }
    }

    /// Class probabilities for one (already scaled) sample
    pub fn predict_proba(&self, sample: &Sample) -> [f64; CLASSES] {
        let mut node = &self.root;
        loop {
            match node {
                Node::Leaf { proba } => return *proba,
                Node::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    node = if sample[*feature] <= *threshold {
                        left
                    } else {
                        right
                    };
                }
            }
        }
    }

    pub fn depth(&self) -> usize {
        fn depth_of(node: &Node) -> usize {
            match node {
                Node::Leaf { .. } => 0,
                Node::Split { left, right, .. } => 1 + depth_of(left).max(depth_of(right)),
            }
        }
        depth_of(&self.root)
    }

    pub fn leaf_count(&self) -> usize {
        fn leaves(node: &Node) -> usize {
            match node {
                Node::Leaf { .. } => 1,
                Node::Split { left, right, .. } => leaves(left) + leaves(right),
            }
        }
        leaves(&self.root)
    }
}

struct Builder<'a> {
    samples: &'a [Sample],
    labels: &'a [usize],
    params: &'a TreeParams,
}

impl Builder<'_> {
    fn grow<R: Rng + ?Sized>(&self, indices: Vec<usize>, depth: usize, rng: &mut R) -> Node {
        let counts = self.class_counts(&indices);
        let n = indices.len();

        let depth_reached = self.params.max_depth.is_some_and(|max| depth >= max);
        let pure = counts.iter().filter(|&&c| c > 0).count() <= 1;
        if depth_reached || pure || n < self.params.min_samples_split {
            return leaf(&counts);
        }

        let Some(split) = self.best_split(&indices, rng) else {
            return leaf(&counts);
        };

        let (left, right): (Vec<usize>, Vec<usize>) = indices
            .into_iter()
            .partition(|&i| self.samples[i][split.feature] <= split.threshold);

        Node::Split {
            feature: split.feature,
            threshold: split.threshold,
            left: Box::new(self.grow(left, depth + 1, rng)),
            right: Box::new(self.grow(right, depth + 1, rng)),
        }
    }

    /// Examine features in random order until `max_features` non-constant ones
    /// have been seen. A split is taken even when it does not lower impurity,
    /// so an impure node only becomes a leaf when every feature is constant.
    fn best_split<R: Rng + ?Sized>(&self, indices: &[usize], rng: &mut R) -> Option<Candidate> {
        let mut order: Vec<usize> = (0..Features::COUNT).collect();
        order.shuffle(rng);

        let mut best: Option<Candidate> = None;
        let mut visited = 0;

        for feature in order {
            if visited >= self.params.max_features {
                break;
            }

            let Some(candidate) = self.best_split_on(indices, feature) else {
                continue;
            };
            visited += 1;

            if best.as_ref().map_or(true, |b| candidate.impurity < b.impurity) {
                best = Some(candidate);
            }
        }

        best
    }

    /// Lowest weighted-Gini threshold on one feature, None if the feature is constant here
    fn best_split_on(&self, indices: &[usize], feature: usize) -> Option<Candidate> {
        let mut sorted: Vec<(f64, usize)> = indices
            .iter()
            .map(|&i| (self.samples[i][feature], self.labels[i]))
            .collect();
        sorted.sort_by(|a, b| a.0.total_cmp(&b.0));

        let n = sorted.len();
        let mut total = [0usize; CLASSES];
        for &(_, label) in &sorted {
            total[label] += 1;
        }

        let mut left = [0usize; CLASSES];
        let mut best: Option<Candidate> = None;

        for pos in 1..n {
            left[sorted[pos - 1].1] += 1;
            let (lo, hi) = (sorted[pos - 1].0, sorted[pos].0);
            if lo == hi {
                continue;
            }

            let right = [total[0] - left[0], total[1] - left[1]];
            let (n_left, n_right) = (pos, n - pos);
            let impurity = (n_left as f64 * gini(&left, n_left)
                + n_right as f64 * gini(&right, n_right))
                / n as f64;

            if best.as_ref().map_or(true, |b| impurity < b.impurity) {
                let mut threshold = lo + (hi - lo) / 2.0;
                if threshold >= hi {
                    threshold = lo;
                }
                best = Some(Candidate {
                    feature,
                    threshold,
                    impurity,
                });
            }
        }

        best
    }

    fn class_counts(&self, indices: &[usize]) -> [usize; CLASSES] {
        let mut counts = [0usize; CLASSES];
        for &i in indices {
            counts[self.labels[i]] += 1;
        }
        counts
    }
}

fn gini(counts: &[usize; CLASSES], n: usize) -> f64 {
    if n == 0 {
        return 0.0;
    }
    let n = n as f64;
    1.0 - counts.iter().map(|&c| (c as f64 / n).powi(2)).sum::<f64>()
}

fn leaf(counts: &[usize; CLASSES]) -> Node {
    let n: usize = counts.iter().sum();
    let mut proba = [0.0; CLASSES];
    if n > 0 {
        for (p, &c) in proba.iter_mut().zip(counts) {
            *p = c as f64 / n as f64;
        }
    }
    Node::Leaf { proba }
}
