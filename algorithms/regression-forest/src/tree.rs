//! Histogram regression trees
//!
//! Every feature is discretised once into quantile bins. A node is split by scanning
//! per-bin sums of the targets, so the cost of a split search is linear in the number
//! of samples of the node plus the number of bins.
use linfa::Float;
use ndarray::{Array2, ArrayBase, ArrayView1, Data, Ix2};
use rand::{seq::index::sample, Rng};

#[cfg(feature = "serde")]
use serde_crate::{Deserialize, Serialize};

/// Candidate split thresholds of every feature, together with the bin of every record
pub(crate) struct Bins<F> {
    thresholds: Vec<Vec<F>>,
    bin_of: Array2<usize>,
}

impl<F: Float> Bins<F> {
    /// Computes at most `max_bins - 1` thresholds per feature of `x`.
    ///
    /// A feature with few distinct values is split between neighbouring values, others
    /// at evenly spaced quantiles.
    pub(crate) fn new(x: &ArrayBase<impl Data<Elem = F>, Ix2>, max_bins: usize) -> Self {
        let thresholds = x
            .columns()
            .into_iter()
            .map(|column| feature_thresholds(column, max_bins))
            .collect::<Vec<_>>();

        // NaN lands in the last bin, right of every threshold as in `predict`
        let bin_of = Array2::from_shape_fn(x.dim(), |(row, feature)| {
            let value = x[(row, feature)];
            if value.is_nan() {
                thresholds[feature].len()
            } else {
                thresholds[feature].partition_point(|&t| t < value)
            }
        });

        Bins { thresholds, bin_of }
    }

    fn num_bins(&self, feature: usize) -> usize {
        self.thresholds[feature].len() + 1
    }
}

fn feature_thresholds<F: Float>(column: ArrayView1<F>, max_bins: usize) -> Vec<F> {
    let mut values = column.iter().copied().filter(|v| !v.is_nan()).collect::<Vec<_>>();
    values.sort_by(|a, b| a.partial_cmp(b).unwrap());
    values.dedup();

    if values.len() <= max_bins {
        values
            .windows(2)
            .map(|pair| (pair[0] + pair[1]) / F::cast(2))
            .collect()
    } else {
        let mut thresholds = (1..max_bins)
            .map(|k| values[k * values.len() / max_bins])
            .collect::<Vec<_>>();
        thresholds.dedup();
        thresholds
    }
}

/// Target sums of the records that fall into one bin
#[derive(Clone, Copy)]
struct Moments<F> {
    count: usize,
    sum: F,
    sum_sq: F,
}

impl<F: Float> Moments<F> {
    fn zero() -> Self {
        Moments {
            count: 0,
            sum: F::zero(),
            sum_sq: F::zero(),
        }
    }

    fn add(&mut self, y: F) {
        self.count += 1;
        self.sum += y;
        self.sum_sq += y * y;
    }

    fn merge(&mut self, other: &Self) {
        self.count += other.count;
        self.sum += other.sum;
        self.sum_sq += other.sum_sq;
    }

    fn minus(&self, other: &Self) -> Self {
        Moments {
            count: self.count - other.count,
            sum: self.sum - other.sum,
            sum_sq: self.sum_sq - other.sum_sq,
        }
    }

    /// Sum of squared deviations from the mean
    fn sse(&self) -> F {
        if self.count == 0 {
            return F::zero();
        }
        let sse = self.sum_sq - self.sum * self.sum / F::cast(self.count);
        sse.max(F::zero())
    }

    fn mean(&self) -> F {
        self.sum / F::cast(self.count)
    }
}

#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(crate = "serde_crate")
)]
#[derive(Debug, Clone, PartialEq)]
enum Node<F> {
    Leaf {
        value: F,
    },
    Split {
        feature: usize,
        threshold: F,
        left: usize,
        right: usize,
    },
}

/// Settings shared by all trees of a forest
pub(crate) struct Growth<F> {
    pub max_depth: Option<usize>,
    pub min_samples_leaf: usize,
    pub min_impurity_decrease: F,
    pub features_per_node: usize,
}

struct Split<F> {
    feature: usize,
    bin: usize,
    gain: F,
}

/// A single regression tree stored as an arena of nodes, root first
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(crate = "serde_crate")
)]
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct RegressionTree<F> {
    nodes: Vec<Node<F>>,
    importances: Vec<F>,
}

struct Grower<'a, F, R> {
    bins: &'a Bins<F>,
    y: ArrayView1<'a, F>,
    growth: &'a Growth<F>,
    num_samples: usize,
    rng: &'a mut R,
    nodes: Vec<Node<F>>,
    importances: Vec<F>,
}

impl<F: Float> RegressionTree<F> {
    /// Grows a tree on the (possibly repeated) records `rows`.
    pub(crate) fn fit<'a, R: Rng>(
        bins: &'a Bins<F>,
        y: ArrayView1<'a, F>,
        rows: Vec<usize>,
        growth: &'a Growth<F>,
        rng: &'a mut R,
    ) -> Self {
        let num_features = bins.thresholds.len();
        let mut grower = Grower {
            bins,
            y,
            growth,
            num_samples: rows.len(),
            rng,
            nodes: Vec::new(),
            importances: vec![F::zero(); num_features],
        };
        grower.grow(rows, 0);

        RegressionTree {
            nodes: grower.nodes,
            importances: grower.importances,
        }
    }

    pub(crate) fn predict(&self, x: ArrayView1<F>) -> F {
        let mut idx = 0;
        loop {
            match &self.nodes[idx] {
                Node::Leaf { value } => return *value,
                Node::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => idx = if x[*feature] <= *threshold { *left } else { *right },
            }
        }
    }

    /// Total weighted variance decrease per feature
    pub(crate) fn importances(&self) -> &[F] {
        &self.importances
    }

    #[cfg(test)]
    pub(crate) fn num_nodes(&self) -> usize {
        self.nodes.len()
    }

    pub(crate) fn depth(&self) -> usize {
        fn depth_of<F>(nodes: &[Node<F>], idx: usize) -> usize {
            match &nodes[idx] {
                Node::Leaf { .. } => 0,
                Node::Split { left, right, .. } => {
                    1 + depth_of(nodes, *left).max(depth_of(nodes, *right))
                }
            }
        }
        depth_of(&self.nodes, 0)
    }
}

impl<'a, F: Float, R: Rng> Grower<'a, F, R> {
    fn moments(&self, rows: &[usize]) -> Moments<F> {
        let mut moments = Moments::zero();
        for &row in rows {
            moments.add(self.y[row]);
        }
        moments
    }

    fn grow(&mut self, rows: Vec<usize>, depth: usize) -> usize {
        let idx = self.nodes.len();
        let total = self.moments(&rows);
        self.nodes.push(Node::Leaf {
            value: total.mean(),
        });

        let depth_reached = self.growth.max_depth.map_or(false, |max| depth >= max);
        if depth_reached || rows.len() < 2 * self.growth.min_samples_leaf {
            return idx;
        }

        let split = match self.best_split(&rows, &total) {
            Some(split) => split,
            None => return idx,
        };

        let threshold = self.bins.thresholds[split.feature][split.bin];
        let (left_rows, right_rows): (Vec<usize>, Vec<usize>) = rows
            .into_iter()
            .partition(|&row| self.bins.bin_of[(row, split.feature)] <= split.bin);

        self.importances[split.feature] += split.gain;
        let left = self.grow(left_rows, depth + 1);
        let right = self.grow(right_rows, depth + 1);
        self.nodes[idx] = Node::Split {
            feature: split.feature,
            threshold,
            left,
            right,
        };
        idx
    }

    fn best_split(&mut self, rows: &[usize], total: &Moments<F>) -> Option<Split<F>> {
        let num_features = self.bins.thresholds.len();
        let candidates = sample(&mut *self.rng, num_features, self.growth.features_per_node);
        let parent_sse = total.sse();
        let min_leaf = self.growth.min_samples_leaf;

        let mut best: Option<Split<F>> = None;
        for feature in candidates.iter() {
            let mut histogram = vec![Moments::zero(); self.bins.num_bins(feature)];
            for &row in rows {
                histogram[self.bins.bin_of[(row, feature)]].add(self.y[row]);
            }

            let mut left = Moments::zero();
            for (bin, moments) in histogram.iter().enumerate().take(histogram.len() - 1) {
                left.merge(moments);
                let right = total.minus(&left);
                if left.count < min_leaf || right.count < min_leaf {
                    continue;
                }

                let gain = parent_sse - left.sse() - right.sse();
                if best.as_ref().map_or(true, |b| gain > b.gain) {
                    best = Some(Split { feature, bin, gain });
                }
            }
        }

        let num_samples = F::cast(self.num_samples);
        best.filter(|split| {
            split.gain > F::zero()
                && split.gain / num_samples >= self.growth.min_impurity_decrease
        })
    }
}
