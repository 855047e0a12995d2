use linfa::{
    error::{Error, Result},
    Float, ParamGuard,
};

#[cfg(feature = "serde")]
use serde_crate::{Deserialize, Serialize};

use crate::RegressionForest;

/// Number of features considered when searching the split of a node
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(crate = "serde_crate")
)]
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum MaxFeatures {
    /// Every feature
    All,
    /// `ceil(n / 3)`, the usual choice for regression forests
    OneThird,
    /// `ceil(sqrt(n))`
    Sqrt,
    /// `ceil(log2(n))`
    Log2,
    /// `ceil(fraction * n)` for a fraction in `(0, 1]`
    Fraction(f32),
}

impl MaxFeatures {
    /// Resolves the strategy against `n_features`, always keeping at least one feature.
    pub fn num_features(&self, n_features: usize) -> usize {
        let n = n_features as f64;
        let k = match self {
            MaxFeatures::All => n_features,
            MaxFeatures::OneThird => (n / 3.0).ceil() as usize,
            MaxFeatures::Sqrt => n.sqrt().ceil() as usize,
            MaxFeatures::Log2 => n.log2().ceil() as usize,
            MaxFeatures::Fraction(fraction) => (f64::from(*fraction) * n).ceil() as usize,
        };
        k.clamp(1, n_features.max(1))
    }
}

/// The set of hyperparameters that can be specified for fitting a
/// [regression forest](crate::RegressionForest).
///
/// ### Example
///
/// ```rust
/// use linfa::prelude::*;
/// use ndarray::array;
/// use regression_forest::{MaxFeatures, RegressionForest};
///
/// let dataset = Dataset::new(
///     array![[1., 0.], [2., 1.], [3., 0.], [4., 1.], [5., 0.], [6., 1.]],
///     array![10., 20., 30., 40., 50., 60.],
/// );
///
/// let forest = RegressionForest::params()
///     .n_trees(10)
///     .max_depth(Some(3))
///     .max_features(MaxFeatures::All)
///     .seed(7)
///     .fit(&dataset)
///     .unwrap();
///
/// let prediction = forest.predict(&array![[5.5, 0.]]);
/// assert!(prediction[0] > 30.);
/// ```
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(crate = "serde_crate")
)]
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RandomForestValidParams<F> {
    n_trees: usize,
    max_depth: Option<usize>,
    max_bins: usize,
    min_samples_leaf: usize,
    min_impurity_decrease: F,
    subsample: f32,
    bootstrap: bool,
    max_features: MaxFeatures,
    seed: u64,
}

impl<F: Float> RandomForestValidParams<F> {
    pub fn n_trees(&self) -> usize {
        self.n_trees
    }

    pub fn max_depth(&self) -> Option<usize> {
        self.max_depth
    }

    pub fn max_bins(&self) -> usize {
        self.max_bins
    }

    pub fn min_samples_leaf(&self) -> usize {
        self.min_samples_leaf
    }

    pub fn min_impurity_decrease(&self) -> F {
        self.min_impurity_decrease
    }

    pub fn subsample(&self) -> f32 {
        self.subsample
    }

    pub fn bootstrap(&self) -> bool {
        self.bootstrap
    }

    pub fn max_features(&self) -> MaxFeatures {
        self.max_features
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }
}

#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(crate = "serde_crate")
)]
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RandomForestParams<F>(RandomForestValidParams<F>);

impl<F: Float> RandomForestParams<F> {
    pub fn new() -> Self {
        Self(RandomForestValidParams {
            n_trees: 20,
            max_depth: Some(5),
            max_bins: 32,
            min_samples_leaf: 1,
            min_impurity_decrease: F::zero(),
            subsample: 1.0,
            bootstrap: true,
            max_features: MaxFeatures::OneThird,
            seed: 42,
        })
    }

    /// Sets the number of trees in the forest
    pub fn n_trees(mut self, n_trees: usize) -> Self {
        self.0.n_trees = n_trees;
        self
    }

    /// Sets the optional limit to the depth of every tree
    pub fn max_depth(mut self, max_depth: Option<usize>) -> Self {
        self.0.max_depth = max_depth;
        self
    }

    /// Sets the maximal number of bins a feature is discretised into.
    ///
    /// Each feature offers at most `max_bins - 1` split thresholds.
    pub fn max_bins(mut self, max_bins: usize) -> Self {
        self.0.max_bins = max_bins;
        self
    }

    /// Sets the minimal number of (bootstrapped) samples each child of a split must hold
    pub fn min_samples_leaf(mut self, min_samples_leaf: usize) -> Self {
        self.0.min_samples_leaf = min_samples_leaf;
        self
    }

    /// Sets the minimal weighted variance decrease a split must bring to be applied
    pub fn min_impurity_decrease(mut self, min_impurity_decrease: F) -> Self {
        self.0.min_impurity_decrease = min_impurity_decrease;
        self
    }

    /// Sets the fraction of the training records drawn for each tree
    pub fn subsample(mut self, subsample: f32) -> Self {
        self.0.subsample = subsample;
        self
    }

    /// Draw the records of each tree with replacement
    pub fn bootstrap(mut self, bootstrap: bool) -> Self {
        self.0.bootstrap = bootstrap;
        self
    }

    pub fn max_features(mut self, max_features: MaxFeatures) -> Self {
        self.0.max_features = max_features;
        self
    }

    /// Seeds the forest. Tree `i` draws from an RNG seeded with `seed + i`.
    pub fn seed(mut self, seed: u64) -> Self {
        self.0.seed = seed;
        self
    }
}

impl<F: Float> Default for RandomForestParams<F> {
    fn default() -> Self {
        Self::new()
    }
}

impl<F: Float> RegressionForest<F> {
    /// Defaults are provided if the optional parameters are not specified:
    /// * `n_trees = 20`
    /// * `max_depth = Some(5)`
    /// * `max_bins = 32`
    /// * `min_samples_leaf = 1`
    /// * `min_impurity_decrease = 0.0`
    /// * `subsample = 1.0`
    /// * `bootstrap = true`
    /// * `max_features = MaxFeatures::OneThird`
    /// * `seed = 42`
    // Violates the convention that new should return a value of type `Self`
    #[allow(clippy::new_ret_no_self)]
    pub fn params() -> RandomForestParams<F> {
        RandomForestParams::new()
    }
}

impl<F: Float> ParamGuard for RandomForestParams<F> {
    type Checked = RandomForestValidParams<F>;
    type Error = Error;

    fn check_ref(&self) -> Result<&Self::Checked> {
        if self.0.n_trees == 0 {
            Err(Error::Parameters(
                "Number of trees should be at least one, but was 0".to_string(),
            ))
        } else if self.0.max_depth == Some(0) {
            Err(Error::Parameters(
                "Maximal depth should be at least one, but was 0".to_string(),
            ))
        } else if self.0.max_bins < 2 {
            Err(Error::Parameters(format!(
                "Maximal number of bins should be at least two, but was {}",
                self.0.max_bins
            )))
        } else if self.0.min_samples_leaf == 0 {
            Err(Error::Parameters(
                "Minimal number of samples per leaf should be at least one, but was 0".to_string(),
            ))
        } else if self.0.min_impurity_decrease < F::zero() {
            Err(Error::Parameters(format!(
                "Minimum impurity decrease should not be negative, but was {}",
                self.0.min_impurity_decrease
            )))
        } else if !(self.0.subsample > 0.0 && self.0.subsample <= 1.0) {
            Err(Error::Parameters(format!(
                "Subsampling rate should be in (0, 1], but was {}",
                self.0.subsample
            )))
        } else if let MaxFeatures::Fraction(fraction) = self.0.max_features {
            if fraction > 0.0 && fraction <= 1.0 {
                Ok(&self.0)
            } else {
                Err(Error::Parameters(format!(
                    "Feature fraction should be in (0, 1], but was {}",
                    fraction
                )))
            }
        } else {
            Ok(&self.0)
        }
    }

    fn check(self) -> Result<Self::Checked> {
        self.check_ref()?;
        Ok(self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolves_feature_counts() {
        assert_eq!(MaxFeatures::OneThird.num_features(6), 2);
        assert_eq!(MaxFeatures::OneThird.num_features(1), 1);
        assert_eq!(MaxFeatures::OneThird.num_features(7), 3);
        assert_eq!(MaxFeatures::All.num_features(6), 6);
        assert_eq!(MaxFeatures::Sqrt.num_features(6), 3);
        assert_eq!(MaxFeatures::Log2.num_features(1), 1);
        assert_eq!(MaxFeatures::Fraction(0.5).num_features(6), 3);
    }

    #[test]
    fn rejects_invalid_params() {
        let params = RegressionForest::<f64>::params();
        assert!(params.check_ref().is_ok());
        assert!(params.n_trees(0).check().is_err());
        assert!(params.max_depth(Some(0)).check().is_err());
        assert!(params.max_bins(1).check().is_err());
        assert!(params.min_samples_leaf(0).check().is_err());
        assert!(params.subsample(0.0).check().is_err());
        assert!(params.subsample(1.5).check().is_err());
        assert!(params.max_features(MaxFeatures::Fraction(0.0)).check().is_err());
        assert!(params.min_impurity_decrease(-1.0).check().is_err());
    }
}
