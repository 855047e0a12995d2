use linfa::{
    dataset::{AsSingleTargets, Records},
    error::{Error, Result},
    traits::*,
    DatasetBase, Float,
};
use ndarray::{Array1, ArrayBase, Data, Ix2};
use rand::{rngs::SmallRng, seq::index::sample, Rng, SeedableRng};
use rayon::prelude::*;

#[cfg(feature = "serde")]
use serde_crate::{Deserialize, Serialize};

use crate::tree::{Bins, Growth, RegressionTree};
use crate::RandomForestValidParams;

/// A random forest of regression trees.
///
/// Every tree is grown on a bootstrap sample of the training records and considers a
/// random subset of the features at each node. The forest predicts the mean of the
/// predictions of its trees.
///
/// Candidate split thresholds are computed once for the whole forest: each feature is
/// cut into at most `max_bins` quantile bins of the training records.
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(crate = "serde_crate")
)]
#[derive(Debug, Clone, PartialEq)]
pub struct RegressionForest<F> {
    trees: Vec<RegressionTree<F>>,
    num_features: usize,
}

/// Draws the records of one tree.
///
/// With `bootstrap` the `amount` records are drawn with replacement, otherwise
/// without.
fn draw_rows<R: Rng>(rng: &mut R, nsamples: usize, amount: usize, bootstrap: bool) -> Vec<usize> {
    if bootstrap {
        (0..amount).map(|_| rng.gen_range(0..nsamples)).collect()
    } else {
        sample(rng, nsamples, amount).into_vec()
    }
}

impl<F: Float, D, T> Fit<ArrayBase<D, Ix2>, T, Error> for RandomForestValidParams<F>
where
    D: Data<Elem = F>,
    T: AsSingleTargets<Elem = F>,
{
    type Object = RegressionForest<F>;

    /// Grows `n_trees` trees in parallel on the rayon pool of the caller.
    fn fit(&self, dataset: &DatasetBase<ArrayBase<D, Ix2>, T>) -> Result<Self::Object> {
        let x = dataset.records();
        let y = dataset.as_single_targets();
        let nsamples = x.nsamples();

        if nsamples == 0 {
            return Err(Error::NotEnoughSamples);
        }
        if x.nfeatures() == 0 {
            return Err(Error::Parameters(
                "Records must have at least one feature".to_string(),
            ));
        }
        if y.len() != nsamples {
            return Err(Error::Parameters(format!(
                "Expected {} targets, but got {}",
                nsamples,
                y.len()
            )));
        }

        let bins = Bins::new(x, self.max_bins());
        let growth = Growth {
            max_depth: self.max_depth(),
            min_samples_leaf: self.min_samples_leaf(),
            min_impurity_decrease: self.min_impurity_decrease(),
            features_per_node: self.max_features().num_features(x.nfeatures()),
        };
        let amount = ((nsamples as f64) * f64::from(self.subsample())).round() as usize;
        let amount = amount.clamp(1, nsamples);

        let trees = (0..self.n_trees())
            .into_par_iter()
            .map(|i| {
                let mut rng = SmallRng::seed_from_u64(self.seed().wrapping_add(i as u64));
                let rows = draw_rows(&mut rng, nsamples, amount, self.bootstrap());
                RegressionTree::fit(&bins, y.view(), rows, &growth, &mut rng)
            })
            .collect::<Vec<_>>();

        Ok(RegressionForest {
            trees,
            num_features: x.nfeatures(),
        })
    }
}

impl<F: Float, D: Data<Elem = F>> PredictInplace<ArrayBase<D, Ix2>, Array1<F>>
    for RegressionForest<F>
{
    /// Predicts the mean of the tree predictions for each row of `x`.
    fn predict_inplace(&self, x: &ArrayBase<D, Ix2>, y: &mut Array1<F>) {
        assert_eq!(
            x.nrows(),
            y.len(),
            "The number of data points must match the number of output targets."
        );
        assert_eq!(
            x.ncols(),
            self.num_features,
            "The number of features must match the number of features seen during fit."
        );

        let n_trees = F::cast(self.trees.len());
        for (row, target) in x.rows().into_iter().zip(y.iter_mut()) {
            let sum = self
                .trees
                .iter()
                .map(|tree| tree.predict(row))
                .fold(F::zero(), |acc, p| acc + p);
            *target = sum / n_trees;
        }
    }

    fn default_target(&self, x: &ArrayBase<D, Ix2>) -> Array1<F> {
        Array1::zeros(x.nrows())
    }
}

impl<F: Float> RegressionForest<F> {
    pub fn num_trees(&self) -> usize {
        self.trees.len()
    }

    pub fn num_features(&self) -> usize {
        self.num_features
    }

    /// Depth of the deepest tree
    pub fn max_depth(&self) -> usize {
        self.trees.iter().map(|t| t.depth()).max().unwrap_or(0)
    }

    /// Return the feature importance of every feature.
    ///
    /// The variance decrease of each tree is normalised to sum one, summed over the
    /// trees and normalised again. A forest without a single split has all-zero
    /// importances.
    pub fn feature_importance(&self) -> Vec<F> {
        let mut importance = vec![F::zero(); self.num_features];
        for tree in &self.trees {
            let total = tree.importances().iter().fold(F::zero(), |acc, &v| acc + v);
            if total > F::zero() {
                for (acc, &v) in importance.iter_mut().zip(tree.importances()) {
                    *acc += v / total;
                }
            }
        }

        let total = importance.iter().fold(F::zero(), |acc, &v| acc + v);
        if total > F::zero() {
            importance.iter_mut().for_each(|v| *v /= total);
        }
        importance
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::MaxFeatures;
    use approx::assert_abs_diff_eq;
    use linfa::Dataset;
    use ndarray::{array, Array2, Ix1};

    /// `y = 3 x0 + noise`, with an uninformative second feature
    fn linear_dataset(nsamples: usize) -> Dataset<f64, f64, Ix1> {
        let mut rng = SmallRng::seed_from_u64(42);
        let x = Array2::from_shape_fn((nsamples, 2), |_| rng.gen_range(0.0..10.0));
        let noise = Array1::from_shape_fn(nsamples, |_| rng.gen_range(-0.5..0.5));
        let y = x.column(0).mapv(|v| 3.0 * v) + noise;
        Dataset::new(x, y)
    }

    #[test]
    fn fits_monotone_relation() -> Result<()> {
        let dataset = linear_dataset(400);
        let forest = RegressionForest::params()
            .n_trees(30)
            .max_depth(Some(6))
            .max_features(MaxFeatures::All)
            .fit(&dataset)?;

        assert_eq!(forest.num_trees(), 30);
        assert!(forest.max_depth() <= 6);

        let predictions = forest.predict(&array![[1.0, 5.0], [5.0, 5.0], [9.0, 5.0]]);
        assert_abs_diff_eq!(predictions[0], 3.0, epsilon = 1.5);
        assert_abs_diff_eq!(predictions[1], 15.0, epsilon = 1.5);
        assert_abs_diff_eq!(predictions[2], 27.0, epsilon = 1.5);
        Ok(())
    }

    #[test]
    fn importance_favours_informative_feature() -> Result<()> {
        let forest = RegressionForest::params()
            .max_features(MaxFeatures::All)
            .fit(&linear_dataset(200))?;

        let importance = forest.feature_importance();
        assert_abs_diff_eq!(importance.iter().sum::<f64>(), 1.0, epsilon = 1e-9);
        assert!(importance[0] > 0.9);
        Ok(())
    }

    #[test]
    fn fixed_seed_is_reproducible() -> Result<()> {
        let dataset = linear_dataset(100);
        let params = RegressionForest::params().n_trees(5).seed(7);

        let first = params.fit(&dataset)?;
        let second = params.fit(&dataset)?;
        assert_eq!(first, second);

        let other = params.seed(8).fit(&dataset)?;
        assert_ne!(first, other);
        Ok(())
    }

    #[test]
    fn constant_target_predicts_constant() -> Result<()> {
        let dataset = Dataset::new(array![[1.0], [2.0], [3.0], [4.0]], array![2.5, 2.5, 2.5, 2.5]);
        let forest = RegressionForest::params().fit(&dataset)?;

        assert_eq!(forest.feature_importance(), vec![0.0]);
        assert_abs_diff_eq!(forest.predict(&array![[10.0]])[0], 2.5);
        Ok(())
    }

    #[test]
    fn empty_dataset_fails() {
        let dataset = Dataset::new(Array2::<f64>::zeros((0, 2)), Array1::<f64>::zeros(0));
        assert!(matches!(
            RegressionForest::params().fit(&dataset),
            Err(Error::NotEnoughSamples)
        ));
    }

    #[test]
    fn without_bootstrap_every_tree_sees_all_records() -> Result<()> {
        let dataset = Dataset::new(array![[0.0], [1.0]], array![0.0, 10.0]);
        let forest = RegressionForest::params()
            .n_trees(3)
            .bootstrap(false)
            .fit(&dataset)?;

        let predictions = forest.predict(&array![[0.0], [1.0]]);
        assert_abs_diff_eq!(predictions, array![0.0, 10.0]);
        Ok(())
    }
}
