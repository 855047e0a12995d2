use linfa::traits::{Fit, Predict};
use linfa::Dataset;
use log::{debug, info};
use ndarray::{Array1, Array2};
use rand::Rng;
use regression_forest::{MaxFeatures, RegressionForest};

use super::{append_predictions, feature_matrix, label_vector};
use crate::error::{Error, Result};
use crate::frame::Frame;
use crate::session::Session;
use crate::traits::{Estimator, Transformer};

/// Number of features each tree node considers
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub enum FeatureSubsetStrategy {
    /// One third of the features, the usual choice for regression forests
    #[default]
    Auto,
    All,
    OneThird,
    Sqrt,
    Log2,
    /// A fraction in `(0, 1]` of the features
    Fraction(f64),
}

impl FeatureSubsetStrategy {
    fn max_features(self) -> MaxFeatures {
        match self {
            FeatureSubsetStrategy::Auto | FeatureSubsetStrategy::OneThird => MaxFeatures::OneThird,
            FeatureSubsetStrategy::All => MaxFeatures::All,
            FeatureSubsetStrategy::Sqrt => MaxFeatures::Sqrt,
            FeatureSubsetStrategy::Log2 => MaxFeatures::Log2,
            FeatureSubsetStrategy::Fraction(f) => MaxFeatures::Fraction(f as f32),
        }
    }
}

/// Random forest regression of a label column on a feature vector column
///
/// ### Attributes
///
/// * `num_trees`: trees in the forest, 20 by default
/// * `max_depth`: maximal depth of each tree, 5 by default
/// * `max_bins`: maximal number of bins each feature is discretised into, 32 by default
/// * `min_instances_per_node`: minimal number of samples in each child of a split, 1 by default
/// * `min_info_gain`: minimal weighted variance decrease of a split, 0 by default
/// * `subsampling_rate`: fraction of the rows each tree is trained on, 1 by default
/// * `bootstrap`: sample the rows of each tree with replacement, `true` by default
/// * `feature_subset_strategy`: features considered at each node, one third by default
/// * `seed`: seed of the forest; without a seed every fit draws a fresh one, so repeated
///   fits differ
#[derive(Clone, Debug, PartialEq)]
pub struct RandomForestRegressor {
    features_col: String,
    label_col: String,
    prediction_col: String,
    num_trees: usize,
    max_depth: usize,
    max_bins: usize,
    min_instances_per_node: usize,
    min_info_gain: f64,
    subsampling_rate: f64,
    bootstrap: bool,
    feature_subset_strategy: FeatureSubsetStrategy,
    seed: Option<u64>,
}

impl Default for RandomForestRegressor {
    fn default() -> Self {
        Self {
            features_col: "features".to_string(),
            label_col: "label".to_string(),
            prediction_col: "prediction".to_string(),
            num_trees: 20,
            max_depth: 5,
            max_bins: 32,
            min_instances_per_node: 1,
            min_info_gain: 0.0,
            subsampling_rate: 1.0,
            bootstrap: true,
            feature_subset_strategy: FeatureSubsetStrategy::Auto,
            seed: None,
        }
    }
}

impl RandomForestRegressor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn features_col(mut self, features_col: impl Into<String>) -> Self {
        self.features_col = features_col.into();
        self
    }

    pub fn label_col(mut self, label_col: impl Into<String>) -> Self {
        self.label_col = label_col.into();
        self
    }

    pub fn prediction_col(mut self, prediction_col: impl Into<String>) -> Self {
        self.prediction_col = prediction_col.into();
        self
    }

    pub fn num_trees(mut self, num_trees: usize) -> Self {
        self.num_trees = num_trees;
        self
    }

    pub fn max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub fn max_bins(mut self, max_bins: usize) -> Self {
        self.max_bins = max_bins;
        self
    }

    pub fn min_instances_per_node(mut self, min_instances_per_node: usize) -> Self {
        self.min_instances_per_node = min_instances_per_node;
        self
    }

    pub fn min_info_gain(mut self, min_info_gain: f64) -> Self {
        self.min_info_gain = min_info_gain;
        self
    }

    pub fn subsampling_rate(mut self, subsampling_rate: f64) -> Self {
        self.subsampling_rate = subsampling_rate;
        self
    }

    pub fn bootstrap(mut self, bootstrap: bool) -> Self {
        self.bootstrap = bootstrap;
        self
    }

    pub fn feature_subset_strategy(mut self, strategy: FeatureSubsetStrategy) -> Self {
        self.feature_subset_strategy = strategy;
        self
    }

    pub fn seed(mut self, seed: Option<u64>) -> Self {
        self.seed = seed;
        self
    }
}

impl Estimator for RandomForestRegressor {
    type Model = RandomForestRegressionModel;

    fn fit(&self, session: &Session, frame: &Frame) -> Result<RandomForestRegressionModel> {
        if frame.is_empty() {
            return Err(Error::EmptyDataset);
        }
        let x = feature_matrix(frame, &self.features_col)?;
        let y = label_vector(frame, &self.label_col)?;
        let dataset = Dataset::new(x, y);

        let seed = self.seed.unwrap_or_else(|| {
            let seed = rand::thread_rng().gen();
            debug!("random forest drew seed {}", seed);
            seed
        });
        let params = RegressionForest::params()
            .n_trees(self.num_trees)
            .max_depth(Some(self.max_depth))
            .max_bins(self.max_bins)
            .min_samples_leaf(self.min_instances_per_node)
            .min_impurity_decrease(self.min_info_gain)
            .subsample(self.subsampling_rate as f32)
            .bootstrap(self.bootstrap)
            .max_features(self.feature_subset_strategy.max_features())
            .seed(seed);

        let forest = session.install(|| params.fit(&dataset))?;

        info!(
            "fitted random forest of {} trees (max depth {}) on {} rows",
            forest.num_trees(),
            forest.max_depth(),
            frame.num_rows()
        );

        Ok(RandomForestRegressionModel {
            forest,
            features_col: self.features_col.clone(),
            prediction_col: self.prediction_col.clone(),
        })
    }
}

/// Fitted random forest
#[derive(Clone, Debug, PartialEq)]
pub struct RandomForestRegressionModel {
    forest: RegressionForest<f64>,
    features_col: String,
    prediction_col: String,
}

impl RandomForestRegressionModel {
    pub fn num_trees(&self) -> usize {
        self.forest.num_trees()
    }

    pub fn num_features(&self) -> usize {
        self.forest.num_features()
    }

    /// Importance of every feature, summing to one unless the forest never split
    pub fn feature_importances(&self) -> Array1<f64> {
        Array1::from(self.forest.feature_importance())
    }

    pub fn predict(&self, records: &Array2<f64>) -> Result<Array1<f64>> {
        if records.ncols() != self.num_features() {
            return Err(Error::DimensionMismatch {
                expected: self.num_features(),
                actual: records.ncols(),
            });
        }
        Ok(self.forest.predict(records))
    }
}

impl Transformer for RandomForestRegressionModel {
    fn transform(&self, session: &Session, frame: &Frame) -> Result<Frame> {
        append_predictions(
            session,
            frame,
            &self.features_col,
            &self.prediction_col,
            self.num_features(),
            |x| self.forest.predict(x),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frame::Column;
    use approx::assert_abs_diff_eq;
    use ndarray::array;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn session() -> Session {
        Session::builder().master("local[2]").build().unwrap()
    }

    /// Price steps with the first feature, the second one is noise
    fn listings(n: usize) -> Frame {
        let mut rng = StdRng::seed_from_u64(3);
        let mut features = Vec::with_capacity(n);
        let mut prices = Vec::with_capacity(n);
        for _ in 0..n {
            let bedrooms = rng.gen_range(1..=4) as f64;
            let noise = rng.gen_range(0.0..1.0);
            features.push(Some(array![bedrooms, noise]));
            prices.push(Some(100.0 * bedrooms));
        }
        Frame::new(vec![
            ("features", Column::Vector(features)),
            ("price", Column::Double(prices)),
        ])
        .unwrap()
    }

    #[test]
    fn defaults_follow_spark() {
        let rf = RandomForestRegressor::new();
        assert_eq!(rf.num_trees, 20);
        assert_eq!(rf.max_depth, 5);
        assert_eq!(rf.max_bins, 32);
        assert_eq!(rf.feature_subset_strategy.max_features(), MaxFeatures::OneThird);
        assert_eq!(rf.seed, None);
    }

    #[test]
    fn learns_step_function() {
        let session = session();
        let model = RandomForestRegressor::new()
            .label_col("price")
            .feature_subset_strategy(FeatureSubsetStrategy::All)
            .seed(Some(42))
            .fit(&session, &listings(200))
            .unwrap();

        assert_eq!(model.num_trees(), 20);
        let predictions = model.predict(&array![[1.0, 0.5], [4.0, 0.5]]).unwrap();
        assert_abs_diff_eq!(predictions[0], 100.0, epsilon = 1e-6);
        assert_abs_diff_eq!(predictions[1], 400.0, epsilon = 1e-6);

        let importances = model.feature_importances();
        assert_abs_diff_eq!(importances.sum(), 1.0, epsilon = 1e-9);
        assert!(importances[0] > importances[1]);
    }

    #[test]
    fn seeded_fit_is_reproducible() {
        let session = session();
        let frame = listings(100);
        let rf = RandomForestRegressor::new().label_col("price").seed(Some(11));

        let first = rf.fit(&session, &frame).unwrap();
        let second = rf.fit(&session, &frame).unwrap();
        assert_eq!(first, second);

        let a = first.transform(&session, &frame).unwrap();
        let b = second.transform(&session, &frame.repartition(4).unwrap()).unwrap();
        assert_eq!(a.column("prediction").unwrap(), b.column("prediction").unwrap());
    }

    #[test]
    fn invalid_params_and_dimensions() {
        let session = session();
        let frame = listings(20);
        assert!(matches!(
            RandomForestRegressor::new().label_col("price").num_trees(0).fit(&session, &frame),
            Err(Error::Linfa(_))
        ));

        let model = RandomForestRegressor::new()
            .label_col("price")
            .seed(Some(1))
            .fit(&session, &frame)
            .unwrap();
        assert!(matches!(
            model.predict(&array![[1.0]]),
            Err(Error::DimensionMismatch { expected: 2, actual: 1 })
        ));
    }
}
