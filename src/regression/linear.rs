use linfa::traits::Fit;
use linfa::Dataset;
use linfa_linear::LinearRegression as OrdinaryLeastSquares;
use log::{debug, info};
use ndarray::{Array1, Array2, ArrayView1, Axis};

use super::{append_predictions, feature_matrix, label_vector};
use crate::error::{Error, Result};
use crate::frame::{format_double, Frame};
use crate::session::Session;
use crate::traits::{Estimator, Transformer};

/// Ordinary least squares regression of a label column on a feature vector column
///
/// The fit delegates to [`linfa_linear::LinearRegression`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LinearRegression {
    features_col: String,
    label_col: String,
    prediction_col: String,
    fit_intercept: bool,
}

impl Default for LinearRegression {
    fn default() -> Self {
        Self {
            features_col: "features".to_string(),
            label_col: "label".to_string(),
            prediction_col: "prediction".to_string(),
            fit_intercept: true,
        }
    }
}

impl LinearRegression {
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

    /// Whether to fit an intercept, `true` by default
    pub fn fit_intercept(mut self, fit_intercept: bool) -> Self {
        self.fit_intercept = fit_intercept;
        self
    }
}

impl Estimator for LinearRegression {
    type Model = LinearRegressionModel;

    fn fit(&self, session: &Session, frame: &Frame) -> Result<LinearRegressionModel> {
        if frame.is_empty() {
            return Err(Error::EmptyDataset);
        }
        let x = feature_matrix(frame, &self.features_col)?;
        let y = label_vector(frame, &self.label_col)?;

        // Constant features carry no information next to the intercept and make the
        // normal equations singular, so they get a zero coefficient.
        let kept = (0..x.ncols())
            .filter(|&j| !self.is_degenerate(x.column(j)))
            .collect::<Vec<_>>();
        if kept.len() < x.ncols() {
            debug!(
                "zero coefficient for {} constant features",
                x.ncols() - kept.len()
            );
        }

        let mut coefficients = Array1::zeros(x.ncols());
        let intercept = if kept.is_empty() {
            match y.mean() {
                Some(mean) if self.fit_intercept => mean,
                _ => 0.0,
            }
        } else {
            let dataset = Dataset::new(x.select(Axis(1), &kept), y);
            let fitted = session.install(|| {
                OrdinaryLeastSquares::new()
                    .with_intercept(self.fit_intercept)
                    .fit(&dataset)
            })?;
            for (&j, &coefficient) in kept.iter().zip(fitted.params()) {
                coefficients[j] = coefficient;
            }
            fitted.intercept()
        };

        info!(
            "fitted linear regression of `{}` on {} features over {} rows",
            self.label_col,
            coefficients.len(),
            frame.num_rows()
        );

        Ok(LinearRegressionModel {
            coefficients,
            intercept,
            features_col: self.features_col.clone(),
            prediction_col: self.prediction_col.clone(),
        })
    }
}

impl LinearRegression {
    /// A constant column, or without an intercept an all-zero one
    fn is_degenerate(&self, column: ArrayView1<f64>) -> bool {
        let first = column[0];
        column.iter().all(|&v| v == first) && (self.fit_intercept || first == 0.0)
    }
}

/// Fitted linear model `prediction = coefficients · features + intercept`
#[derive(Clone, Debug, PartialEq)]
pub struct LinearRegressionModel {
    coefficients: Array1<f64>,
    intercept: f64,
    features_col: String,
    prediction_col: String,
}

impl LinearRegressionModel {
    pub fn coefficients(&self) -> &Array1<f64> {
        &self.coefficients
    }

    pub fn intercept(&self) -> f64 {
        self.intercept
    }

    pub fn num_features(&self) -> usize {
        self.coefficients.len()
    }

    pub fn predict(&self, records: &Array2<f64>) -> Result<Array1<f64>> {
        if records.ncols() != self.num_features() {
            return Err(Error::DimensionMismatch {
                expected: self.num_features(),
                actual: records.ncols(),
            });
        }
        Ok(records.dot(&self.coefficients) + self.intercept)
    }

    /// Renders the fitted line, e.g. `price = 1.23*bedrooms + 4.56`.
    ///
    /// Coefficients and intercept are rounded to two decimals. Feature names without a
    /// coefficient are ignored.
    pub fn formula<S: AsRef<str>>(&self, label: &str, feature_names: &[S]) -> String {
        let terms = self
            .coefficients
            .iter()
            .zip(feature_names)
            .map(|(coefficient, name)| format!("{}*{}", round2(*coefficient), name.as_ref()))
            .collect::<Vec<_>>();
        format!("{} = {} + {}", label, terms.join(" + "), round2(self.intercept))
    }
}

fn round2(x: f64) -> String {
    format_double((x * 100.0).round() / 100.0)
}

impl Transformer for LinearRegressionModel {
    fn transform(&self, session: &Session, frame: &Frame) -> Result<Frame> {
        append_predictions(
            session,
            frame,
            &self.features_col,
            &self.prediction_col,
            self.num_features(),
            |x| x.dot(&self.coefficients) + self.intercept,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frame::Column;
    use approx::assert_abs_diff_eq;
    use ndarray::array;

    fn session() -> Session {
        Session::builder().master("local[2]").build().unwrap()
    }

    /// `price = 20 * bedrooms + 10 * bathrooms + 50`
    fn listings() -> Frame {
        let rows = [(1.0, 1.0), (2.0, 1.0), (3.0, 2.0), (4.0, 1.5), (2.0, 2.0), (5.0, 3.0)];
        Frame::new(vec![
            (
                "features",
                Column::Vector(rows.iter().map(|&(b, t)| Some(array![b, t])).collect()),
            ),
            (
                "price",
                Column::Double(rows.iter().map(|&(b, t)| Some(20.0 * b + 10.0 * t + 50.0)).collect()),
            ),
        ])
        .unwrap()
    }

    #[test]
    fn recovers_exact_coefficients() {
        let session = session();
        let model = LinearRegression::new()
            .label_col("price")
            .fit(&session, &listings())
            .unwrap();

        assert_abs_diff_eq!(model.coefficients(), &array![20.0, 10.0], epsilon = 1e-8);
        assert_abs_diff_eq!(model.intercept(), 50.0, epsilon = 1e-8);

        let out = model.transform(&session, &listings().repartition(3).unwrap()).unwrap();
        let predictions = out.column("prediction").unwrap().as_doubles().unwrap();
        assert_abs_diff_eq!(predictions[2].unwrap(), 130.0, epsilon = 1e-8);
    }

    #[test]
    fn without_intercept() {
        let session = session();
        let frame = Frame::new(vec![
            ("features", Column::Vector(vec![Some(array![1.0]), Some(array![2.0])])),
            ("label", Column::Double(vec![Some(3.0), Some(6.0)])),
        ])
        .unwrap();
        let model = LinearRegression::new()
            .fit_intercept(false)
            .fit(&session, &frame)
            .unwrap();

        assert_abs_diff_eq!(model.coefficients()[0], 3.0, epsilon = 1e-10);
        assert_eq!(model.intercept(), 0.0);
    }

    #[test]
    fn constant_feature_gets_zero_coefficient() {
        let session = session();
        let frame = Frame::new(vec![
            (
                "features",
                Column::Vector((1..=6).map(|i| Some(array![2.0, i as f64])).collect()),
            ),
            ("price", Column::Double((1..=6).map(|i| Some(3.0 * i as f64 + 1.0)).collect())),
        ])
        .unwrap();
        let model = LinearRegression::new()
            .label_col("price")
            .fit(&session, &frame)
            .unwrap();

        assert_abs_diff_eq!(model.coefficients(), &array![0.0, 3.0], epsilon = 1e-8);
        assert_abs_diff_eq!(model.intercept(), 1.0, epsilon = 1e-8);
    }

    #[test]
    fn only_constant_features_predict_the_mean() {
        let session = session();
        let frame = Frame::new(vec![
            ("features", Column::Vector((0..6).map(|_| Some(array![2.0])).collect())),
            ("price", Column::Double((1..=6).map(|i| Some(i as f64)).collect())),
        ])
        .unwrap();
        let model = LinearRegression::new()
            .label_col("price")
            .fit(&session, &frame)
            .unwrap();

        assert_eq!(model.coefficients(), &array![0.0]);
        assert_abs_diff_eq!(model.intercept(), 3.5, epsilon = 1e-12);
        assert_abs_diff_eq!(model.predict(&array![[2.0]]).unwrap()[0], 3.5, epsilon = 1e-12);
    }

    #[test]
    fn formula_rounds_to_two_decimals() {
        let model = LinearRegressionModel {
            coefficients: array![123.456, -0.004],
            intercept: 47.511,
            features_col: "features".into(),
            prediction_col: "prediction".into(),
        };
        assert_eq!(
            model.formula("price", &["bedrooms", "beds"]),
            "price = 123.46*bedrooms + -0.0*beds + 47.51"
        );
    }

    #[test]
    fn predict_checks_dimensions() {
        let session = session();
        let model = LinearRegression::new()
            .label_col("price")
            .fit(&session, &listings())
            .unwrap();
        assert!(matches!(
            model.predict(&array![[1.0, 2.0, 3.0]]),
            Err(Error::DimensionMismatch { expected: 2, actual: 3 })
        ));
        assert_abs_diff_eq!(model.predict(&array![[1.0, 0.0]]).unwrap()[0], 70.0, epsilon = 1e-8);
    }

    #[test]
    fn empty_or_null_training_data_fails() {
        let session = session();
        let empty = listings().take(&[]);
        assert!(matches!(
            LinearRegression::new().label_col("price").fit(&session, &empty),
            Err(Error::EmptyDataset)
        ));

        let frame = listings()
            .with_column("price", Column::Double(vec![Some(1.0), None, Some(1.0), Some(1.0), Some(1.0), Some(1.0)]))
            .unwrap();
        assert!(matches!(
            LinearRegression::new().label_col("price").fit(&session, &frame),
            Err(Error::InvalidValue(_))
        ));
    }
}
