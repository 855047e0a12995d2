//! Regression metrics over a frame of predictions
use std::fmt;

use linfa::prelude::SingleTargetRegression;
use log::debug;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::frame::Frame;
use crate::regression::label_vector;
use crate::session::Session;

/// Metric computed by a [`RegressionEvaluator`]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RegressionMetric {
    /// Root mean squared error
    #[default]
    Rmse,
    /// Mean squared error
    Mse,
    /// Mean absolute error
    Mae,
    /// Coefficient of determination
    R2,
    /// Explained variance, the mean squared deviation of the predictions from the mean label
    Var,
}

impl fmt::Display for RegressionMetric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RegressionMetric::Rmse => write!(f, "rmse"),
            RegressionMetric::Mse => write!(f, "mse"),
            RegressionMetric::Mae => write!(f, "mae"),
            RegressionMetric::R2 => write!(f, "r2"),
            RegressionMetric::Var => write!(f, "var"),
        }
    }
}

/// Compares a prediction column against a label column
///
/// ```
/// use price_prediction::prelude::*;
/// use price_prediction::frame::{Column, Frame};
///
/// let session = Session::builder().master("local[1]").build().unwrap();
/// let frame = Frame::new(vec![
///     ("label", Column::Double(vec![Some(1.0), Some(3.0)])),
///     ("prediction", Column::Double(vec![Some(2.0), Some(2.0)])),
/// ])
/// .unwrap();
///
/// let rmse = RegressionEvaluator::new().evaluate(&session, &frame).unwrap();
/// assert_eq!(rmse, 1.0);
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RegressionEvaluator {
    prediction_col: String,
    label_col: String,
    metric: RegressionMetric,
}

impl Default for RegressionEvaluator {
    fn default() -> Self {
        Self {
            prediction_col: "prediction".to_string(),
            label_col: "label".to_string(),
            metric: RegressionMetric::Rmse,
        }
    }
}

impl RegressionEvaluator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn prediction_col(mut self, prediction_col: impl Into<String>) -> Self {
        self.prediction_col = prediction_col.into();
        self
    }

    pub fn label_col(mut self, label_col: impl Into<String>) -> Self {
        self.label_col = label_col.into();
        self
    }

    pub fn metric(mut self, metric: RegressionMetric) -> Self {
        self.metric = metric;
        self
    }

    /// Whether a larger value of the metric means a better model
    pub fn is_larger_better(&self) -> bool {
        matches!(self.metric, RegressionMetric::R2 | RegressionMetric::Var)
    }

    pub fn evaluate(&self, _session: &Session, frame: &Frame) -> Result<f64> {
        if frame.is_empty() {
            return Err(Error::EmptyDataset);
        }
        let predictions = label_vector(frame, &self.prediction_col)?;
        let labels = label_vector(frame, &self.label_col)?;

        let value = match self.metric {
            RegressionMetric::Rmse => predictions.mean_squared_error(&labels)?.sqrt(),
            RegressionMetric::Mse => predictions.mean_squared_error(&labels)?,
            RegressionMetric::Mae => predictions.mean_absolute_error(&labels)?,
            RegressionMetric::R2 => predictions.r2(&labels)?,
            RegressionMetric::Var => {
                let mean = labels.sum() / labels.len() as f64;
                predictions.mapv(|p| (p - mean) * (p - mean)).sum() / predictions.len() as f64
            }
        };

        debug!(
            "{} of `{}` over {} rows is {}",
            self.metric,
            self.prediction_col,
            frame.num_rows(),
            value
        );
        Ok(value)
    }
}
