//! Missing value imputation
//!
//! The imputer replaces the missing values of double columns by a surrogate computed
//! from the values that are present: their mean, median or most frequent value. A value
//! is missing when it is null, NaN or equal to the configured missing value.
use std::fmt;

use linfa::ParamGuard;
use log::{debug, info};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::frame::{map_partitions, Column, DataType, Frame};
use crate::session::Session;
use crate::traits::{Estimator, Transformer};

/// Statistic used as the surrogate of a column
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImputerStrategy {
    #[default]
    Mean,
    /// Lower median, i.e. the smaller middle value for an even count
    Median,
    /// Most frequent value, the smallest of them on ties
    Mode,
}

impl fmt::Display for ImputerStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ImputerStrategy::Mean => write!(f, "mean"),
            ImputerStrategy::Median => write!(f, "median"),
            ImputerStrategy::Mode => write!(f, "mode"),
        }
    }
}

/// Checked imputer parameters
///
/// ### Attributes
///
/// * `input_cols`: double columns to impute
/// * `output_cols`: columns the imputed values are written to, one per input column.
///   Defaults to the input columns, which imputes in place.
/// * `strategy`: how the surrogate is computed, [`ImputerStrategy::Mean`] by default
/// * `missing_value`: value that is treated as missing besides null and NaN. Defaults
///   to NaN, i.e. only null and NaN are missing.
#[derive(Clone, Debug, PartialEq)]
pub struct ImputerValidParams {
    input_cols: Vec<String>,
    output_cols: Vec<String>,
    strategy: ImputerStrategy,
    missing_value: f64,
}

impl ImputerValidParams {
    pub fn input_cols(&self) -> &[String] {
        &self.input_cols
    }

    pub fn output_cols(&self) -> &[String] {
        &self.output_cols
    }

    pub fn strategy(&self) -> ImputerStrategy {
        self.strategy
    }

    pub fn missing_value(&self) -> f64 {
        self.missing_value
    }

    fn is_missing(&self, value: Option<f64>) -> bool {
        match value {
            None => true,
            Some(v) => v.is_nan() || v == self.missing_value,
        }
    }

    fn surrogate(&self, session: &Session, frame: &Frame, name: &str) -> Result<f64> {
        let values = double_column(frame, name)?;

        let surrogate = match self.strategy {
            ImputerStrategy::Mean => {
                let partials = map_partitions(session, frame, |rows| {
                    values[rows]
                        .iter()
                        .filter(|v| !self.is_missing(**v))
                        .flatten()
                        .fold((0.0, 0usize), |(sum, count), v| (sum + v, count + 1))
                });
                let (sum, count) = partials
                    .into_iter()
                    .fold((0.0, 0), |(sum, count), (s, c)| (sum + s, count + c));
                (count > 0).then(|| sum / count as f64)
            }
            ImputerStrategy::Median => {
                let sorted = self.sorted_present(values);
                (!sorted.is_empty()).then(|| sorted[(sorted.len() - 1) / 2])
            }
            ImputerStrategy::Mode => most_frequent(&self.sorted_present(values)),
        };

        surrogate.ok_or_else(|| Error::EmptyColumn(name.to_string()))
    }

    fn sorted_present(&self, values: &[Option<f64>]) -> Vec<f64> {
        let mut present = values
            .iter()
            .filter(|v| !self.is_missing(**v))
            .flatten()
            .copied()
            .collect::<Vec<_>>();
        present.sort_by(f64::total_cmp);
        present
    }
}

/// Smallest of the most frequent values of a sorted slice
fn most_frequent(sorted: &[f64]) -> Option<f64> {
    let mut best: Option<(f64, usize)> = None;
    let mut start = 0;
    while start < sorted.len() {
        let value = sorted[start];
        let run = sorted[start..].iter().take_while(|&&v| v == value).count();
        if best.map_or(true, |(_, count)| run > count) {
            best = Some((value, run));
        }
        start += run;
    }
    best.map(|(value, _)| value)
}

fn double_column<'a>(frame: &'a Frame, name: &str) -> Result<&'a [Option<f64>]> {
    let column = frame.column(name)?;
    column.as_doubles().ok_or_else(|| Error::InvalidColumnType {
        name: name.to_string(),
        expected: DataType::Double.to_string(),
        actual: column.data_type(),
    })
}

#[derive(Clone, Debug, PartialEq)]
pub struct ImputerParams(ImputerValidParams);

/// Imputer estimator, see [`ImputerParams`]
pub type Imputer = ImputerParams;

impl ImputerParams {
    /// Imputes `input_cols` in place with the column means.
    pub fn new<S: Into<String>>(input_cols: impl IntoIterator<Item = S>) -> Self {
        let input_cols = input_cols.into_iter().map(Into::into).collect::<Vec<String>>();
        Self(ImputerValidParams {
            output_cols: input_cols.clone(),
            input_cols,
            strategy: ImputerStrategy::Mean,
            missing_value: f64::NAN,
        })
    }

    pub fn output_cols<S: Into<String>>(mut self, output_cols: impl IntoIterator<Item = S>) -> Self {
        self.0.output_cols = output_cols.into_iter().map(Into::into).collect();
        self
    }

    pub fn strategy(mut self, strategy: ImputerStrategy) -> Self {
        self.0.strategy = strategy;
        self
    }

    pub fn missing_value(mut self, missing_value: f64) -> Self {
        self.0.missing_value = missing_value;
        self
    }
}

impl ParamGuard for ImputerParams {
    type Checked = ImputerValidParams;
    type Error = Error;

    fn check_ref(&self) -> Result<&Self::Checked> {
        if self.0.input_cols.is_empty() {
            Err(Error::InvalidParameter(
                "imputer needs at least one input column".to_string(),
            ))
        } else if self.0.output_cols.len() != self.0.input_cols.len() {
            Err(Error::InvalidParameter(format!(
                "imputer has {} input columns but {} output columns",
                self.0.input_cols.len(),
                self.0.output_cols.len()
            )))
        } else {
            Ok(&self.0)
        }
    }

    fn check(self) -> Result<Self::Checked> {
        self.check_ref()?;
        Ok(self.0)
    }
}

impl Estimator for ImputerParams {
    type Model = ImputerModel;

    /// Computes the surrogate of every input column.
    fn fit(&self, session: &Session, frame: &Frame) -> Result<ImputerModel> {
        let params = self.check_ref()?;

        let surrogates = params
            .input_cols
            .iter()
            .map(|name| params.surrogate(session, frame, name))
            .collect::<Result<Vec<_>>>()?;

        info!(
            "fitted {} imputer on {} columns",
            params.strategy,
            surrogates.len()
        );

        Ok(ImputerModel {
            params: params.clone(),
            surrogates,
        })
    }
}

/// Fitted imputer holding one surrogate per input column
#[derive(Clone, Debug, PartialEq)]
pub struct ImputerModel {
    params: ImputerValidParams,
    surrogates: Vec<f64>,
}

impl ImputerModel {
    // Violates the convention that new should return a value of type `Self`
    #[allow(clippy::new_ret_no_self)]
    pub fn params<S: Into<String>>(input_cols: impl IntoIterator<Item = S>) -> ImputerParams {
        ImputerParams::new(input_cols)
    }

    /// Input column names paired with their surrogates
    pub fn surrogates(&self) -> Vec<(String, f64)> {
        self.params
            .input_cols
            .iter()
            .cloned()
            .zip(self.surrogates.iter().copied())
            .collect()
    }

    pub fn surrogate(&self, name: &str) -> Option<f64> {
        self.params
            .input_cols
            .iter()
            .position(|col| col == name)
            .map(|idx| self.surrogates[idx])
    }
}

impl Transformer for ImputerModel {
    /// Writes every output column, substituting the surrogate for missing values.
    fn transform(&self, session: &Session, frame: &Frame) -> Result<Frame> {
        let mut out = frame.clone();
        let columns = self.params.input_cols.iter().zip(&self.params.output_cols);
        for ((input, output), &surrogate) in columns.zip(&self.surrogates) {
            let values = double_column(frame, input)?;
            let chunks = map_partitions(session, frame, |rows| {
                values[rows]
                    .iter()
                    .map(|&v| {
                        if self.params.is_missing(v) {
                            Some(surrogate)
                        } else {
                            v
                        }
                    })
                    .collect::<Vec<_>>()
            });

            let imputed = Column::Double(chunks.concat());
            debug!(
                "imputed {} values of `{}` into `{}`",
                values.iter().filter(|v| self.params.is_missing(**v)).count(),
                input,
                output
            );
            out = out.with_column(output, imputed)?;
        }
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn session() -> Session {
        Session::builder().master("local[2]").build().unwrap()
    }

    fn listings() -> Frame {
        Frame::new(vec![
            (
                "bedrooms",
                Column::Double(vec![Some(1.0), None, Some(3.0), Some(f64::NAN), Some(2.0), Some(2.0)]),
            ),
            (
                "review_scores_rating",
                Column::Double(vec![Some(90.0), Some(-1.0), Some(100.0), None, Some(80.0), Some(-1.0)]),
            ),
            (
                "room_type",
                Column::String(vec![Some("Private room".into()); 6]),
            ),
        ])
        .unwrap()
        .repartition(4)
        .unwrap()
    }

    #[test]
    fn mean_ignores_null_and_nan() {
        let session = session();
        let model = Imputer::new(["bedrooms"]).fit(&session, &listings()).unwrap();
        assert_abs_diff_eq!(model.surrogate("bedrooms").unwrap(), 2.0);

        let imputed = model.transform(&session, &listings()).unwrap();
        assert_eq!(
            imputed.column("bedrooms").unwrap(),
            &Column::Double(vec![Some(1.0), Some(2.0), Some(3.0), Some(2.0), Some(2.0), Some(2.0)])
        );
    }

    #[test]
    fn custom_missing_value() {
        let session = session();
        let model = Imputer::new(["review_scores_rating"])
            .missing_value(-1.0)
            .fit(&session, &listings())
            .unwrap();
        assert_abs_diff_eq!(model.surrogate("review_scores_rating").unwrap(), 90.0);

        let imputed = model.transform(&session, &listings()).unwrap();
        let column = imputed.column("review_scores_rating").unwrap();
        assert_eq!(column.null_count(0..6), 0);
        assert_eq!(column.numeric_value(1), Some(90.0));
    }

    #[test]
    fn median_and_mode() {
        let session = session();
        let median = Imputer::new(["bedrooms"])
            .strategy(ImputerStrategy::Median)
            .fit(&session, &listings())
            .unwrap();
        // present values 1, 2, 2, 3
        assert_eq!(median.surrogate("bedrooms"), Some(2.0));

        let mode = Imputer::new(["bedrooms"])
            .strategy(ImputerStrategy::Mode)
            .fit(&session, &listings())
            .unwrap();
        assert_eq!(mode.surrogate("bedrooms"), Some(2.0));

        assert_eq!(most_frequent(&[1.0, 1.0, 3.0, 3.0, 4.0]), Some(1.0));
        assert_eq!(most_frequent(&[]), None);
    }

    #[test]
    fn writes_separate_output_columns() {
        let session = session();
        let frame = listings();
        let model = Imputer::new(["bedrooms"])
            .output_cols(["bedrooms_imputed"])
            .fit(&session, &frame)
            .unwrap();
        let imputed = model.transform(&session, &frame).unwrap();

        assert_eq!(imputed.num_columns(), 4);
        // the source column keeps its NaN, which derived equality would reject
        let same_bits = |column: &Column| match column {
            Column::Double(values) => values
                .iter()
                .map(|v| v.map(f64::to_bits))
                .collect::<Vec<_>>(),
            other => panic!("unexpected column {:?}", other),
        };
        assert_eq!(
            same_bits(imputed.column("bedrooms").unwrap()),
            same_bits(frame.column("bedrooms").unwrap())
        );
        assert_eq!(imputed.column("bedrooms_imputed").unwrap().null_count(0..6), 0);
        assert_eq!(model.surrogates(), vec![("bedrooms".to_string(), 2.0)]);
    }

    #[test]
    fn rejects_invalid_input() {
        let session = session();
        let frame = listings();

        assert!(matches!(
            Imputer::new(Vec::<String>::new()).fit(&session, &frame),
            Err(Error::InvalidParameter(_))
        ));
        assert!(matches!(
            Imputer::new(["bedrooms"]).output_cols(["a", "b"]).fit(&session, &frame),
            Err(Error::InvalidParameter(_))
        ));
        assert!(matches!(
            Imputer::new(["beds"]).fit(&session, &frame),
            Err(Error::ColumnNotFound(_))
        ));
        assert!(matches!(
            Imputer::new(["room_type"]).fit(&session, &frame),
            Err(Error::InvalidColumnType { .. })
        ));

        let empty = Frame::new(vec![("beds", Column::Double(vec![None, Some(f64::NAN)]))]).unwrap();
        assert!(matches!(
            Imputer::new(["beds"]).fit(&session, &empty),
            Err(Error::EmptyColumn(name)) if name == "beds"
        ));
    }
}
