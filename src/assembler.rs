//! Feature vector assembly
//!
//! Concatenates an ordered list of numeric columns into one dense vector column, the
//! form in which regression estimators consume their features.
use std::fmt;

use log::debug;
use ndarray::Array1;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::frame::{map_partitions, Column, DataType, Frame};
use crate::session::Session;
use crate::traits::Transformer;

/// What to do with rows whose inputs hold a null or NaN
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HandleInvalid {
    /// Fail the transformation
    #[default]
    Error,
    /// Drop the row
    Skip,
    /// Keep the row and write NaN in place of the invalid value
    Keep,
}

impl fmt::Display for HandleInvalid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HandleInvalid::Error => write!(f, "error"),
            HandleInvalid::Skip => write!(f, "skip"),
            HandleInvalid::Keep => write!(f, "keep"),
        }
    }
}

/// Vector assembler
///
/// ### Example
///
/// ```
/// use price_prediction::prelude::*;
/// use price_prediction::frame::{Column, Frame};
///
/// let session = Session::builder().master("local[1]").build().unwrap();
/// let frame = Frame::new(vec![
///     ("bedrooms", Column::Double(vec![Some(2.0)])),
///     ("beds", Column::Long(vec![Some(3)])),
/// ])
/// .unwrap();
///
/// let assembled = VectorAssembler::new(["bedrooms", "beds"])
///     .transform(&session, &frame)
///     .unwrap();
/// assert_eq!(assembled.column("features").unwrap().value_string(0), "[2.0,3.0]");
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct VectorAssembler {
    input_cols: Vec<String>,
    output_col: String,
    handle_invalid: HandleInvalid,
}

/// Outcome of assembling one row
enum Assembled {
    Row(Array1<f64>),
    Skipped,
}

impl VectorAssembler {
    pub fn new<S: Into<String>>(input_cols: impl IntoIterator<Item = S>) -> Self {
        Self {
            input_cols: input_cols.into_iter().map(Into::into).collect(),
            output_col: "features".to_string(),
            handle_invalid: HandleInvalid::Error,
        }
    }

    pub fn output_col(mut self, output_col: impl Into<String>) -> Self {
        self.output_col = output_col.into();
        self
    }

    pub fn handle_invalid(mut self, handle_invalid: HandleInvalid) -> Self {
        self.handle_invalid = handle_invalid;
        self
    }

    pub fn input_cols(&self) -> &[String] {
        &self.input_cols
    }

    pub fn output_column(&self) -> &str {
        &self.output_col
    }

    fn resolve<'a>(&self, frame: &'a Frame) -> Result<Vec<(&'a str, &'a Column)>> {
        if self.input_cols.is_empty() {
            return Err(Error::InvalidParameter(
                "vector assembler needs at least one input column".to_string(),
            ));
        }

        self.input_cols
            .iter()
            .map(|name| {
                let idx = frame.schema().index_of(name)?;
                let column = &frame.columns()[idx];
                if column.data_type() == DataType::String {
                    return Err(Error::InvalidColumnType {
                        name: name.clone(),
                        expected: "double, long, boolean or vector".to_string(),
                        actual: DataType::String,
                    });
                }
                Ok((frame.schema().fields()[idx].name(), column))
            })
            .collect()
    }

    fn assemble_row(&self, inputs: &[(&str, &Column)], row: usize) -> Result<Assembled> {
        let mut values = Vec::with_capacity(inputs.len());
        for (name, column) in inputs {
            let invalid = |value: &str| {
                Error::InvalidValue(format!(
                    "{} in column `{}` at row {}; set handle_invalid to skip or keep",
                    value, name, row
                ))
            };

            match column {
                Column::Vector(vectors) => match &vectors[row] {
                    Some(vector) => {
                        if vector.iter().any(|v| v.is_nan()) {
                            match self.handle_invalid {
                                HandleInvalid::Error => return Err(invalid("NaN")),
                                HandleInvalid::Skip => return Ok(Assembled::Skipped),
                                HandleInvalid::Keep => {}
                            }
                        }
                        values.extend(vector.iter().copied());
                    }
                    None => match self.handle_invalid {
                        HandleInvalid::Skip => return Ok(Assembled::Skipped),
                        // the length of a missing vector is unknown
                        HandleInvalid::Error | HandleInvalid::Keep => return Err(invalid("null")),
                    },
                },
                _ => match column.numeric_value(row) {
                    Some(v) if !v.is_nan() => values.push(v),
                    value => match self.handle_invalid {
                        HandleInvalid::Error => {
                            return Err(invalid(if value.is_none() { "null" } else { "NaN" }))
                        }
                        HandleInvalid::Skip => return Ok(Assembled::Skipped),
                        HandleInvalid::Keep => values.push(f64::NAN),
                    },
                },
            }
        }
        Ok(Assembled::Row(Array1::from(values)))
    }
}

impl Transformer for VectorAssembler {
    /// Appends the output vector column, dropping rows under [`HandleInvalid::Skip`].
    fn transform(&self, session: &Session, frame: &Frame) -> Result<Frame> {
        let inputs = self.resolve(frame)?;

        let chunks = map_partitions(session, frame, |rows| {
            rows.map(|row| self.assemble_row(&inputs, row))
                .collect::<Result<Vec<_>>>()
        });

        let mut vectors = Vec::with_capacity(frame.num_rows());
        let mut kept = Vec::with_capacity(frame.num_rows());
        let mut row = 0;
        for chunk in chunks {
            for assembled in chunk? {
                if let Assembled::Row(vector) = assembled {
                    vectors.push(Some(vector));
                    kept.push(row);
                }
                row += 1;
            }
        }

        let out = if kept.len() == frame.num_rows() {
            frame.clone()
        } else {
            debug!(
                "skipped {} rows with invalid values",
                frame.num_rows() - kept.len()
            );
            frame.take(&kept)
        };
        out.with_column(&self.output_col, Column::Vector(vectors))
    }
}
