//! Regression estimators
//!
//! The estimators read their features from a vector column and their label from a
//! numeric column, fit a `linfa` model on the resulting `ndarray` matrices and return
//! models that append a `prediction` column.
use ndarray::{Array1, Array2};

use crate::error::{Error, Result};
use crate::frame::{map_partitions, Column, DataType, Frame};
use crate::session::Session;

mod forest;
mod linear;

pub use forest::{FeatureSubsetStrategy, RandomForestRegressionModel, RandomForestRegressor};
pub use linear::{LinearRegression, LinearRegressionModel};

fn vector_column<'a>(frame: &'a Frame, name: &str) -> Result<&'a [Option<Array1<f64>>]> {
    let column = frame.column(name)?;
    column.as_vectors().ok_or_else(|| Error::InvalidColumnType {
        name: name.to_string(),
        expected: DataType::Vector.to_string(),
        actual: column.data_type(),
    })
}

/// Stacks the feature vectors of `rows` into a matrix with `num_features` columns.
fn stack(
    vectors: &[Option<Array1<f64>>],
    name: &str,
    offset: usize,
    num_features: usize,
) -> Result<Array2<f64>> {
    let mut flat = Vec::with_capacity(vectors.len() * num_features);
    for (i, vector) in vectors.iter().enumerate() {
        let vector = vector.as_ref().ok_or_else(|| {
            Error::InvalidValue(format!("null feature vector in `{}` at row {}", name, offset + i))
        })?;
        if vector.len() != num_features {
            return Err(Error::DimensionMismatch {
                expected: num_features,
                actual: vector.len(),
            });
        }
        flat.extend(vector.iter().copied());
    }
    Ok(Array2::from_shape_vec((vectors.len(), num_features), flat)?)
}

/// Training matrix of the vector column `features_col`.
///
/// All vectors must be present and equally long.
pub(crate) fn feature_matrix(frame: &Frame, features_col: &str) -> Result<Array2<f64>> {
    let vectors = vector_column(frame, features_col)?;
    let num_features = vectors.iter().flatten().map(|v| v.len()).next().unwrap_or(0);
    stack(vectors, features_col, 0, num_features).map_err(|err| match err {
        Error::DimensionMismatch { expected, actual } => Error::InvalidValue(format!(
            "feature vectors in `{}` differ in length: {} and {}",
            features_col, expected, actual
        )),
        err => err,
    })
}

/// Labels of `label_col` as doubles; every label must be present.
pub(crate) fn label_vector(frame: &Frame, label_col: &str) -> Result<Array1<f64>> {
    let column = frame.column(label_col)?;
    if matches!(column, Column::String(_) | Column::Vector(_)) {
        return Err(Error::InvalidColumnType {
            name: label_col.to_string(),
            expected: DataType::Double.to_string(),
            actual: column.data_type(),
        });
    }

    (0..frame.num_rows())
        .map(|row| {
            column.numeric_value(row).ok_or_else(|| {
                Error::InvalidValue(format!("null value in `{}` at row {}", label_col, row))
            })
        })
        .collect()
}

/// Appends `prediction_col`, predicting every partition of `frame` in parallel.
pub(crate) fn append_predictions<P>(
    session: &Session,
    frame: &Frame,
    features_col: &str,
    prediction_col: &str,
    num_features: usize,
    predict: P,
) -> Result<Frame>
where
    P: Fn(&Array2<f64>) -> Array1<f64> + Sync + Send,
{
    let vectors = vector_column(frame, features_col)?;
    let chunks = map_partitions(session, frame, |rows| {
        let x = stack(&vectors[rows.clone()], features_col, rows.start, num_features)?;
        Ok(predict(&x).iter().map(|&p| Some(p)).collect::<Vec<_>>())
    });

    let predictions = chunks.into_iter().collect::<Result<Vec<_>>>()?.concat();
    frame.with_column(prediction_col, Column::Double(predictions))
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    fn frame() -> Frame {
        Frame::new(vec![
            (
                "features",
                Column::Vector(vec![Some(array![1.0, 2.0]), Some(array![3.0, 4.0])]),
            ),
            ("price", Column::Long(vec![Some(100), Some(200)])),
        ])
        .unwrap()
    }

    #[test]
    fn extracts_matrix_and_labels() {
        let frame = frame();
        assert_eq!(
            feature_matrix(&frame, "features").unwrap(),
            array![[1.0, 2.0], [3.0, 4.0]]
        );
        assert_eq!(label_vector(&frame, "price").unwrap(), array![100.0, 200.0]);
        assert!(matches!(
            feature_matrix(&frame, "price"),
            Err(Error::InvalidColumnType { .. })
        ));
        assert!(matches!(
            label_vector(&frame, "features"),
            Err(Error::InvalidColumnType { .. })
        ));
    }

    #[test]
    fn rejects_ragged_or_null_vectors() {
        let ragged = Frame::new(vec![(
            "features",
            Column::Vector(vec![Some(array![1.0]), Some(array![1.0, 2.0])]),
        )])
        .unwrap();
        assert!(matches!(
            feature_matrix(&ragged, "features"),
            Err(Error::InvalidValue(_))
        ));

        let null = Frame::new(vec![(
            "features",
            Column::Vector(vec![Some(array![1.0]), None]),
        )])
        .unwrap();
        assert!(matches!(
            feature_matrix(&null, "features"),
            Err(Error::InvalidValue(_))
        ));
    }

    #[test]
    fn predictions_keep_row_order() {
        let session = Session::builder().master("local[2]").build().unwrap();
        let frame = frame().repartition(2).unwrap();
        let first = |x: &Array2<f64>| x.column(0).to_owned();

        let out = append_predictions(&session, &frame, "features", "prediction", 2, first).unwrap();
        assert_eq!(
            out.column("prediction").unwrap(),
            &Column::Double(vec![Some(1.0), Some(3.0)])
        );

        assert!(matches!(
            append_predictions(&session, &frame, "features", "prediction", 3, first),
            Err(Error::DimensionMismatch { expected: 3, actual: 2 })
        ));
    }
}
