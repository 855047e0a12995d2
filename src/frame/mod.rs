//! Frames
//!
//! This module implements the in-memory columnar table that every stage of the
//! pipeline reads and produces. A frame is immutable: operations return a new frame
//! and leave the input untouched.
use std::ops::Range;

use crate::error::{Error, Result};

mod column;
mod partition;
mod schema;
mod show;

pub use column::Column;
pub use schema::{DataType, Field, Schema};

pub(crate) use column::format_double;
pub(crate) use partition::map_partitions;

/// Frame
///
/// A table of equally long, nullable columns described by a [`Schema`], together with
/// a partitioning of its rows.
///
/// # Fields
///
/// * `schema`: names and types of the columns, in order
/// * `columns`: one [`Column`] per schema field
/// * `partitions`: contiguous row ranges covering all rows exactly once
#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    schema: Schema,
    columns: Vec<Column>,
    partitions: Vec<Range<usize>>,
}

impl Frame {
    /// Creates a single-partition frame from named columns.
    ///
    /// Fails if the names are not unique or the columns differ in length.
    pub fn new<S: Into<String>>(columns: Vec<(S, Column)>) -> Result<Self> {
        let (names, columns): (Vec<String>, Vec<Column>) = columns
            .into_iter()
            .map(|(name, column)| (name.into(), column))
            .unzip();

        let fields = names
            .into_iter()
            .zip(&columns)
            .map(|(name, column)| Field::new(name, column.data_type(), true))
            .collect();

        Self::from_parts(Schema::new(fields)?, columns)
    }

    pub(crate) fn from_parts(schema: Schema, columns: Vec<Column>) -> Result<Self> {
        let num_rows = columns.first().map_or(0, Column::len);
        if let Some((field, column)) = schema
            .fields()
            .iter()
            .zip(&columns)
            .find(|(_, c)| c.len() != num_rows)
        {
            return Err(Error::InvalidValue(format!(
                "column `{}` has {} rows, expected {}",
                field.name(),
                column.len(),
                num_rows
            )));
        }

        Ok(Self {
            schema,
            columns,
            partitions: partition::split_ranges(num_rows, 1),
        })
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn num_rows(&self) -> usize {
        self.columns.first().map_or(0, Column::len)
    }

    pub fn num_columns(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.num_rows() == 0
    }

    pub fn column(&self, name: &str) -> Result<&Column> {
        self.schema.index_of(name).map(|idx| &self.columns[idx])
    }

    pub fn partitions(&self) -> &[Range<usize>] {
        &self.partitions
    }

    pub fn num_partitions(&self) -> usize {
        self.partitions.len()
    }

    /// Returns a frame whose rows are re-chunked into `num_partitions` ranges.
    ///
    /// Rows keep their order; only the unit of parallel work changes. The partition
    /// count is capped by the number of rows.
    pub fn repartition(&self, num_partitions: usize) -> Result<Self> {
        if num_partitions == 0 {
            return Err(Error::InvalidParameter(
                "number of partitions must be positive".to_string(),
            ));
        }
        Ok(Self {
            partitions: partition::split_ranges(self.num_rows(), num_partitions),
            ..self.clone()
        })
    }

    /// Projects the named columns, in the given order.
    pub fn select<S: AsRef<str>>(&self, names: &[S]) -> Result<Self> {
        let mut fields = Vec::with_capacity(names.len());
        let mut columns = Vec::with_capacity(names.len());
        for name in names {
            let idx = self.schema.index_of(name.as_ref())?;
            fields.push(self.schema.fields()[idx].clone());
            columns.push(self.columns[idx].clone());
        }

        Ok(Self {
            schema: Schema::new(fields)?,
            columns,
            partitions: self.partitions.clone(),
        })
    }

    /// Replaces the column called `name`, or appends it when there is none.
    pub fn with_column(&self, name: &str, column: Column) -> Result<Self> {
        if column.len() != self.num_rows() && self.num_columns() > 0 {
            return Err(Error::InvalidValue(format!(
                "column `{}` has {} rows, expected {}",
                name,
                column.len(),
                self.num_rows()
            )));
        }

        let mut fields = self.schema.fields().to_vec();
        let mut columns = self.columns.clone();
        let field = Field::new(name, column.data_type(), true);
        match self.schema.index_of(name) {
            Ok(idx) => {
                fields[idx] = field;
                columns[idx] = column;
            }
            Err(_) => {
                fields.push(field);
                columns.push(column);
            }
        }

        let partitions = if self.num_columns() == 0 {
            partition::split_ranges(columns[0].len(), 1)
        } else {
            self.partitions.clone()
        };

        Ok(Self {
            schema: Schema::new(fields)?,
            columns,
            partitions,
        })
    }

    /// Gathers the given rows into a new frame with the same partition count.
    pub fn take(&self, indices: &[usize]) -> Self {
        Self {
            schema: self.schema.clone(),
            columns: self.columns.iter().map(|c| c.take(indices)).collect(),
            partitions: partition::split_ranges(indices.len(), self.num_partitions()),
        }
    }

    /// The first `n` rows
    pub fn head(&self, n: usize) -> Self {
        let indices = (0..n.min(self.num_rows())).collect::<Vec<_>>();
        self.take(&indices)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn listings() -> Frame {
        Frame::new(vec![
            ("bedrooms", Column::Double(vec![Some(1.0), None, Some(3.0), Some(2.0)])),
            (
                "room_type",
                Column::String(vec![
                    Some("Private room".into()),
                    Some("Entire home/apt".into()),
                    None,
                    Some("Shared room".into()),
                ]),
            ),
            (
                "price",
                Column::Double(vec![Some(80.0), Some(150.0), Some(240.0), Some(60.0)]),
            ),
        ])
        .unwrap()
    }

    #[test]
    fn builds_schema_from_columns() {
        let frame = listings();
        assert_eq!(frame.num_rows(), 4);
        assert_eq!(frame.num_columns(), 3);
        assert_eq!(frame.num_partitions(), 1);
        assert_eq!(
            frame.schema().field("room_type").unwrap().data_type(),
            DataType::String
        );
    }

    #[test]
    fn rejects_ragged_columns() {
        let result = Frame::new(vec![
            ("a", Column::Double(vec![Some(1.0)])),
            ("b", Column::Double(vec![Some(1.0), Some(2.0)])),
        ]);
        assert!(matches!(result, Err(Error::InvalidValue(_))));
    }

    #[test]
    fn selects_in_requested_order() {
        let frame = listings().select(&["price", "bedrooms"]).unwrap();
        assert_eq!(frame.schema().names().collect::<Vec<_>>(), vec!["price", "bedrooms"]);
        assert!(matches!(
            listings().select(&["bathrooms"]),
            Err(Error::ColumnNotFound(name)) if name == "bathrooms"
        ));
    }

    #[test]
    fn with_column_replaces_or_appends() {
        let frame = listings();
        let replaced = frame
            .with_column("bedrooms", Column::Double(vec![Some(0.0); 4]))
            .unwrap();
        assert_eq!(replaced.num_columns(), 3);
        assert_eq!(replaced.schema().index_of("bedrooms").unwrap(), 0);
        assert_eq!(replaced.column("bedrooms").unwrap().numeric_value(1), Some(0.0));

        let appended = frame
            .with_column("beds", Column::Long(vec![Some(1); 4]))
            .unwrap();
        assert_eq!(appended.num_columns(), 4);
        assert_eq!(
            appended.schema().field("beds").unwrap().data_type(),
            DataType::Long
        );

        assert!(frame
            .with_column("beds", Column::Long(vec![Some(1)]))
            .is_err());
    }

    #[test]
    fn repartition_keeps_rows() {
        let frame = listings().repartition(3).unwrap();
        assert_eq!(frame.num_partitions(), 3);
        assert_eq!(frame.partitions(), &[0..2, 2..3, 3..4]);
        assert_eq!(frame.columns(), listings().columns());

        assert_eq!(listings().repartition(200).unwrap().num_partitions(), 4);
        assert!(listings().repartition(0).is_err());
    }

    #[test]
    fn take_and_head() {
        let frame = listings().repartition(2).unwrap();
        let taken = frame.take(&[3, 0]);
        assert_eq!(taken.num_rows(), 2);
        assert_eq!(taken.num_partitions(), 2);
        assert_eq!(taken.column("price").unwrap().numeric_value(0), Some(60.0));

        assert_eq!(frame.head(3).num_rows(), 3);
        assert_eq!(frame.head(10).num_rows(), 4);
    }
}
