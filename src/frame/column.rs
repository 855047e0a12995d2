use std::ops::Range;

use ndarray::Array1;

use super::DataType;

/// A single nullable column of a [`Frame`](super::Frame)
#[derive(Debug, Clone, PartialEq)]
pub enum Column {
    Double(Vec<Option<f64>>),
    Long(Vec<Option<i64>>),
    String(Vec<Option<String>>),
    Boolean(Vec<Option<bool>>),
    Vector(Vec<Option<Array1<f64>>>),
}

impl Column {
    pub fn data_type(&self) -> DataType {
        match self {
            Column::Double(_) => DataType::Double,
            Column::Long(_) => DataType::Long,
            Column::String(_) => DataType::String,
            Column::Boolean(_) => DataType::Boolean,
            Column::Vector(_) => DataType::Vector,
        }
    }

    pub fn len(&self) -> usize {
        match self {
            Column::Double(v) => v.len(),
            Column::Long(v) => v.len(),
            Column::String(v) => v.len(),
            Column::Boolean(v) => v.len(),
            Column::Vector(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn is_null(&self, row: usize) -> bool {
        match self {
            Column::Double(v) => v[row].is_none(),
            Column::Long(v) => v[row].is_none(),
            Column::String(v) => v[row].is_none(),
            Column::Boolean(v) => v[row].is_none(),
            Column::Vector(v) => v[row].is_none(),
        }
    }

    /// Number of absent values in `rows`. NaN is a value, not an absence.
    pub fn null_count(&self, rows: Range<usize>) -> usize {
        rows.filter(|&row| self.is_null(row)).count()
    }

    pub fn as_doubles(&self) -> Option<&[Option<f64>]> {
        match self {
            Column::Double(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_vectors(&self) -> Option<&[Option<Array1<f64>>]> {
        match self {
            Column::Vector(v) => Some(v),
            _ => None,
        }
    }

    /// Reads `row` as a double, for the numeric column types.
    ///
    /// Booleans map to `1.0` / `0.0`. Returns `None` for absent values and for
    /// string or vector columns.
    pub fn numeric_value(&self, row: usize) -> Option<f64> {
        match self {
            Column::Double(v) => v[row],
            Column::Long(v) => v[row].map(|x| x as f64),
            Column::Boolean(v) => v[row].map(|b| if b { 1.0 } else { 0.0 }),
            Column::String(_) | Column::Vector(_) => None,
        }
    }

    /// Gathers the given rows, in order, into a new column.
    pub fn take(&self, indices: &[usize]) -> Column {
        fn gather<T: Clone>(values: &[T], indices: &[usize]) -> Vec<T> {
            indices.iter().map(|&i| values[i].clone()).collect()
        }

        match self {
            Column::Double(v) => Column::Double(gather(v, indices)),
            Column::Long(v) => Column::Long(gather(v, indices)),
            Column::String(v) => Column::String(gather(v, indices)),
            Column::Boolean(v) => Column::Boolean(gather(v, indices)),
            Column::Vector(v) => Column::Vector(gather(v, indices)),
        }
    }

    /// Display form of a single cell
    pub fn value_string(&self, row: usize) -> String {
        const NULL: &str = "null";
        match self {
            Column::Double(v) => v[row].map_or_else(|| NULL.into(), format_double),
            Column::Long(v) => v[row].map_or_else(|| NULL.into(), |x| x.to_string()),
            Column::String(v) => v[row].clone().unwrap_or_else(|| NULL.into()),
            Column::Boolean(v) => v[row].map_or_else(|| NULL.into(), |b| b.to_string()),
            Column::Vector(v) => match &v[row] {
                Some(values) => {
                    let items = values.iter().map(|&x| format_double(x)).collect::<Vec<_>>();
                    format!("[{}]", items.join(","))
                }
                None => NULL.into(),
            },
        }
    }
}

/// Formats doubles with a trailing `.0` for integral values, e.g. `2.0`, `150.5`, `NaN`.
pub(crate) fn format_double(x: f64) -> String {
    if x.is_nan() {
        "NaN".into()
    } else if x.is_infinite() {
        String::from(if x > 0.0 { "Infinity" } else { "-Infinity" })
    } else {
        format!("{:?}", x)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn counts_nulls_but_not_nan() {
        let column = Column::Double(vec![Some(1.0), None, Some(f64::NAN), None]);
        assert_eq!(column.null_count(0..4), 2);
        assert_eq!(column.null_count(0..2), 1);
        assert_eq!(column.null_count(2..2), 0);
    }

    #[test]
    fn reads_numeric_values() {
        let long = Column::Long(vec![Some(3), None]);
        let flag = Column::Boolean(vec![Some(true), Some(false)]);
        let text = Column::String(vec![Some("3".into())]);

        assert_eq!(long.numeric_value(0), Some(3.0));
        assert_eq!(long.numeric_value(1), None);
        assert_eq!(flag.numeric_value(0), Some(1.0));
        assert_eq!(flag.numeric_value(1), Some(0.0));
        assert_eq!(text.numeric_value(0), None);
    }

    #[test]
    fn renders_cells() {
        let doubles = Column::Double(vec![Some(2.0), Some(150.5), None]);
        let vectors = Column::Vector(vec![Some(array![1.0, 2.5]), None]);

        assert_eq!(doubles.value_string(0), "2.0");
        assert_eq!(doubles.value_string(1), "150.5");
        assert_eq!(doubles.value_string(2), "null");
        assert_eq!(vectors.value_string(0), "[1.0,2.5]");
        assert_eq!(vectors.value_string(1), "null");
    }

    #[test]
    fn takes_rows_in_order() {
        let column = Column::String(vec![Some("a".into()), None, Some("c".into())]);
        assert_eq!(
            column.take(&[2, 0, 2]),
            Column::String(vec![Some("c".into()), Some("a".into()), Some("c".into())])
        );
    }
}
