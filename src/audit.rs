//! Null audit
//!
//! Counts the absent values of every column of a frame. The audit only reports; it
//! never changes the frame.
use std::fmt;

use log::debug;

use crate::frame::{map_partitions, Frame};
use crate::session::Session;

/// Number of absent values per column, in schema order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NullCounts {
    counts: Vec<(String, usize)>,
}

impl NullCounts {
    pub fn get(&self, name: &str) -> Option<usize> {
        self.counts
            .iter()
            .find(|(column, _)| column == name)
            .map(|(_, count)| *count)
    }

    /// Absent values over all columns
    pub fn total(&self) -> usize {
        self.counts.iter().map(|(_, count)| count).sum()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, usize)> {
        self.counts
            .iter()
            .map(|(column, count)| (column.as_str(), *count))
    }

    /// Columns with at least one absent value
    pub fn incomplete(&self) -> Vec<&str> {
        self.iter()
            .filter(|(_, count)| *count > 0)
            .map(|(column, _)| column)
            .collect()
    }
}

/// Renders as a dictionary literal, e.g. `{'bedrooms': 3, 'price': 0}`
impl fmt::Display for NullCounts {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{")?;
        for (i, (column, count)) in self.counts.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "'{}': {}", column, count)?;
        }
        write!(f, "}}")
    }
}

/// Counts the nulls of every column, one parallel task per partition.
///
/// NaN is a value, not an absence, so it is not counted.
pub fn null_counts(session: &Session, frame: &Frame) -> NullCounts {
    let partials = map_partitions(session, frame, |rows| {
        frame
            .columns()
            .iter()
            .map(|column| column.null_count(rows.clone()))
            .collect::<Vec<_>>()
    });

    let mut totals = vec![0; frame.num_columns()];
    for partial in partials {
        for (total, count) in totals.iter_mut().zip(partial) {
            *total += count;
        }
    }
    debug!(
        "counted nulls over {} partitions of {} rows",
        frame.num_partitions(),
        frame.num_rows()
    );

    NullCounts {
        counts: frame.schema().names().map(str::to_string).zip(totals).collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frame::Column;

    fn session() -> Session {
        Session::builder().master("local[2]").build().unwrap()
    }

    #[test]
    fn counts_nulls_per_column() {
        let frame = Frame::new(vec![
            (
                "bedrooms",
                Column::Double(vec![Some(1.0), None, Some(f64::NAN), None, Some(2.0)]),
            ),
            (
                "room_type",
                Column::String(vec![None, Some("Private room".into()), None, None, None]),
            ),
            ("price", Column::Double(vec![Some(100.0); 5])),
        ])
        .unwrap()
        .repartition(3)
        .unwrap();

        let counts = null_counts(&session(), &frame);

        assert_eq!(counts.get("bedrooms"), Some(2));
        assert_eq!(counts.get("room_type"), Some(4));
        assert_eq!(counts.get("price"), Some(0));
        assert_eq!(counts.get("beds"), None);
        assert_eq!(counts.total(), 6);
        assert_eq!(counts.incomplete(), vec!["bedrooms", "room_type"]);
        assert_eq!(
            counts.to_string(),
            "{'bedrooms': 2, 'room_type': 4, 'price': 0}"
        );
    }

    #[test]
    fn partitioning_does_not_change_counts() {
        let column = Column::Long((0..100).map(|i| if i % 7 == 0 { None } else { Some(i) }).collect());
        let frame = Frame::new(vec![("number_of_reviews", column)]).unwrap();

        let session = session();
        let single = null_counts(&session, &frame);
        let many = null_counts(&session, &frame.repartition(9).unwrap());
        assert_eq!(single, many);
        assert_eq!(single.get("number_of_reviews"), Some(15));
    }
}
