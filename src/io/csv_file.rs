use std::fs::File;
use std::io::Read;
use std::path::Path;

use csv::ReaderBuilder;

use crate::error::Result;
use crate::frame::{Column, Frame};

/// Cells that denote an absent value
const NULL_MARKERS: [&str; 4] = ["", "null", "NULL", "NA"];

fn parse_cell(cell: &str) -> Option<String> {
    let cell = cell.trim();
    if NULL_MARKERS.contains(&cell) {
        None
    } else {
        Some(cell.to_string())
    }
}

fn parse_bool(cell: &str) -> Option<bool> {
    if cell.eq_ignore_ascii_case("true") {
        Some(true)
    } else if cell.eq_ignore_ascii_case("false") {
        Some(false)
    } else {
        None
    }
}

/// Infers the narrowest column type that holds every present cell.
///
/// Numbers become doubles, `true`/`false` become booleans, anything else (including
/// a column without a single present cell) stays a string.
fn infer_column(cells: Vec<Option<String>>) -> Column {
    let mut present = cells.iter().flatten().peekable();
    if present.peek().is_none() {
        return Column::String(cells);
    }

    if present.all(|c| c.parse::<f64>().is_ok()) {
        return Column::Double(
            cells
                .iter()
                .map(|c| c.as_ref().and_then(|c| c.parse().ok()))
                .collect(),
        );
    }

    if cells.iter().flatten().all(|c| parse_bool(c).is_some()) {
        return Column::Boolean(
            cells
                .iter()
                .map(|c| c.as_deref().and_then(parse_bool))
                .collect(),
        );
    }

    Column::String(cells)
}

pub(crate) fn read_csv_from<R: Read>(reader: R, delimiter: u8) -> Result<Frame> {
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .delimiter(delimiter)
        .from_reader(reader);

    let headers = reader
        .headers()?
        .iter()
        .map(|h| h.trim().to_string())
        .collect::<Vec<_>>();

    let mut cells = vec![Vec::new(); headers.len()];
    for record in reader.records() {
        let record = record?;
        for (column, cell) in cells.iter_mut().zip(record.iter()) {
            column.push(parse_cell(cell));
        }
    }

    let columns = headers
        .into_iter()
        .zip(cells)
        .map(|(name, cells)| (name, infer_column(cells)))
        .collect();

    Frame::new(columns)
}

pub(crate) fn read_csv(path: &Path, delimiter: u8) -> Result<Frame> {
    let file = File::open(path)?;
    read_csv_from(file, delimiter)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::frame::DataType;

    const LISTINGS: &str = "\
neighbourhood_cleansed,room_type,bedrooms,bathrooms,instant_bookable,price
Mission,Entire home/apt,2,1.5,true,250
Nob Hill,Private room,,1.0,false,95.5
Outer Sunset,Private room,1,NA,,80
";

    #[test]
    fn infers_column_types() {
        let frame = read_csv_from(LISTINGS.as_bytes(), b',').unwrap();

        assert_eq!(frame.num_rows(), 3);
        let types = frame
            .schema()
            .fields()
            .iter()
            .map(|f| f.data_type())
            .collect::<Vec<_>>();
        assert_eq!(
            types,
            vec![
                DataType::String,
                DataType::String,
                DataType::Double,
                DataType::Double,
                DataType::Boolean,
                DataType::Double,
            ]
        );
    }

    #[test]
    fn treats_empty_and_na_cells_as_null() {
        let frame = read_csv_from(LISTINGS.as_bytes(), b',').unwrap();

        assert_eq!(
            frame.column("bedrooms").unwrap(),
            &Column::Double(vec![Some(2.0), None, Some(1.0)])
        );
        assert!(frame.column("bathrooms").unwrap().is_null(2));
        assert!(frame.column("instant_bookable").unwrap().is_null(2));
    }

    #[test]
    fn all_null_column_is_string() {
        let frame = read_csv_from("a,b\n1,\n2,\n".as_bytes(), b',').unwrap();
        assert_eq!(
            frame.schema().field("b").unwrap().data_type(),
            DataType::String
        );
    }

    #[test]
    fn honours_delimiter() {
        let frame = read_csv_from("beds;price\n1;100\n".as_bytes(), b';').unwrap();
        assert_eq!(frame.num_columns(), 2);
        assert_eq!(frame.column("price").unwrap().numeric_value(0), Some(100.0));
    }

    #[test]
    fn ragged_records_fail() {
        let result = read_csv_from("beds,price\n1,100,7\n".as_bytes(), b',');
        assert!(matches!(result, Err(Error::Csv(_))));
    }
}
