use std::fs::File;
use std::path::Path;

use arrow_array::cast::AsArray;
use arrow_array::types::{
    Float32Type, Float64Type, Int16Type, Int32Type, Int64Type, Int8Type, UInt16Type, UInt32Type,
    UInt8Type,
};
use arrow_array::{Array, ArrowPrimitiveType};
use arrow_schema::DataType as ArrowType;
use log::debug;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;

use crate::error::{Error, Result};
use crate::frame::{Column, Field, Frame, Schema};

/// Maps an Arrow type onto the column that will hold it
fn empty_column(name: &str, data_type: &ArrowType) -> Result<Column> {
    let column = match data_type {
        ArrowType::Float64 | ArrowType::Float32 => Column::Double(Vec::new()),
        ArrowType::Int8
        | ArrowType::Int16
        | ArrowType::Int32
        | ArrowType::Int64
        | ArrowType::UInt8
        | ArrowType::UInt16
        | ArrowType::UInt32 => Column::Long(Vec::new()),
        ArrowType::Utf8 | ArrowType::LargeUtf8 => Column::String(Vec::new()),
        ArrowType::Boolean => Column::Boolean(Vec::new()),
        other => {
            return Err(Error::UnsupportedType(format!(
                "{} for column `{}`",
                other, name
            )))
        }
    };
    Ok(column)
}

fn extend_long<T>(values: &mut Vec<Option<i64>>, array: &dyn Array)
where
    T: ArrowPrimitiveType,
    T::Native: Into<i64>,
{
    values.extend(array.as_primitive::<T>().iter().map(|v| v.map(Into::into)));
}

fn append(column: &mut Column, array: &dyn Array) -> Result<()> {
    match (column, array.data_type()) {
        (Column::Double(values), ArrowType::Float64) => {
            values.extend(array.as_primitive::<Float64Type>().iter())
        }
        (Column::Double(values), ArrowType::Float32) => values.extend(
            array
                .as_primitive::<Float32Type>()
                .iter()
                .map(|v| v.map(f64::from)),
        ),
        (Column::Long(values), ArrowType::Int8) => extend_long::<Int8Type>(values, array),
        (Column::Long(values), ArrowType::Int16) => extend_long::<Int16Type>(values, array),
        (Column::Long(values), ArrowType::Int32) => extend_long::<Int32Type>(values, array),
        (Column::Long(values), ArrowType::Int64) => extend_long::<Int64Type>(values, array),
        (Column::Long(values), ArrowType::UInt8) => extend_long::<UInt8Type>(values, array),
        (Column::Long(values), ArrowType::UInt16) => extend_long::<UInt16Type>(values, array),
        (Column::Long(values), ArrowType::UInt32) => extend_long::<UInt32Type>(values, array),
        (Column::String(values), ArrowType::Utf8) => values.extend(
            array
                .as_string::<i32>()
                .iter()
                .map(|v| v.map(str::to_string)),
        ),
        (Column::String(values), ArrowType::LargeUtf8) => values.extend(
            array
                .as_string::<i64>()
                .iter()
                .map(|v| v.map(str::to_string)),
        ),
        (Column::Boolean(values), ArrowType::Boolean) => {
            values.extend(array.as_boolean().iter())
        }
        (column, other) => {
            return Err(Error::UnsupportedType(format!(
                "{} in a {} column",
                other,
                column.data_type()
            )))
        }
    }
    Ok(())
}

/// Reads every record batch of a Parquet file into one frame.
pub(crate) fn read_parquet(path: &Path) -> Result<Frame> {
    let file = File::open(path)?;
    let builder = ParquetRecordBatchReaderBuilder::try_new(file)?;

    let arrow_schema = builder.schema().clone();
    let mut fields = Vec::with_capacity(arrow_schema.fields().len());
    let mut columns = Vec::with_capacity(arrow_schema.fields().len());
    for field in arrow_schema.fields() {
        let column = empty_column(field.name(), field.data_type())?;
        fields.push(Field::new(
            field.name().clone(),
            column.data_type(),
            field.is_nullable(),
        ));
        columns.push(column);
    }

    let reader = builder.build()?;
    let mut num_batches = 0;
    for batch in reader {
        let batch = batch?;
        for (column, array) in columns.iter_mut().zip(batch.columns()) {
            append(column, array.as_ref())?;
        }
        num_batches += 1;
    }
    debug!("read {} record batches from {}", num_batches, path.display());

    Frame::from_parts(Schema::new(fields)?, columns)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use arrow_array::{ArrayRef, BooleanArray, Float64Array, Int32Array, RecordBatch, StringArray};
    use arrow_schema::{Field as ArrowField, Schema as ArrowSchema};
    use parquet::arrow::ArrowWriter;

    use crate::frame::DataType;

    fn write_listings(path: &Path) {
        let schema = Arc::new(ArrowSchema::new(vec![
            ArrowField::new("neighbourhood_cleansed", ArrowType::Utf8, true),
            ArrowField::new("bedrooms", ArrowType::Float64, true),
            ArrowField::new("number_of_reviews", ArrowType::Int32, true),
            ArrowField::new("instant_bookable", ArrowType::Boolean, true),
        ]));
        let columns: Vec<ArrayRef> = vec![
            Arc::new(StringArray::from(vec![Some("Mission"), None, Some("Nob Hill")])),
            Arc::new(Float64Array::from(vec![Some(1.0), Some(2.0), None])),
            Arc::new(Int32Array::from(vec![Some(12), None, Some(0)])),
            Arc::new(BooleanArray::from(vec![Some(true), Some(false), None])),
        ];
        let batch = RecordBatch::try_new(schema.clone(), columns).unwrap();

        let file = File::create(path).unwrap();
        let mut writer = ArrowWriter::try_new(file, schema, None).unwrap();
        writer.write(&batch).unwrap();
        writer.close().unwrap();
    }

    #[test]
    fn reads_nullable_columns() {
        let path = std::env::temp_dir().join(format!(
            "price-prediction-listings-{}.parquet",
            std::process::id()
        ));
        write_listings(&path);

        let frame = read_parquet(&path).unwrap();
        std::fs::remove_file(&path).unwrap();

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
                DataType::Double,
                DataType::Long,
                DataType::Boolean
            ]
        );
        assert_eq!(
            frame.column("bedrooms").unwrap(),
            &Column::Double(vec![Some(1.0), Some(2.0), None])
        );
        assert_eq!(
            frame.column("number_of_reviews").unwrap(),
            &Column::Long(vec![Some(12), None, Some(0)])
        );
        assert!(frame.column("neighbourhood_cleansed").unwrap().is_null(1));
    }

    #[test]
    fn missing_file_is_io_error() {
        let result = read_parquet(Path::new("data/does-not-exist.parquet"));
        assert!(matches!(result, Err(Error::Io(_))));
    }
}
