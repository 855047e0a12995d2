//! Error types in price-prediction
//!

use thiserror::Error;

use ndarray::ShapeError;

use crate::frame::DataType;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("parquet error: {0}")]
    Parquet(#[from] parquet::errors::ParquetError),
    #[error("arrow error: {0}")]
    Arrow(#[from] arrow_schema::ArrowError),
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),
    #[error("invalid configuration: {0}")]
    Config(String),
    #[error("column `{0}` does not exist")]
    ColumnNotFound(String),
    #[error("column `{0}` is defined more than once")]
    DuplicateColumn(String),
    #[error("column `{name}` has type {actual}, expected {expected}")]
    InvalidColumnType {
        name: String,
        expected: String,
        actual: DataType,
    },
    #[error("invalid value: {0}")]
    InvalidValue(String),
    #[error("invalid parameter {0}")]
    InvalidParameter(String),
    #[error("surrogate cannot be computed: all values in `{0}` are null, NaN or the missing value")]
    EmptyColumn(String),
    #[error("dataset is empty")]
    EmptyDataset,
    #[error("expected {expected} features, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },
    #[error("unsupported data type {0}")]
    UnsupportedType(String),
    #[error("invalid ndarray shape {0}")]
    NdShape(#[from] ShapeError),
    #[error(transparent)]
    Linear(#[from] linfa_linear::LinearError<f64>),
    #[error(transparent)]
    Linfa(#[from] linfa::error::Error),
    #[error("failed to build thread pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
}

impl From<figment::Error> for Error {
    fn from(err: figment::Error) -> Self {
        Error::Config(err.to_string())
    }
}
