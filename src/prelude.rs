//! Price prediction prelude.
//!
//! This module contains the most used types, type aliases, traits and
//! functions that you can import easily as a group.
//!

#[doc(no_inline)]
pub use crate::error::{Error, Result};

#[doc(no_inline)]
pub use crate::traits::*;

#[doc(no_inline)]
pub use crate::session::Session;

#[doc(no_inline)]
pub use crate::frame::{Column, DataType, Frame};

#[doc(no_inline)]
pub use crate::audit::{null_counts, NullCounts};

#[doc(no_inline)]
pub use crate::assembler::{HandleInvalid, VectorAssembler};

#[doc(no_inline)]
pub use crate::imputer::{Imputer, ImputerModel, ImputerStrategy};

#[doc(no_inline)]
pub use crate::regression::{
    FeatureSubsetStrategy, LinearRegression, LinearRegressionModel, RandomForestRegressionModel,
    RandomForestRegressor,
};

#[doc(no_inline)]
pub use crate::evaluation::{RegressionEvaluator, RegressionMetric};

#[doc(no_inline)]
pub use crate::pipeline::{Pipeline, PipelineModel};
