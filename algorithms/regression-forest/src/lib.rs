//!
//! # Random forest regression
//! `regression-forest` provides a pure Rust random forest for regression targets,
//! following the [linfa](https://github.com/rust-ml/linfa) `Fit` / `Predict` conventions.
//!
//! # The big picture
//!
//! A random forest averages many regression trees. Each tree is grown on a bootstrap
//! sample of the training records and only looks at a random subset of the features when
//! it chooses the split of a node, which decorrelates the trees.
//!
//! # Current state
//!
//! The trees are CART trees that minimise the squared error of their leaves. Split
//! candidates come from at most `max_bins - 1` quantile thresholds per feature, computed
//! once over the training records. Trees are grown in parallel with `rayon`, and tree `i`
//! draws from an RNG seeded with `seed + i`, so a fixed seed reproduces the forest.
//!
//! ```rust
//! use linfa::prelude::*;
//! use ndarray::{array, Array1, Array2};
//! use regression_forest::RegressionForest;
//!
//! let x = Array2::from_shape_fn((50, 1), |(i, _)| i as f64);
//! let y = Array1::from_shape_fn(50, |i| if i < 25 { 1. } else { 2. });
//! let dataset = Dataset::new(x, y);
//!
//! let forest = RegressionForest::params().seed(1).fit(&dataset).unwrap();
//! let prediction = forest.predict(&array![[3.], [40.]]);
//! assert!(prediction[0] < prediction[1]);
//! ```

mod algorithm;
mod hyperparams;
mod tree;

pub use algorithm::*;
pub use hyperparams::*;

pub use linfa::error::Result;
