//! `price-prediction` predicts the nightly price of short-term rental listings.
//!
//! The crate loads a listings table into a columnar [`Frame`](frame::Frame), audits and
//! imputes its missing values and trains three regression models on a seeded
//! train/test split:
//!
//! * a linear regression on the number of bedrooms,
//! * a linear regression on six numeric features,
//! * a random forest on the same six features.
//!
//! Each model is reported with its root mean squared error on the test rows.
//!
//! Stages follow the estimator/transformer split of Spark ML: an
//! [`Estimator`](traits::Estimator) is fit on a frame into a model, and every model is a
//! [`Transformer`](traits::Transformer) from frames to frames. Estimators and transformers
//! can be chained into a [`Pipeline`](pipeline::Pipeline). Parallel work runs on the
//! thread pool of an explicit [`Session`](session::Session), one task per partition of the
//! frame.
//!
//! Least squares fits are delegated to `linfa-linear`; the forest lives in the
//! `regression-forest` crate of this workspace.
//!
//! ```no_run
//! use price_prediction::config::AppConfig;
//! use price_prediction::session::Session;
//! use price_prediction::workflow::PricePrediction;
//!
//! let config = AppConfig::load(None).unwrap();
//! let session = Session::builder().master(config.master.as_str()).build().unwrap();
//! let report = PricePrediction::new(config)
//!     .run(&session, &mut std::io::stdout())
//!     .unwrap();
//! println!("{:?}", report.models);
//! ```

pub mod assembler;
pub mod audit;
pub mod config;
pub mod error;
pub mod evaluation;
pub mod frame;
pub mod imputer;
pub mod io;
pub mod pipeline;
pub mod prelude;
pub mod regression;
pub mod session;
mod split;
pub mod traits;
pub mod workflow;

pub use error::{Error, Result};
