//! The price prediction run
//!
//! Loads the listings, audits and imputes missing values, splits the rows and then
//! fits and evaluates three regression pipelines of increasing capacity. The console
//! output goes to any [`Write`]r, the numbers come back as a [`Report`].
use std::io::Write;

use log::{debug, info, warn};

use crate::assembler::VectorAssembler;
use crate::audit::{null_counts, NullCounts};
use crate::config::AppConfig;
use crate::error::Result;
use crate::evaluation::RegressionEvaluator;
use crate::frame::{DataType, Frame};
use crate::imputer::Imputer;
use crate::pipeline::Pipeline;
use crate::regression::{LinearRegression, RandomForestRegressor};
use crate::session::Session;
use crate::traits::{Estimator, Transformer};

/// Outcome of one fitted model
#[derive(Debug, Clone, PartialEq)]
pub struct ModelReport {
    pub name: String,
    pub features: Vec<String>,
    /// Fitted line, for linear models only
    pub formula: Option<String>,
    pub rmse: f64,
}

/// Numbers behind the console output of a run
#[derive(Debug, Clone, PartialEq)]
pub struct Report {
    pub total_rows: usize,
    pub train_rows: usize,
    pub test_rows: usize,
    pub null_counts: NullCounts,
    /// Imputed columns and their surrogates
    pub surrogates: Vec<(String, f64)>,
    pub models: Vec<ModelReport>,
}

impl Report {
    pub fn model(&self, name: &str) -> Option<&ModelReport> {
        self.models.iter().find(|model| model.name == name)
    }
}

pub const SINGLE_LINEAR: &str = "linear regression";
pub const MULTI_LINEAR: &str = "linear regression with multiple independent variables";
pub const RANDOM_FOREST: &str = "Random Forest";

pub struct PricePrediction {
    config: AppConfig,
}

impl PricePrediction {
    pub fn new(config: AppConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Reads the configured input and runs on it.
    pub fn run<W: Write>(&self, session: &Session, out: &mut W) -> Result<Report> {
        let frame = session
            .read()
            .delimiter(self.config.delimiter_byte())
            .load(&self.config.input)?;
        self.run_frame(session, &frame, out)
    }

    /// Runs on an already loaded frame.
    pub fn run_frame<W: Write>(
        &self,
        session: &Session,
        frame: &Frame,
        out: &mut W,
    ) -> Result<Report> {
        let config = &self.config;

        write!(out, "{}", frame.schema())?;
        write!(
            out,
            "{}",
            frame
                .select(&config.preview_cols)?
                .show_string(config.preview_rows, config.truncate)
        )?;

        let frame = frame.repartition(config.partitions)?;
        debug!("repartitioned into {} partitions", frame.num_partitions());

        let nulls = null_counts(session, &frame);
        writeln!(out, "missing values")?;
        writeln!(out, "{}", nulls)?;

        let (imputed, surrogates) = self.impute(session, &frame)?;

        let ratio = config.train_ratio;
        let splits = imputed.random_split(&[ratio, 1.0 - ratio], config.seed)?;
        let (train, test) = (&splits[0], &splits[1]);
        writeln!(
            out,
            "There are {} rows in the training set, and {} in the test set",
            train.num_rows(),
            test.num_rows()
        )?;

        let models = vec![
            self.linear(session, train, test, &config.single_features, SINGLE_LINEAR, out)?,
            self.linear(session, train, test, &config.multi_features, MULTI_LINEAR, out)?,
            self.forest(session, train, test, out)?,
        ];

        Ok(Report {
            total_rows: frame.num_rows(),
            train_rows: train.num_rows(),
            test_rows: test.num_rows(),
            null_counts: nulls,
            surrogates,
            models,
        })
    }

    /// Imputes every double column except the label.
    fn impute(&self, session: &Session, frame: &Frame) -> Result<(Frame, Vec<(String, f64)>)> {
        let schema = frame.schema();
        debug!("categorical columns: {:?}", schema.names_of_type(DataType::String));
        let numeric = schema
            .names_of_type(DataType::Double)
            .into_iter()
            .filter(|name| *name != self.config.label_col)
            .collect::<Vec<_>>();
        if numeric.is_empty() {
            warn!("no numeric columns to impute");
            return Ok((frame.clone(), Vec::new()));
        }

        let model = Imputer::new(numeric)
            .strategy(self.config.imputer_strategy)
            .fit(session, frame)?;
        let surrogates = model.surrogates();
        Ok((model.transform(session, frame)?, surrogates))
    }

    fn linear<W: Write>(
        &self,
        session: &Session,
        train: &Frame,
        test: &Frame,
        features: &[String],
        name: &str,
        out: &mut W,
    ) -> Result<ModelReport> {
        let label = &self.config.label_col;
        let assembler = VectorAssembler::new(features.iter().cloned());
        let vec_train = assembler.transform(session, train)?;
        self.show(&vec_train, features, false, out)?;

        let lr = LinearRegression::new().label_col(label.as_str());
        let model = lr.fit(session, &vec_train)?;
        let formula = model.formula(label, features);
        writeln!(out, "The formula for the linear regression line is {}", formula)?;

        let pipeline = Pipeline::new().transformer(assembler).estimator(lr);
        let rmse = self.evaluate(session, pipeline, train, test, features, out)?;
        writeln!(out, "RMSE for {} is {:.1}", name, rmse)?;
        info!("{}: rmse {}", name, rmse);

        Ok(ModelReport {
            name: name.to_string(),
            features: features.to_vec(),
            formula: Some(formula),
            rmse,
        })
    }

    fn forest<W: Write>(
        &self,
        session: &Session,
        train: &Frame,
        test: &Frame,
        out: &mut W,
    ) -> Result<ModelReport> {
        let features = &self.config.multi_features;
        let forest = &self.config.forest;
        let rf = RandomForestRegressor::new()
            .label_col(self.config.label_col.as_str())
            .num_trees(forest.num_trees)
            .max_depth(forest.max_depth)
            .max_bins(forest.max_bins)
            .seed(forest.seed);

        let pipeline = Pipeline::new()
            .transformer(VectorAssembler::new(features.iter().cloned()))
            .estimator(rf);
        let rmse = self.evaluate(session, pipeline, train, test, features, out)?;
        writeln!(out, "RMSE for {} is {:.1}", RANDOM_FOREST, rmse)?;
        info!("{}: rmse {}", RANDOM_FOREST, rmse);

        Ok(ModelReport {
            name: RANDOM_FOREST.to_string(),
            features: features.clone(),
            formula: None,
            rmse,
        })
    }

    /// Fits `pipeline` on `train`, previews its predictions on `test` and returns their RMSE.
    fn evaluate<W: Write>(
        &self,
        session: &Session,
        pipeline: Pipeline,
        train: &Frame,
        test: &Frame,
        features: &[String],
        out: &mut W,
    ) -> Result<f64> {
        let predictions = pipeline.fit(session, train)?.transform(session, test)?;
        self.show(&predictions, features, true, out)?;

        RegressionEvaluator::new()
            .label_col(self.config.label_col.as_str())
            .evaluate(session, &predictions)
    }

    fn show<W: Write>(
        &self,
        frame: &Frame,
        features: &[String],
        prediction: bool,
        out: &mut W,
    ) -> Result<()> {
        let mut columns = features.to_vec();
        columns.push("features".to_string());
        columns.push(self.config.label_col.clone());
        if prediction {
            columns.push("prediction".to_string());
        }
        let shown = frame
            .select(&columns)?
            .show_string(self.config.show_rows, self.config.truncate);
        write!(out, "{}", shown)?;
        Ok(())
    }
}
