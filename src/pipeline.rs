//! Chains of transformers and estimators
//!
//! A [`Pipeline`] is itself an estimator: fitting it fits every estimator stage on the
//! output of the stages before it and returns a [`PipelineModel`] of transformers only.
use std::sync::Arc;

use log::debug;

use crate::error::Result;
use crate::frame::Frame;
use crate::session::Session;
use crate::traits::{Estimator, Transformer};

/// Type-erased estimator stage
trait FitStage: Send + Sync {
    fn fit_stage(&self, session: &Session, frame: &Frame) -> Result<Arc<dyn Transformer>>;
}

impl<E: Estimator> FitStage for E {
    fn fit_stage(&self, session: &Session, frame: &Frame) -> Result<Arc<dyn Transformer>> {
        Ok(Arc::new(self.fit(session, frame)?))
    }
}

enum Stage {
    Transformer(Arc<dyn Transformer>),
    Estimator(Box<dyn FitStage>),
}

/// Ordered stages, fit together
///
/// ```
/// use price_prediction::prelude::*;
/// use price_prediction::frame::{Column, Frame};
///
/// let session = Session::builder().master("local[1]").build().unwrap();
/// let frame = Frame::new(vec![
///     ("bedrooms", Column::Double(vec![Some(1.0), Some(2.0), Some(3.0)])),
///     ("price", Column::Double(vec![Some(150.0), Some(250.0), Some(350.0)])),
/// ])
/// .unwrap();
///
/// let model = Pipeline::new()
///     .transformer(VectorAssembler::new(["bedrooms"]))
///     .estimator(LinearRegression::new().label_col("price"))
///     .fit(&session, &frame)
///     .unwrap();
/// let predictions = model.transform(&session, &frame).unwrap();
/// assert_eq!(predictions.num_columns(), 4);
/// ```
#[derive(Default)]
pub struct Pipeline {
    stages: Vec<Stage>,
}

impl Pipeline {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn transformer<T: Transformer + 'static>(mut self, transformer: T) -> Self {
        self.stages.push(Stage::Transformer(Arc::new(transformer)));
        self
    }

    pub fn estimator<E: Estimator + 'static>(mut self, estimator: E) -> Self {
        self.stages.push(Stage::Estimator(Box::new(estimator)));
        self
    }

    pub fn num_stages(&self) -> usize {
        self.stages.len()
    }
}

impl Estimator for Pipeline {
    type Model = PipelineModel;

    /// Fits the estimator stages in order.
    ///
    /// The frame is only transformed while later stages still need it, so the last
    /// stage never transforms the training data.
    fn fit(&self, session: &Session, frame: &Frame) -> Result<PipelineModel> {
        let last = self.stages.len().saturating_sub(1);
        let mut current = frame.clone();
        let mut fitted = Vec::with_capacity(self.stages.len());

        for (idx, stage) in self.stages.iter().enumerate() {
            let transformer = match stage {
                Stage::Transformer(transformer) => Arc::clone(transformer),
                Stage::Estimator(estimator) => {
                    debug!("fitting pipeline stage {}", idx);
                    estimator.fit_stage(session, &current)?
                }
            };
            if idx < last {
                current = transformer.transform(session, &current)?;
            }
            fitted.push(transformer);
        }

        Ok(PipelineModel { stages: fitted })
    }
}

/// Pipeline whose estimators have been fit
#[derive(Clone)]
pub struct PipelineModel {
    stages: Vec<Arc<dyn Transformer>>,
}

impl PipelineModel {
    pub fn stages(&self) -> &[Arc<dyn Transformer>] {
        &self.stages
    }
}

impl Transformer for PipelineModel {
    fn transform(&self, session: &Session, frame: &Frame) -> Result<Frame> {
        self.stages
            .iter()
            .try_fold(frame.clone(), |current, stage| stage.transform(session, &current))
    }
}
