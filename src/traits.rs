//! Pipeline stage traits
//!
//! A [`Transformer`] maps a frame to a new frame. An [`Estimator`] is fit on a frame
//! and yields a fitted model, which is itself a transformer.
use crate::error::Result;
use crate::frame::Frame;
use crate::session::Session;

pub trait Transformer: Send + Sync {
    fn transform(&self, session: &Session, frame: &Frame) -> Result<Frame>;
}

pub trait Estimator: Send + Sync {
    type Model: Transformer + 'static;

    fn fit(&self, session: &Session, frame: &Frame) -> Result<Self::Model>;
}
