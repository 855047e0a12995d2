//! Random splits of a frame
use rand::{rngs::StdRng, Rng, SeedableRng};

use crate::error::{Error, Result};
use crate::frame::Frame;

/// Normalises `weights` into the upper bounds of consecutive sub-intervals of `[0, 1)`.
fn cumulative_bounds(weights: &[f64]) -> Result<Vec<f64>> {
    if weights.is_empty() {
        return Err(Error::InvalidParameter(
            "random split needs at least one weight".to_string(),
        ));
    }
    if let Some(w) = weights.iter().find(|w| !w.is_finite() || **w < 0.0) {
        return Err(Error::InvalidParameter(format!(
            "split weights must be finite and non-negative, got {}",
            w
        )));
    }
    let total = weights.iter().sum::<f64>();
    if total <= 0.0 {
        return Err(Error::InvalidParameter(
            "split weights must have a positive sum".to_string(),
        ));
    }

    let mut acc = 0.0;
    let mut bounds = weights
        .iter()
        .map(|w| {
            acc += w / total;
            acc
        })
        .collect::<Vec<_>>();
    if let Some(last) = bounds.last_mut() {
        *last = 1.0;
    }
    Ok(bounds)
}

impl Frame {
    /// Randomly splits the rows into one frame per weight.
    ///
    /// Every row draws `u` uniformly from `[0, 1)`, in row order, from a single RNG seeded
    /// with `seed`. It goes to the first split whose cumulative normalised weight exceeds
    /// `u`. The result only depends on the rows and the seed, not on the partitioning, and
    /// each split keeps the partition count of `self`.
    ///
    /// ```
    /// use price_prediction::frame::{Column, Frame};
    ///
    /// let prices = Column::Double((0..100).map(|i| Some(i as f64)).collect());
    /// let frame = Frame::new(vec![("price", prices)]).unwrap();
    /// let splits = frame.random_split(&[0.8, 0.2], 42).unwrap();
    /// assert_eq!(splits[0].num_rows() + splits[1].num_rows(), 100);
    /// ```
    pub fn random_split(&self, weights: &[f64], seed: u64) -> Result<Vec<Frame>> {
        let bounds = cumulative_bounds(weights)?;
        let mut rng = StdRng::seed_from_u64(seed);

        let mut indices = vec![Vec::new(); bounds.len()];
        for row in 0..self.num_rows() {
            let u = rng.gen::<f64>();
            let split = bounds.iter().position(|&ub| u < ub).unwrap_or(bounds.len() - 1);
            indices[split].push(row);
        }

        Ok(indices.iter().map(|rows| self.take(rows)).collect())
    }
}
