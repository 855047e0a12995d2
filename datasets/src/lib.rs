//! `price-prediction-datasets` provides synthetic listings ready to be used in tests.
//!
//! The listings carry the columns of the cleaned San Francisco listings dataset that the
//! workflow touches, with a price that depends linearly on the numeric features plus
//! Gaussian noise. Some numeric cells are left null, the way scraped listings are.
//!
//! ```
//! use rand::{rngs::StdRng, SeedableRng};
//!
//! let mut rng = StdRng::seed_from_u64(42);
//! let listings = price_prediction_datasets::listings(100, 0.1, &mut rng);
//! assert_eq!(listings.num_rows(), 100);
//! ```

pub mod generate;

pub use generate::{listings, PRICE_NOISE};
