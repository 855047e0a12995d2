//! Utility functions for randomly generating listings

use ndarray::Array1;
use ndarray_rand::{
    rand::{seq::SliceRandom, Rng},
    rand_distr::StandardNormal,
    RandomExt,
};
use price_prediction::frame::{Column, Frame};

/// Standard deviation of the price noise
pub const PRICE_NOISE: f64 = 25.0;

const NEIGHBOURHOODS: [&str; 6] = [
    "Mission",
    "Western Addition",
    "South of Market",
    "Downtown/Civic Center",
    "Outer Sunset",
    "Noe Valley",
];

/// Room types with their price offset
const ROOM_TYPES: [(&str, f64); 3] = [
    ("Entire home/apt", 60.0),
    ("Private room", 0.0),
    ("Shared room", -30.0),
];

/// Generates `n` listings whose numeric feature cells are null with probability
/// `missing_rate`.
///
/// The price is
///
/// `50 + 30 accommodates + 25 bedrooms + 20 bathrooms + 5 beds - 0.5 minimum_nights
///  + 0.8 (review_scores_rating - 80) + room type offset + noise`
///
/// computed from the values before they are nulled, with noise drawn from
/// `N(0, PRICE_NOISE²)` and the result clamped at 10. `price` itself is never null.
///
/// Panics unless `missing_rate` is in `[0, 1]`.
pub fn listings(n: usize, missing_rate: f64, rng: &mut impl Rng) -> Frame {
    let noise = Array1::<f64>::random_using(n, StandardNormal, rng) * PRICE_NOISE;

    let mut neighbourhood = Vec::with_capacity(n);
    let mut room_type = Vec::with_capacity(n);
    let mut accommodates = Vec::with_capacity(n);
    let mut bathrooms = Vec::with_capacity(n);
    let mut bedrooms = Vec::with_capacity(n);
    let mut beds = Vec::with_capacity(n);
    let mut minimum_nights = Vec::with_capacity(n);
    let mut number_of_reviews = Vec::with_capacity(n);
    let mut rating = Vec::with_capacity(n);
    let mut instant_bookable = Vec::with_capacity(n);
    let mut price = Vec::with_capacity(n);

    for eps in noise.iter() {
        let (room, offset) = *ROOM_TYPES.choose(rng).unwrap_or(&ROOM_TYPES[0]);
        let guests = rng.gen_range(1..=8) as f64;
        let rooms = (guests / 2.0).floor().min(4.0);
        let baths = 1.0 + 0.5 * rng.gen_range(0..=3) as f64;
        let bed_count = (rooms + rng.gen_range(0..=2) as f64).max(1.0);
        let nights = rng.gen_range(1..=30) as f64;
        let score = rng.gen_range(60..=100) as f64;

        let value = 50.0 + 30.0 * guests + 25.0 * rooms + 20.0 * baths + 5.0 * bed_count
            - 0.5 * nights
            + 0.8 * (score - 80.0)
            + offset
            + eps;

        neighbourhood.push(NEIGHBOURHOODS.choose(rng).map(|s| s.to_string()));
        room_type.push(Some(room.to_string()));
        accommodates.push(Some(guests));
        bathrooms.push(present(baths, missing_rate, rng));
        bedrooms.push(present(rooms, missing_rate, rng));
        beds.push(present(bed_count, missing_rate, rng));
        minimum_nights.push(Some(nights));
        number_of_reviews.push(Some(rng.gen_range(0..500i64)));
        rating.push(present(score, missing_rate, rng));
        instant_bookable.push(Some(rng.gen_bool(0.5)));
        price.push(Some(value.max(10.0)));
    }

    let columns = vec![
        ("neighbourhood_cleansed", Column::String(neighbourhood)),
        ("room_type", Column::String(room_type)),
        ("accommodates", Column::Double(accommodates)),
        ("bathrooms", Column::Double(bathrooms)),
        ("bedrooms", Column::Double(bedrooms)),
        ("beds", Column::Double(beds)),
        ("minimum_nights", Column::Double(minimum_nights)),
        ("number_of_reviews", Column::Long(number_of_reviews)),
        ("review_scores_rating", Column::Double(rating)),
        ("instant_bookable", Column::Boolean(instant_bookable)),
        ("price", Column::Double(price)),
    ];
    Frame::new(columns).expect("generated columns are unique and equally long")
}

fn present(value: f64, missing_rate: f64, rng: &mut impl Rng) -> Option<f64> {
    if rng.gen_bool(missing_rate) {
        None
    } else {
        Some(value)
    }
}
