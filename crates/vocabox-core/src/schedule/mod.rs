//! Leitner Schedule Module
//!
//! Six boxes, each with a fixed re-study delay:
//!
//! | box | delay      |
//! |-----|------------|
//! | 0   | due now    |
//! | 1   | 10 minutes |
//! | 2   | 1 day      |
//! | 3   | 3 days     |
//! | 4   | 7 days     |
//! | 5   | 21 days    |
//!
//! Ratings move a word between boxes: `again` drops it to box 0, `good`
//! promotes by one, `easy` by two.

mod interval;
mod rating;

pub use interval::{interval_for, OVERFLOW_INTERVAL_DAYS};
pub use rating::{apply_rating, Rating};
