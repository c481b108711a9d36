//! Table extraction from ratings-page snapshots.
//!
//! A [`RatingDocument`] checks the marker attribute and hands out the three
//! tables; each extractor turns one table into flat rows through the shared
//! [`grid::Grid`] walker.

pub mod coerce;
pub mod demographic;
pub mod document;
pub mod grid;
pub mod histogram;
pub mod region;

pub use demographic::extract_demographic;
pub use document::RatingDocument;
pub use histogram::extract_histogram;
pub use region::extract_region;
