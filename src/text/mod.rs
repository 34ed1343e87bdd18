//! Text processing: normalization and keyword extraction.
//!
//! - [`normalize`]: diacritic folding, tokenization and stop-word removal
//! - [`keywords`]: stemmed keyword sets for search and story clustering

pub mod keywords;
pub mod normalize;
