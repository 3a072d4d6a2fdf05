//! Usage-aware CSAT driver weights with what-if prediction.
//!
//! [`model`] holds the pure weighting and prediction engine; [`config`] loads
//! scenarios from YAML and [`output`] renders engine results for a terminal.

pub mod config;
pub mod model;
pub mod output;
