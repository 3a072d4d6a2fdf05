pub mod deltas;
pub mod engine;
pub mod types;
pub mod validation;

pub use deltas::{parse_delta, parse_deltas};
pub use engine::{apply_deltas, compute_weights, predict_overall, usage_shares};
pub use types::*;
pub use validation::{validate_deltas, validate_inputs};
