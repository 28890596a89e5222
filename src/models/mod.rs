//! Linear model: weight table and scorer

pub mod scorer;
pub mod weights;

pub use scorer::{ScoreError, Scorer};
pub use weights::{ModelWeights, ResolvedWeights};
