pub mod encoder;
pub mod error;
pub mod types;

pub use encoder::{encode, FeatureVector, FEATURE_COUNT};
pub use error::*;
pub use types::*;
