//! Feature encoding for the remote survival classifier.
//!
//! The model expects exactly five numbers in a fixed order, sent as one
//! space-separated string:
//!
//! | index | field           | transform          |
//! |-------|-----------------|--------------------|
//! | 0     | age             | `age / 100`        |
//! | 1     | sex             | `1` male, `0` else |
//! | 2     | passenger class | ordinal `1..=3`    |
//! | 3     | siblings        | `siblings / 10`    |
//! | 4     | parents         | `parents / 10`     |
//!
//! No imputation, one-hot expansion or further scaling happens here; the
//! remote model was trained on exactly this shape.

use std::fmt;

use crate::types::{PassengerAttributes, Sex};

pub const FEATURE_COUNT: usize = 5;

const AGE_SCALE: f64 = 100.0;
const RELATIVES_SCALE: f64 = 10.0;

/// Ordered feature vector sent to the remote model.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FeatureVector([f64; FEATURE_COUNT]);

impl FeatureVector {
    pub fn values(&self) -> &[f64; FEATURE_COUNT] {
        &self.0
    }

    /// Wire payload: values joined by a single space, in shortest
    /// round-trip form (`1` rather than `1.0`, never rounded).
    pub fn to_payload(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for FeatureVector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, value) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            write!(f, "{value}")?;
        }
        Ok(())
    }
}

/// Encodes validated attributes into the model's feature vector.
pub fn encode(attrs: &PassengerAttributes) -> FeatureVector {
    let sex = match attrs.sex() {
        Sex::Male => 1.0,
        Sex::Female => 0.0,
    };

    FeatureVector([
        attrs.age() / AGE_SCALE,
        sex,
        f64::from(attrs.passenger_class().ordinal()),
        f64::from(attrs.siblings()) / RELATIVES_SCALE,
        f64::from(attrs.parents()) / RELATIVES_SCALE,
    ])
}
