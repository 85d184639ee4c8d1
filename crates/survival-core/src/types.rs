use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{CoreError, CoreResult};

pub const MIN_AGE: f64 = 0.0;
pub const MAX_AGE: f64 = 100.0;
/// Upper bound for both sibling/spouse and parent/child counts.
pub const MAX_RELATIVES: u8 = 10;

/// Label the remote model emits for a positive outcome.
pub const SURVIVED_LABEL: &str = "SURVIVED";

// ---------------------------------------------------------------------------
// Passenger attributes
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "lowercase")]
pub enum Sex {
    Male,
    Female,
}

impl Sex {
    pub fn as_str(&self) -> &'static str {
        match self {
            Sex::Male => "male",
            Sex::Female => "female",
        }
    }
}

impl FromStr for Sex {
    type Err = CoreError;

    fn from_str(s: &str) -> CoreResult<Self> {
        match s {
            "male" => Ok(Sex::Male),
            "female" => Ok(Sex::Female),
            other => Err(CoreError::validation(
                "sex",
                format!("expected \"male\" or \"female\", got {other:?}"),
            )),
        }
    }
}

impl fmt::Display for Sex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Ticket class, ordinal with 1 as the highest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub enum PassengerClass {
    #[serde(rename = "1")]
    First,
    #[serde(rename = "2")]
    Second,
    #[serde(rename = "3")]
    Third,
}

impl PassengerClass {
    pub fn ordinal(&self) -> u8 {
        match self {
            PassengerClass::First => 1,
            PassengerClass::Second => 2,
            PassengerClass::Third => 3,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            PassengerClass::First => "1",
            PassengerClass::Second => "2",
            PassengerClass::Third => "3",
        }
    }
}

impl FromStr for PassengerClass {
    type Err = CoreError;

    fn from_str(s: &str) -> CoreResult<Self> {
        match s {
            "1" => Ok(PassengerClass::First),
            "2" => Ok(PassengerClass::Second),
            "3" => Ok(PassengerClass::Third),
            other => Err(CoreError::validation(
                "passengerClass",
                format!("expected \"1\", \"2\" or \"3\", got {other:?}"),
            )),
        }
    }
}

impl fmt::Display for PassengerClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Raw prediction request as submitted by the form.
///
/// Nothing here is trusted; convert with `PassengerAttributes::try_from`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct PredictRequest {
    pub age: f64,
    pub sex: String,
    pub passenger_class: String,
    pub siblings: f64,
    pub parents: f64,
}

/// Validated passenger attributes. Immutable once constructed.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PassengerAttributes {
    age: f64,
    sex: Sex,
    passenger_class: PassengerClass,
    siblings: u8,
    parents: u8,
}

impl PassengerAttributes {
    pub fn new(
        age: f64,
        sex: Sex,
        passenger_class: PassengerClass,
        siblings: u8,
        parents: u8,
    ) -> CoreResult<Self> {
        if !age.is_finite() || !(MIN_AGE..=MAX_AGE).contains(&age) {
            return Err(CoreError::validation("age", "must be between 0 and 100"));
        }
        check_relatives("siblings", siblings)?;
        check_relatives("parents", parents)?;

        Ok(Self {
            // -0.0 would otherwise leak into the payload as "-0"
            age: age + 0.0,
            sex,
            passenger_class,
            siblings,
            parents,
        })
    }

    pub fn age(&self) -> f64 {
        self.age
    }

    pub fn sex(&self) -> Sex {
        self.sex
    }

    pub fn passenger_class(&self) -> PassengerClass {
        self.passenger_class
    }

    pub fn siblings(&self) -> u8 {
        self.siblings
    }

    pub fn parents(&self) -> u8 {
        self.parents
    }
}

impl Default for PassengerAttributes {
    /// The form's initial values.
    fn default() -> Self {
        Self {
            age: 30.0,
            sex: Sex::Male,
            passenger_class: PassengerClass::Second,
            siblings: 0,
            parents: 0,
        }
    }
}

impl TryFrom<PredictRequest> for PassengerAttributes {
    type Error = CoreError;

    fn try_from(req: PredictRequest) -> CoreResult<Self> {
        let sex = req.sex.parse()?;
        let passenger_class = req.passenger_class.parse()?;
        let siblings = whole_count("siblings", req.siblings)?;
        let parents = whole_count("parents", req.parents)?;
        Self::new(req.age, sex, passenger_class, siblings, parents)
    }
}

impl From<&PassengerAttributes> for PredictRequest {
    fn from(attrs: &PassengerAttributes) -> Self {
        Self {
            age: attrs.age,
            sex: attrs.sex.as_str().to_string(),
            passenger_class: attrs.passenger_class.as_str().to_string(),
            siblings: f64::from(attrs.siblings),
            parents: f64::from(attrs.parents),
        }
    }
}

fn check_relatives(field: &'static str, count: u8) -> CoreResult<()> {
    if count > MAX_RELATIVES {
        return Err(CoreError::validation(
            field,
            format!("must be between 0 and {MAX_RELATIVES}"),
        ));
    }
    Ok(())
}

fn whole_count(field: &'static str, value: f64) -> CoreResult<u8> {
    if !value.is_finite() || value.fract() != 0.0 {
        return Err(CoreError::validation(field, "must be a whole number"));
    }
    if !(0.0..=f64::from(MAX_RELATIVES)).contains(&value) {
        return Err(CoreError::validation(
            field,
            format!("must be between 0 and {MAX_RELATIVES}"),
        ));
    }
    Ok(value as u8)
}

// ---------------------------------------------------------------------------
// Prediction result
// ---------------------------------------------------------------------------

/// Prediction text shown to the user.
///
/// Only `Survived` and `DidNotSurvive` come from the model; the rest are
/// sentinels for outcomes where no model answer is available.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub enum Verdict {
    #[serde(rename = "Survived")]
    Survived,
    #[serde(rename = "Did Not Survive")]
    DidNotSurvive,
    #[serde(rename = "Unable to determine")]
    UnableToDetermine,
    #[serde(rename = "Unable to make prediction")]
    UnableToMakePrediction,
    #[serde(rename = "Prediction failed")]
    PredictionFailed,
}

impl Verdict {
    /// Exact, case-sensitive mapping of a model label.
    pub fn from_label(label: &str) -> Self {
        if label == SURVIVED_LABEL {
            Verdict::Survived
        } else {
            Verdict::DidNotSurvive
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Verdict::Survived => "Survived",
            Verdict::DidNotSurvive => "Did Not Survive",
            Verdict::UnableToDetermine => "Unable to determine",
            Verdict::UnableToMakePrediction => "Unable to make prediction",
            Verdict::PredictionFailed => "Prediction failed",
        }
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct PredictionResult {
    pub prediction: Verdict,
    /// Confidence in [0, 1]; only meaningful for model verdicts.
    pub probability: f64,
}

impl PredictionResult {
    pub const UNDETERMINED_CONFIDENCE: f64 = 0.5;

    /// Builds a result from a model label and score.
    ///
    /// The upstream score is not passed through as-is: values outside [0, 1]
    /// are clamped to the nearest bound and non-finite values become 0.
    pub fn from_label(label: &str, score: f64) -> Self {
        let probability = if score.is_finite() {
            score.clamp(0.0, 1.0)
        } else {
            0.0
        };
        Self {
            prediction: Verdict::from_label(label),
            probability,
        }
    }

    pub fn undetermined() -> Self {
        Self {
            prediction: Verdict::UnableToDetermine,
            probability: Self::UNDETERMINED_CONFIDENCE,
        }
    }

    pub fn unable_to_make_prediction() -> Self {
        Self {
            prediction: Verdict::UnableToMakePrediction,
            probability: 0.0,
        }
    }

    pub fn failed() -> Self {
        Self {
            prediction: Verdict::PredictionFailed,
            probability: 0.0,
        }
    }

    /// Confidence as a whole percentage, rounded half away from zero.
    pub fn display_confidence(&self) -> u32 {
        (self.probability.clamp(0.0, 1.0) * 100.0).round() as u32
    }
}

/// Failure body returned by the gateway alongside a non-success status.
///
/// Kept apart from `PredictionResult` so a failed call can never be read as
/// a prediction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct ErrorBody {
    pub error: String,
    pub details: String,
}
