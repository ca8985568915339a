use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Model types whose templates only implement [`Mode::Run`].
const RUN_ONLY_MODELS: [&str; 5] = [
    "minimodel",
    "modelset",
    "transitionmodel",
    "transitionmodel2",
    "networks",
];

/// An operation a generated model can perform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    /// Fit the model's coefficients to observed data.
    Estimate,
    /// Apply estimated coefficients to predict outcomes.
    Simulate,
    /// Execute a model that has no estimation step.
    Run,
}

impl Mode {
    /// Returns the lowercase name used in templates and entry points.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Mode::Estimate => "estimate",
            Mode::Simulate => "simulate",
            Mode::Run => "run",
        }
    }

    /// Returns `true` if templates for `model` implement this mode.
    #[must_use]
    pub fn is_supported_by(self, model: &str) -> bool {
        modes_for(model).contains(&self)
    }
}

/// Returns the modes available for a model type.
///
/// Transition models, model sets, mini-models, and network models only
/// [`Run`](Mode::Run). Every other model type can
/// [`Estimate`](Mode::Estimate) and [`Simulate`](Mode::Simulate).
///
/// ```
/// use urbansim_utils::models::{Mode, modes_for};
///
/// assert_eq!(modes_for("networks"), [Mode::Run]);
/// assert_eq!(modes_for("hedonicmodel"), [Mode::Estimate, Mode::Simulate]);
/// ```
#[must_use]
pub fn modes_for(model: &str) -> &'static [Mode] {
    if RUN_ONLY_MODELS.contains(&model) {
        &[Mode::Run]
    } else {
        &[Mode::Estimate, Mode::Simulate]
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The error returned when parsing an unknown mode name.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown mode `{0}`, expected one of: estimate, simulate, run")]
pub struct ParseModeError(String);

impl FromStr for Mode {
    type Err = ParseModeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "estimate" => Ok(Mode::Estimate),
            "simulate" => Ok(Mode::Simulate),
            "run" => Ok(Mode::Run),
            other => Err(ParseModeError(other.to_owned())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn run_only_models() {
        for model in RUN_ONLY_MODELS {
            assert_eq!(modes_for(model), [Mode::Run]);
            assert!(Mode::Run.is_supported_by(model));
            assert!(!Mode::Estimate.is_supported_by(model));
        }
    }

    #[test]
    fn other_models_estimate_and_simulate() {
        for model in ["hedonicmodel", "locationchoicemodel", ""] {
            assert_eq!(modes_for(model), [Mode::Estimate, Mode::Simulate]);
            assert!(!Mode::Run.is_supported_by(model));
        }
    }

    #[test]
    fn names_round_trip_through_parse() {
        for mode in [Mode::Estimate, Mode::Simulate, Mode::Run] {
            assert_eq!(mode.to_string().parse::<Mode>(), Ok(mode));
        }
        assert_eq!(
            "Estimate".parse::<Mode>(),
            Err(ParseModeError("Estimate".into()))
        );
    }

    #[test]
    fn serializes_lowercase() {
        assert_eq!(serde_json::to_string(&Mode::Simulate).unwrap(), r#""simulate""#);
    }
}
