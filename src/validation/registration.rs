//! Registration form checks.

use crate::catalog::RewardId;
use crate::error::EngineError;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use stillwater::validation::Validation;
use stillwater::NonEmptyVec;

/// Raw registration fields as submitted, before any coercion.
///
/// Blank strings count as missing.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct RegistrationForm {
    pub name: Option<String>,
    pub age: Option<String>,
    pub screen_time: Option<String>,
    pub reward_id: Option<String>,
}

/// Typed registration input accepted by `Engine::create`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Registration {
    pub name: String,
    pub age: u32,
    pub screen_time_hours_per_day: f64,
    pub reward_id: RewardId,
}

impl RegistrationForm {
    /// Check every field, accumulating ALL problems.
    pub fn validate(&self) -> Validation<(), NonEmptyVec<EngineError>> {
        let checks = vec![
            check(required(&self.name, "name").map(drop)),
            check(parse_field::<u32>(&self.age, "age", "whole number").map(drop)),
            check(parse_screen_time(&self.screen_time).map(drop)),
            check(parse_field::<RewardId>(&self.reward_id, "reward_id", "reward id").map(drop)),
        ];

        Validation::all_vec(checks).map(|_| ())
    }

    /// Coerce the form into a typed registration.
    ///
    /// Fails with `EngineError::Registration` listing every problem found.
    pub fn into_registration(self) -> Result<Registration, EngineError> {
        if let Validation::Failure(errors) = self.validate() {
            return Err(EngineError::Registration {
                errors: errors.iter().cloned().collect(),
            });
        }

        Ok(Registration {
            name: required(&self.name, "name")?.to_string(),
            age: parse_field(&self.age, "age", "whole number")?,
            screen_time_hours_per_day: parse_screen_time(&self.screen_time)?,
            reward_id: parse_field(&self.reward_id, "reward_id", "reward id")?,
        })
    }
}

fn check(result: Result<(), EngineError>) -> Validation<(), NonEmptyVec<EngineError>> {
    match result {
        Ok(()) => Validation::success(()),
        Err(err) => Validation::fail(err),
    }
}

fn required<'a>(raw: &'a Option<String>, field: &'static str) -> Result<&'a str, EngineError> {
    match raw.as_deref().map(str::trim) {
        Some(value) if !value.is_empty() => Ok(value),
        _ => Err(EngineError::MissingField { field }),
    }
}

fn parse_field<T: FromStr>(
    raw: &Option<String>,
    field: &'static str,
    expected: &'static str,
) -> Result<T, EngineError> {
    let value = required(raw, field)?;
    value.parse().map_err(|_| EngineError::TypeCoercion {
        field,
        value: value.to_string(),
        expected,
    })
}

const SCREEN_TIME_FIELD: &str = "screen_time";
const SCREEN_TIME_EXPECTED: &str = "non-negative number of hours";

fn parse_screen_time(raw: &Option<String>) -> Result<f64, EngineError> {
    let hours: f64 = parse_field(raw, SCREEN_TIME_FIELD, SCREEN_TIME_EXPECTED)?;
    check_screen_time(hours)
}

/// Screen time must be finite and non-negative, or snapshots cannot carry it.
pub(crate) fn check_screen_time(hours: f64) -> Result<f64, EngineError> {
    if hours.is_finite() && hours >= 0.0 {
        Ok(hours)
    } else {
        Err(EngineError::TypeCoercion {
            field: SCREEN_TIME_FIELD,
            value: hours.to_string(),
            expected: SCREEN_TIME_EXPECTED,
        })
    }
}
