//! JSON event payloads.

use crate::catalog::{RewardId, TaskId};
use crate::error::EngineError;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A completed wellness task as reported by the participant.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TaskCompletion {
    /// `None` falls back to the configured default task
    pub task_id: Option<TaskId>,
    pub duration_minutes: f64,
}

impl TaskCompletion {
    pub fn new(task_id: Option<TaskId>, duration_minutes: f64) -> Self {
        Self {
            task_id,
            duration_minutes,
        }
    }

    /// Read `{"task_id"?: int, "duration": number}`.
    ///
    /// Numbers may arrive as JSON numbers or numeric strings. Range checks on
    /// the duration happen in the engine so typed callers get them too.
    pub fn from_json(payload: &Value) -> Result<Self, EngineError> {
        let object = as_object(payload)?;

        let task_id = match present(object, "task_id") {
            Some(raw) => Some(coerce_id(raw, "task_id")?),
            None => None,
        };

        let duration = present(object, "duration")
            .ok_or_else(|| EngineError::InvalidInput("duration is required".to_string()))?;
        let duration_minutes = match duration {
            Value::Number(n) => n.as_f64(),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        }
        .ok_or_else(|| EngineError::InvalidInput(format!("duration {duration} is not a number")))?;

        Ok(Self::new(task_id, duration_minutes))
    }
}

/// Read `{"app_name": string}`.
pub fn app_label_from_json(payload: &Value) -> Result<String, EngineError> {
    let object = as_object(payload)?;
    match present(object, "app_name") {
        Some(Value::String(label)) => Ok(label.clone()),
        Some(other) => Err(EngineError::InvalidInput(format!(
            "app_name {other} is not a string"
        ))),
        None => Err(EngineError::MissingField { field: "app_name" }),
    }
}

/// Read `{"avatar_id": int}`.
pub fn reward_id_from_json(payload: &Value) -> Result<RewardId, EngineError> {
    let object = as_object(payload)?;
    let raw = present(object, "avatar_id").ok_or(EngineError::MissingField { field: "avatar_id" })?;
    coerce_id(raw, "avatar_id")
}

fn as_object(payload: &Value) -> Result<&Map<String, Value>, EngineError> {
    payload
        .as_object()
        .ok_or_else(|| EngineError::InvalidInput("expected a JSON object".to_string()))
}

/// A key counts as absent when missing or null.
fn present<'a>(object: &'a Map<String, Value>, key: &str) -> Option<&'a Value> {
    object.get(key).filter(|v| !v.is_null())
}

fn coerce_id(raw: &Value, field: &'static str) -> Result<u32, EngineError> {
    let parsed = match raw {
        Value::Number(n) => n.as_u64().and_then(|v| u32::try_from(v).ok()),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    };
    parsed.ok_or_else(|| EngineError::TypeCoercion {
        field,
        value: raw.to_string(),
        expected: "non-negative integer id",
    })
}
