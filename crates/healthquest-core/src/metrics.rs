//! Daily health metrics and boundary validation.
//!
//! A [`MetricsRecord`] is the single "current" record the session holds and
//! mirrors to storage. Externally supplied JSON goes through
//! [`validate_health_data`] before it becomes a record.

use chrono::{Local, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// One day of user-entered health metrics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricsRecord {
    /// Steps walked
    pub steps: u64,
    /// Glasses of water
    pub water_intake: u64,
    /// Hours slept
    pub sleep_hours: u64,
    /// Calories consumed
    pub calories: u64,
    /// Calendar day the record belongs to
    pub date: NaiveDate,
}

impl MetricsRecord {
    /// Zero-valued record for `date`.
    pub fn empty(date: NaiveDate) -> Self {
        Self {
            steps: 0,
            water_intake: 0,
            sleep_hours: 0,
            calories: 0,
            date,
        }
    }

    /// Zero-valued record dated today (local time).
    pub fn today() -> Self {
        Self::empty(Local::now().date_naive())
    }

    /// Return a copy with one field replaced.
    pub fn with_field(mut self, field: MetricField, value: u64) -> Self {
        match field {
            MetricField::Steps => self.steps = value,
            MetricField::WaterIntake => self.water_intake = value,
            MetricField::SleepHours => self.sleep_hours = value,
            MetricField::Calories => self.calories = value,
        }
        self
    }

    /// Read one field.
    pub fn field(&self, field: MetricField) -> u64 {
        match field {
            MetricField::Steps => self.steps,
            MetricField::WaterIntake => self.water_intake,
            MetricField::SleepHours => self.sleep_hours,
            MetricField::Calories => self.calories,
        }
    }

    /// Validate untrusted JSON into a record. Without a `date` the entry
    /// belongs to today.
    ///
    /// # Errors
    /// See [`validate_health_data`].
    pub fn from_json(value: &serde_json::Value) -> Result<Self, ValidationError> {
        let input = validate_health_data(value)?;
        Ok(Self::today().with_input(input))
    }

    /// Apply validated input. The input's date wins over this record's.
    pub fn with_input(self, input: MetricsInput) -> Self {
        Self {
            steps: input.steps,
            water_intake: input.water_intake,
            sleep_hours: input.sleep_hours,
            calories: input.calories,
            date: input.date.unwrap_or(self.date),
        }
    }
}

impl Default for MetricsRecord {
    fn default() -> Self {
        Self::today()
    }
}

/// Editable metric fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum MetricField {
    Steps,
    WaterIntake,
    SleepHours,
    Calories,
}

impl MetricField {
    pub const ALL: [MetricField; 4] = [
        MetricField::Steps,
        MetricField::WaterIntake,
        MetricField::SleepHours,
        MetricField::Calories,
    ];

    /// Wire name used in stored JSON.
    pub fn as_str(&self) -> &'static str {
        match self {
            MetricField::Steps => "steps",
            MetricField::WaterIntake => "waterIntake",
            MetricField::SleepHours => "sleepHours",
            MetricField::Calories => "calories",
        }
    }
}

impl std::str::FromStr for MetricField {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "steps" => Ok(MetricField::Steps),
            "water" | "waterIntake" | "water_intake" => Ok(MetricField::WaterIntake),
            "sleep" | "sleepHours" | "sleep_hours" => Ok(MetricField::SleepHours),
            "calories" => Ok(MetricField::Calories),
            other => Err(ValidationError::InvalidValue {
                field: "metric".into(),
                message: format!("unknown metric '{other}'"),
            }),
        }
    }
}

/// Metrics that passed boundary validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MetricsInput {
    pub steps: u64,
    pub water_intake: u64,
    pub sleep_hours: u64,
    pub calories: u64,
    /// Day the entry belongs to; `None` means today.
    pub date: Option<NaiveDate>,
}

/// Validate an untrusted JSON health-data object.
///
/// `steps`, `waterIntake` and `sleepHours` are required non-negative
/// integers; `calories` is optional and defaults to 0. `date` is optional
/// and, when present and not null, must be a `YYYY-MM-DD` string. Extra
/// fields are ignored.
///
/// # Errors
/// Returns a [`ValidationError`] naming the first offending field.
pub fn validate_health_data(value: &serde_json::Value) -> Result<MetricsInput, ValidationError> {
    let obj = value
        .as_object()
        .ok_or_else(|| ValidationError::NotAnObject(json_kind(value).to_string()))?;

    let required = |name: &str| -> Result<u64, ValidationError> {
        let field = obj
            .get(name)
            .ok_or_else(|| ValidationError::MissingField(name.to_string()))?;
        non_negative_integer(name, field)
    };

    let steps = required("steps")?;
    let water_intake = required("waterIntake")?;
    let sleep_hours = required("sleepHours")?;
    let calories = match obj.get("calories") {
        Some(serde_json::Value::Null) | None => 0,
        Some(v) => non_negative_integer("calories", v)?,
    };
    let date = match obj.get("date") {
        Some(serde_json::Value::Null) | None => None,
        Some(serde_json::Value::String(raw)) => {
            Some(raw.parse::<NaiveDate>().map_err(|e| ValidationError::InvalidValue {
                field: "date".into(),
                message: e.to_string(),
            })?)
        }
        Some(other) => {
            return Err(ValidationError::InvalidValue {
                field: "date".into(),
                message: format!("expected a YYYY-MM-DD string, got {}", json_kind(other)),
            })
        }
    };

    Ok(MetricsInput {
        steps,
        water_intake,
        sleep_hours,
        calories,
        date,
    })
}

fn non_negative_integer(field: &str, value: &serde_json::Value) -> Result<u64, ValidationError> {
    let invalid = |message: &str| ValidationError::InvalidValue {
        field: field.to_string(),
        message: message.to_string(),
    };

    match value {
        serde_json::Value::Number(n) => {
            if let Some(v) = n.as_u64() {
                Ok(v)
            } else if n.as_i64().is_some() {
                Err(invalid("must be non-negative"))
            } else {
                match n.as_f64() {
                    Some(f) if f < 0.0 => Err(invalid("must be non-negative")),
                    Some(f) if f.fract() == 0.0 && f <= u64::MAX as f64 => Ok(f as u64),
                    _ => Err(invalid("must be a whole number")),
                }
            }
        }
        other => Err(invalid(&format!("expected a number, got {}", json_kind(other)))),
    }
}

fn json_kind(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "boolean",
        serde_json::Value::Number(_) => "number",
        serde_json::Value::String(_) => "string",
        serde_json::Value::Array(_) => "array",
        serde_json::Value::Object(_) => "object",
    }
}
