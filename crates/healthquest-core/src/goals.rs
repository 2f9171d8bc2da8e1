//! User-defined health goals and progress tracking.
//!
//! Goals are created only by explicit user action, updated only through
//! [`update_goal_progress`], and never deleted here. Both operations return a
//! new list; the session persists the whole list after each change.

use chrono::{Local, NaiveDate};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::ValidationError;

/// Metric a goal targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GoalType {
    Steps,
    Water,
    Sleep,
    Calories,
    Weight,
}

impl GoalType {
    pub fn as_str(&self) -> &'static str {
        match self {
            GoalType::Steps => "steps",
            GoalType::Water => "water",
            GoalType::Sleep => "sleep",
            GoalType::Calories => "calories",
            GoalType::Weight => "weight",
        }
    }

    /// Human-readable label including the unit.
    pub fn label(&self) -> &'static str {
        match self {
            GoalType::Steps => "Daily Steps",
            GoalType::Water => "Water Intake (glasses)",
            GoalType::Sleep => "Sleep Hours",
            GoalType::Calories => "Daily Calories",
            GoalType::Weight => "Weight (kg)",
        }
    }
}

impl std::fmt::Display for GoalType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for GoalType {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "steps" => Ok(GoalType::Steps),
            "water" => Ok(GoalType::Water),
            "sleep" => Ok(GoalType::Sleep),
            "calories" => Ok(GoalType::Calories),
            "weight" => Ok(GoalType::Weight),
            other => Err(ValidationError::InvalidValue {
                field: "type".into(),
                message: format!("unknown goal type '{other}'"),
            }),
        }
    }
}

/// A tracked goal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Goal {
    pub id: String,
    #[serde(rename = "type")]
    pub goal_type: GoalType,
    pub target: f64,
    pub current: f64,
    pub start_date: NaiveDate,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_date: Option<NaiveDate>,
    pub completed: bool,
}

impl Goal {
    /// Progress toward the target, capped at 100.
    pub fn progress_percent(&self) -> f64 {
        if self.target <= 0.0 {
            return 100.0;
        }
        (self.current / self.target * 100.0).min(100.0)
    }
}

/// Input for creating a goal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewGoal {
    #[serde(rename = "type")]
    pub goal_type: GoalType,
    pub target: f64,
    #[serde(default)]
    pub start_date: Option<NaiveDate>,
    #[serde(default)]
    pub end_date: Option<NaiveDate>,
}

impl NewGoal {
    pub fn new(goal_type: GoalType, target: f64) -> Self {
        Self {
            goal_type,
            target,
            start_date: None,
            end_date: None,
        }
    }

    /// # Errors
    /// Returns an error unless the target is finite and positive and the end
    /// date, when present, is not before the start date.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if !self.target.is_finite() || self.target <= 0.0 {
            return Err(ValidationError::InvalidValue {
                field: "target".into(),
                message: "must be a positive number".into(),
            });
        }
        if let (Some(start), Some(end)) = (self.start_date, self.end_date) {
            if end < start {
                return Err(ValidationError::InvalidValue {
                    field: "endDate".into(),
                    message: format!("{end} is before start date {start}"),
                });
            }
        }
        Ok(())
    }
}

/// Append a new goal with zero progress and a fresh id.
pub fn add_goal(goals: &[Goal], new_goal: NewGoal) -> Vec<Goal> {
    let mut out = goals.to_vec();
    out.push(Goal {
        id: Uuid::new_v4().to_string(),
        goal_type: new_goal.goal_type,
        target: new_goal.target,
        current: 0.0,
        start_date: new_goal
            .start_date
            .unwrap_or_else(|| Local::now().date_naive()),
        end_date: new_goal.end_date,
        completed: false,
    });
    out
}

/// Set `current` on the goal with `goal_id` and recompute `completed`.
///
/// An unknown id returns the list unchanged.
pub fn update_goal_progress(goals: &[Goal], goal_id: &str, new_current: f64) -> Vec<Goal> {
    goals
        .iter()
        .map(|goal| {
            if goal.id == goal_id {
                Goal {
                    current: new_current,
                    completed: new_current >= goal.target,
                    ..goal.clone()
                }
            } else {
                goal.clone()
            }
        })
        .collect()
}

/// Number of goals not yet completed.
pub fn active_goal_count(goals: &[Goal]) -> usize {
    goals.iter().filter(|g| !g.completed).count()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn steps_goal() -> NewGoal {
        NewGoal::new(GoalType::Steps, 10_000.0)
    }

    #[test]
    fn add_then_complete_steps_goal() {
        let goals = add_goal(&[], steps_goal());
        assert_eq!(goals.len(), 1);
        assert_eq!(goals[0].current, 0.0);
        assert!(!goals[0].completed);

        let id = goals[0].id.clone();
        let goals = update_goal_progress(&goals, &id, 10_000.0);
        assert!(goals[0].completed);
        assert_eq!(goals[0].current, 10_000.0);
    }

    #[test]
    fn add_preserves_insertion_order_and_unique_ids() {
        let goals = add_goal(&[], steps_goal());
        let goals = add_goal(&goals, NewGoal::new(GoalType::Water, 8.0));
        let goals = add_goal(&goals, NewGoal::new(GoalType::Sleep, 8.0));
        let types: Vec<_> = goals.iter().map(|g| g.goal_type).collect();
        assert_eq!(types, vec![GoalType::Steps, GoalType::Water, GoalType::Sleep]);
        assert_ne!(goals[0].id, goals[1].id);
        assert_ne!(goals[1].id, goals[2].id);
    }

    #[test]
    fn update_is_idempotent() {
        let goals = add_goal(&[], steps_goal());
        let goals = add_goal(&goals, NewGoal::new(GoalType::Water, 8.0));
        let id = goals[1].id.clone();
        let once = update_goal_progress(&goals, &id, 5.0);
        let twice = update_goal_progress(&once, &id, 5.0);
        assert_eq!(once, twice);
        assert_eq!(once[0], goals[0]);
    }

    #[test]
    fn update_can_uncomplete() {
        let goals = add_goal(&[], NewGoal::new(GoalType::Water, 8.0));
        let id = goals[0].id.clone();
        let goals = update_goal_progress(&goals, &id, 9.0);
        assert!(goals[0].completed);
        let goals = update_goal_progress(&goals, &id, 3.0);
        assert!(!goals[0].completed);
    }

    #[test]
    fn unknown_id_is_a_no_op() {
        let goals = add_goal(&[], steps_goal());
        assert_eq!(update_goal_progress(&goals, "missing", 1.0), goals);
    }

    #[test]
    fn progress_percent_caps_at_100() {
        let goals = add_goal(&[], NewGoal::new(GoalType::Water, 8.0));
        let id = goals[0].id.clone();
        assert_eq!(update_goal_progress(&goals, &id, 4.0)[0].progress_percent(), 50.0);
        assert_eq!(update_goal_progress(&goals, &id, 16.0)[0].progress_percent(), 100.0);
    }

    #[test]
    fn active_count_skips_completed() {
        let goals = add_goal(&[], steps_goal());
        let goals = add_goal(&goals, NewGoal::new(GoalType::Water, 8.0));
        let id = goals[1].id.clone();
        let goals = update_goal_progress(&goals, &id, 8.0);
        assert_eq!(active_goal_count(&goals), 1);
    }

    #[test]
    fn validate_rejects_non_positive_targets() {
        assert!(NewGoal::new(GoalType::Steps, 0.0).validate().is_err());
        assert!(NewGoal::new(GoalType::Steps, -3.0).validate().is_err());
        assert!(NewGoal::new(GoalType::Steps, f64::NAN).validate().is_err());
        assert!(steps_goal().validate().is_ok());
    }

    #[test]
    fn validate_rejects_end_before_start() {
        let goal = NewGoal {
            start_date: NaiveDate::from_ymd_opt(2024, 6, 10),
            end_date: NaiveDate::from_ymd_opt(2024, 6, 1),
            ..steps_goal()
        };
        assert!(goal.validate().is_err());
    }

    #[test]
    fn goal_serializes_type_field() {
        let goals = add_goal(
            &[],
            NewGoal {
                start_date: NaiveDate::from_ymd_opt(2024, 6, 1),
                ..steps_goal()
            },
        );
        let json = serde_json::to_value(&goals[0]).unwrap();
        assert_eq!(json["type"], "steps");
        assert_eq!(json["startDate"], "2024-06-01");
        assert!(json.get("endDate").is_none());
    }
}
