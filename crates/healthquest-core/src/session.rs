//! Session state holder.
//!
//! [`HealthSession`] owns the current metrics record, the goal list and the
//! reward state, with the key-value store injected. Every mutating call
//! computes the new state first, writes it, and only then replaces the
//! in-memory copy: a failed write leaves the session exactly as it was.

use chrono::{Local, NaiveDate};
use serde::Serialize;
use tokio::sync::mpsc::UnboundedSender;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::error::Result;
use crate::goals::{self, Goal, NewGoal};
use crate::metrics::{MetricField, MetricsRecord};
use crate::mirror::{MirrorOutcome, RemoteMirror};
use crate::rewards::RewardState;
use crate::scoring::{score_breakdown, PointsBreakdown};
use crate::storage::{keys, KeyValueStore};

/// Result of committing a metrics record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MetricsCommit {
    pub record: MetricsRecord,
    pub earned: PointsBreakdown,
    pub rewards: RewardState,
}

/// Per-user health state backed by a key-value store.
pub struct HealthSession<S: KeyValueStore> {
    store: S,
    metrics: MetricsRecord,
    goals: Vec<Goal>,
    rewards: RewardState,
}

impl<S: KeyValueStore> HealthSession<S> {
    /// Read all state from `store`, defaulting whatever is absent.
    ///
    /// The token count is always recomputed from the stored point total.
    ///
    /// # Errors
    /// Returns an error if the store itself cannot be read.
    pub fn load(store: S) -> Result<Self> {
        let metrics = store
            .get::<MetricsRecord>(keys::HEALTH_DATA)?
            .unwrap_or_else(MetricsRecord::today);
        let goals = store.get::<Vec<Goal>>(keys::GOALS)?.unwrap_or_default();
        let total_points = store.get::<u64>(keys::TOTAL_POINTS)?.unwrap_or(0);
        let rewards = RewardState::from_points(total_points);

        if let Some(stored_tokens) = store.get::<u64>(keys::TOKEN_REWARDS)? {
            if stored_tokens != rewards.token_rewards() {
                warn!(
                    stored_tokens,
                    derived = rewards.token_rewards(),
                    "stored token count disagrees with points; using derived value"
                );
            }
        }

        debug!(
            total_points,
            goals = goals.len(),
            date = %metrics.date,
            "loaded session"
        );

        Ok(Self {
            store,
            metrics,
            goals,
            rewards,
        })
    }

    pub fn metrics(&self) -> &MetricsRecord {
        &self.metrics
    }

    pub fn goals(&self) -> &[Goal] {
        &self.goals
    }

    pub fn rewards(&self) -> RewardState {
        self.rewards
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Replace the current record, score it, and persist record and rewards
    /// together.
    ///
    /// # Errors
    /// Returns a storage error if the write fails; session state is unchanged.
    pub fn record_metrics(&mut self, record: MetricsRecord) -> Result<MetricsCommit> {
        let earned = score_breakdown(&record);
        let rewards = self.rewards.apply_points(earned.total);

        self.store.put_batch(&[
            (keys::HEALTH_DATA, serde_json::to_value(record)?),
            (keys::TOTAL_POINTS, rewards.total_points().into()),
            (keys::TOKEN_REWARDS, rewards.token_rewards().into()),
        ])?;

        self.metrics = record;
        self.rewards = rewards;
        info!(
            date = %record.date,
            earned = earned.total,
            total_points = rewards.total_points(),
            token_rewards = rewards.token_rewards(),
            "committed health data"
        );

        Ok(MetricsCommit {
            record,
            earned,
            rewards,
        })
    }

    /// Edit one metric of today's record.
    ///
    /// # Errors
    /// See [`HealthSession::record_metrics`].
    pub fn set_metric(&mut self, field: MetricField, value: u64) -> Result<MetricsCommit> {
        self.set_metric_on(Local::now().date_naive(), field, value)
    }

    /// Edit one metric of the record for `today`. A record from an earlier
    /// day is not carried over: the new day starts from zero.
    ///
    /// # Errors
    /// See [`HealthSession::record_metrics`].
    pub fn set_metric_on(
        &mut self,
        today: NaiveDate,
        field: MetricField,
        value: u64,
    ) -> Result<MetricsCommit> {
        let record = self.metric_entry(today, field, value);
        self.record_metrics(record)
    }

    /// The record [`HealthSession::set_metric_on`] would commit, without
    /// committing it.
    pub fn metric_entry(&self, today: NaiveDate, field: MetricField, value: u64) -> MetricsRecord {
        let base = if self.metrics.date == today {
            self.metrics
        } else {
            MetricsRecord::empty(today)
        };
        base.with_field(field, value)
    }

    /// Validate external JSON and commit it. Without a `date` the entry
    /// belongs to today.
    ///
    /// # Errors
    /// Returns a validation error for malformed input, or a storage error.
    pub fn import_json(&mut self, value: &serde_json::Value) -> Result<MetricsCommit> {
        let record = MetricsRecord::from_json(value)?;
        self.record_metrics(record)
    }

    /// Commit a record, then mirror it to the ledger in the background.
    ///
    /// The mirror runs only after the local commit succeeded; its outcome
    /// never affects the returned commit.
    ///
    /// # Errors
    /// Returns a storage error if the local commit fails, in which case
    /// nothing is mirrored.
    pub fn record_and_mirror(
        &mut self,
        record: MetricsRecord,
        mirror: &RemoteMirror,
        completion: Option<UnboundedSender<MirrorOutcome>>,
    ) -> Result<(MetricsCommit, Option<JoinHandle<MirrorOutcome>>)> {
        let commit = self.record_metrics(record)?;
        let handle = mirror.dispatch(&commit.record, completion);
        Ok((commit, handle))
    }

    /// Create a goal and persist the full list.
    ///
    /// # Errors
    /// Returns a validation error for a bad target, or a storage error.
    pub fn add_goal(&mut self, new_goal: NewGoal) -> Result<&Goal> {
        new_goal.validate()?;
        let updated = goals::add_goal(&self.goals, new_goal);
        self.store.put(keys::GOALS, &updated)?;
        self.goals = updated;

        let goal = &self.goals[self.goals.len() - 1];
        info!(id = %goal.id, goal_type = %goal.goal_type, target = goal.target, "added goal");
        Ok(goal)
    }

    /// Set progress on a goal and persist the full list.
    ///
    /// Returns the updated goal, or `None` if no goal has `goal_id` (the list
    /// is still written, unchanged).
    ///
    /// # Errors
    /// Returns a storage error if the write fails.
    pub fn update_goal_progress(&mut self, goal_id: &str, current: f64) -> Result<Option<&Goal>> {
        let updated = goals::update_goal_progress(&self.goals, goal_id, current);
        self.store.put(keys::GOALS, &updated)?;
        self.goals = updated;
        Ok(self.goals.iter().find(|g| g.id == goal_id))
    }

    /// Explicitly zero the point total and token count.
    ///
    /// # Errors
    /// Returns a storage error if the write fails.
    pub fn reset_rewards(&mut self) -> Result<RewardState> {
        let rewards = self.rewards.reset();
        self.store.put_batch(&[
            (keys::TOTAL_POINTS, rewards.total_points().into()),
            (keys::TOKEN_REWARDS, rewards.token_rewards().into()),
        ])?;
        self.rewards = rewards;
        info!("reset rewards");
        Ok(rewards)
    }
}
