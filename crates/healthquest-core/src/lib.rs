//! # HealthQuest Core Library
//!
//! Core logic for the HealthQuest treasure hunt: daily health metrics earn
//! points, points convert into reward tokens, and goals track progress.
//! The CLI is a thin layer over this crate.
//!
//! ## Architecture
//!
//! - **Session**: [`HealthSession`] owns today's metrics, goals and rewards and
//!   persists every change through a [`KeyValueStore`] before exposing it
//! - **Scoring**: pure daily points function capped at 200
//! - **Storage**: SQLite key-value persistence and TOML configuration
//! - **Ledger**: optional JSON-RPC mirror of metrics to an on-chain contract,
//!   dispatched in the background by [`RemoteMirror`]
//! - **Insights**: advice from a chat completions API with a local fallback
//!
//! ## Key Components
//!
//! - [`HealthSession`]: state owner and persistence pipeline
//! - [`SqliteStore`]: durable key-value store
//! - [`Config`]: application configuration
//! - [`LedgerClient`]: trait for the remote ledger

pub mod error;
pub mod goals;
pub mod insights;
pub mod ledger;
pub mod metrics;
pub mod mirror;
pub mod profile;
pub mod rewards;
pub mod scoring;
pub mod session;
pub mod storage;

pub use error::{
    ConfigError, CoreError, InsightError, LedgerError, StorageError, ValidationError,
};
pub use goals::{Goal, GoalType, NewGoal};
pub use insights::{ChatCompletionsProvider, Insight, InsightKind, InsightProvider, Priority};
pub use ledger::{JsonRpcLedger, LedgerClient, OnChainHealthData, OnChainRewards};
pub use metrics::{validate_health_data, MetricField, MetricsInput, MetricsRecord};
pub use mirror::{MirrorOutcome, RemoteMirror};
pub use profile::{ActivityLevel, BmiCategory, BodyProfile, Gender};
pub use rewards::RewardState;
pub use scoring::{compute_daily_points, score_breakdown, PointsBreakdown, MAX_DAILY_POINTS};
pub use session::{HealthSession, MetricsCommit};
pub use storage::{Config, KeyValueStore, MemoryStore, SqliteStore};
