use std::io::Read;
use std::sync::Arc;
use std::time::Duration;

use chrono::{Local, NaiveDate};
use clap::Subcommand;
use healthquest_core::{
    Config, CoreError, HealthSession, JsonRpcLedger, KeyValueStore, LedgerClient, MetricField,
    MetricsCommit, MetricsRecord, MirrorOutcome, RemoteMirror,
};
use tracing::warn;

use super::{open_session, runtime, CmdResult};

#[derive(Subcommand)]
pub enum MetricsAction {
    /// Set one metric for today and earn points for the updated entry
    Set {
        /// Metric name: steps, water, sleep or calories
        field: MetricField,
        /// New value
        value: u64,
        /// Day the entry belongs to (YYYY-MM-DD, default today)
        #[arg(long)]
        date: Option<NaiveDate>,
    },
    /// Show the latest metrics entry
    Show {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Import a full entry from JSON ("-" reads stdin)
    Import {
        /// Path to a JSON file with steps, waterIntake, sleepHours and optional calories/date
        path: String,
    },
}

pub fn run(action: MetricsAction) -> CmdResult {
    match action {
        MetricsAction::Set { field, value, date } => {
            let mut session = open_session()?;
            let today = date.unwrap_or_else(|| Local::now().date_naive());
            let record = session.metric_entry(today, field, value);
            let config = Config::load_or_default();
            let commit = commit_record(&mut session, record, &config)?;
            print_commit(&commit, &config);
        }
        MetricsAction::Show { json } => {
            let session = open_session()?;
            let record = session.metrics();
            if json {
                println!("{}", serde_json::to_string_pretty(record)?);
            } else {
                println!("{:<12} {}", "date:", record.date);
                for field in MetricField::ALL {
                    println!("{:<12} {}", format!("{}:", field.as_str()), record.field(field));
                }
            }
        }
        MetricsAction::Import { path } => {
            let raw = if path == "-" {
                let mut buf = String::new();
                std::io::stdin().read_to_string(&mut buf)?;
                buf
            } else {
                std::fs::read_to_string(&path)?
            };
            let value: serde_json::Value = serde_json::from_str(&raw)?;
            let record = MetricsRecord::from_json(&value)?;

            let mut session = open_session()?;
            let config = Config::load_or_default();
            let commit = commit_record(&mut session, record, &config)?;
            print_commit(&commit, &config);
        }
    }
    Ok(())
}

fn print_commit(commit: &MetricsCommit, config: &Config) {
    let label = &config.rewards.currency_label;
    println!(
        "Earned {} points (steps {}, water {}, sleep {})",
        commit.earned.total, commit.earned.steps, commit.earned.water, commit.earned.sleep
    );
    println!(
        "Total: {} points, {} {label}",
        commit.rewards.total_points(),
        commit.rewards.token_rewards()
    );
}

/// Commit `record` locally, mirroring it to the ledger when a session is
/// configured. The mirror outcome is reported but never fails the command.
fn commit_record<S: KeyValueStore>(
    session: &mut HealthSession<S>,
    record: MetricsRecord,
    config: &Config,
) -> Result<MetricsCommit, Box<dyn std::error::Error>> {
    let ledger = JsonRpcLedger::new(&config.ledger);
    if !ledger.is_session_active() {
        return Ok(session.record_metrics(record)?);
    }

    let mirror = RemoteMirror::new(Arc::new(ledger))
        .with_timeout(Duration::from_secs(config.ledger.timeout_secs));
    let commit = runtime()?.block_on(async {
        let (commit, handle) = session.record_and_mirror(record, &mirror, None)?;
        if let Some(handle) = handle {
            match handle.await {
                Ok(MirrorOutcome::Submitted { tx_hash }) => eprintln!("ledger: submitted {tx_hash}"),
                Ok(MirrorOutcome::Failed { reason }) => eprintln!("ledger: not mirrored ({reason})"),
                Ok(MirrorOutcome::Skipped) => {}
                Err(e) => warn!(error = %e, "ledger mirror task aborted"),
            }
        }
        Ok::<_, CoreError>(commit)
    })?;
    Ok(commit)
}
