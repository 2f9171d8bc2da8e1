use clap::Args;
use healthquest_core::{score_breakdown, MAX_DAILY_POINTS};

use super::{open_session, CmdResult};

#[derive(Args)]
pub struct ScoreArgs {
    /// Steps to score instead of today's value
    #[arg(long)]
    steps: Option<u64>,
    /// Glasses of water to score instead of today's value
    #[arg(long)]
    water: Option<u64>,
    /// Hours of sleep to score instead of today's value
    #[arg(long)]
    sleep: Option<u64>,
    /// Output as JSON
    #[arg(long)]
    json: bool,
}

/// Print the breakdown without recording anything.
pub fn run(args: ScoreArgs) -> CmdResult {
    let session = open_session()?;
    let mut record = *session.metrics();
    if let Some(steps) = args.steps {
        record.steps = steps;
    }
    if let Some(water) = args.water {
        record.water_intake = water;
    }
    if let Some(sleep) = args.sleep {
        record.sleep_hours = sleep;
    }

    let breakdown = score_breakdown(&record);
    if args.json {
        println!("{}", serde_json::to_string_pretty(&breakdown)?);
    } else {
        println!("steps: {:>3}  ({} steps)", breakdown.steps, record.steps);
        println!("water: {:>3}  ({} glasses)", breakdown.water, record.water_intake);
        println!("sleep: {:>3}  ({} hours)", breakdown.sleep, record.sleep_hours);
        println!("total: {:>3} / {MAX_DAILY_POINTS}", breakdown.total);
    }
    Ok(())
}
