//! On-chain account commands.

use clap::Subcommand;
use healthquest_core::{Config, JsonRpcLedger, LedgerClient, LedgerError};
use serde_json::json;

use super::{runtime, CmdResult};

#[derive(Subcommand)]
pub enum LedgerAction {
    /// Register the configured account with the contract
    Register,
    /// Show on-chain rewards and the last mirrored metrics
    Status {
        /// Address to query (default: the configured account)
        #[arg(long)]
        address: Option<String>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

/// Client for the configured ledger, or `NotConnected` when none is set up.
pub fn connect(config: &Config) -> Result<JsonRpcLedger, LedgerError> {
    let ledger = JsonRpcLedger::new(&config.ledger);
    if ledger.is_session_active() {
        Ok(ledger)
    } else {
        Err(LedgerError::NotConnected)
    }
}

pub fn run(action: LedgerAction) -> CmdResult {
    let config = Config::load_or_default();
    let ledger = connect(&config)?;
    let rt = runtime()?;

    match action {
        LedgerAction::Register => {
            let tx_hash = rt.block_on(ledger.register_user())?;
            println!("Registered: {tx_hash}");
        }
        LedgerAction::Status { address, json } => {
            let address = address
                .or_else(|| ledger.account().map(str::to_string))
                .ok_or(LedgerError::NotConnected)?;
            let (rewards, health) = rt.block_on(async {
                let rewards = ledger.get_user_rewards(&address).await?;
                let health = ledger.get_user_health_data(&address).await?;
                Ok::<_, LedgerError>((rewards, health))
            })?;

            if json {
                let out = json!({ "address": address, "rewards": rewards, "healthData": health });
                println!("{}", serde_json::to_string_pretty(&out)?);
            } else {
                let label = &config.rewards.currency_label;
                println!("Address: {address}");
                println!("Points:  {}", rewards.total_points);
                println!("{label}:    {}", rewards.bny_rewards);
                println!("Last claimed: {}", rewards.last_claimed);
                println!(
                    "Last update: steps {}, water {}, sleep {} (streak {})",
                    health.daily_steps, health.water_intake, health.sleep_hours, health.goal_streak
                );
            }
        }
    }
    Ok(())
}
