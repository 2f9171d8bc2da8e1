use clap::Subcommand;
use healthquest_core::{Config, LedgerClient};

use super::ledger::connect;
use super::{open_session, runtime, CmdResult};

#[derive(Subcommand)]
pub enum RewardsAction {
    /// Show accumulated points and tokens
    Show {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Reset points and tokens to zero
    Reset,
    /// Claim accumulated rewards on the ledger
    Claim,
}

pub fn run(action: RewardsAction) -> CmdResult {
    match action {
        RewardsAction::Show { json } => {
            let session = open_session()?;
            let rewards = session.rewards();
            if json {
                println!("{}", serde_json::to_string_pretty(&rewards)?);
            } else {
                let label = Config::load_or_default().rewards.currency_label;
                println!("Points: {}", rewards.total_points());
                println!("{label}:   {}", rewards.token_rewards());
                println!("Next token in {} points", rewards.points_to_next_token());
            }
        }
        RewardsAction::Reset => {
            let mut session = open_session()?;
            session.reset_rewards()?;
            println!("rewards reset");
        }
        RewardsAction::Claim => {
            let ledger = connect(&Config::load_or_default())?;
            let tx_hash = runtime()?.block_on(ledger.claim_rewards())?;
            println!("Claimed: {tx_hash}");
        }
    }
    Ok(())
}
