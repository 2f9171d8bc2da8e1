use clap::Args;
use healthquest_core::insights::{fallback_insights, generate_insights};
use healthquest_core::{ChatCompletionsProvider, Config, Insight};
use tracing::info;

use super::{open_session, runtime, CmdResult};

#[derive(Args)]
pub struct InsightsArgs {
    /// Skip the remote provider and use local advice only
    #[arg(long)]
    offline: bool,
    /// Output as JSON
    #[arg(long)]
    json: bool,
}

pub fn run(args: InsightsArgs) -> CmdResult {
    let session = open_session()?;
    let record = *session.metrics();
    let config = Config::load_or_default();

    let insights: Vec<Insight> = if args.offline {
        fallback_insights(&record)
    } else {
        match ChatCompletionsProvider::from_config(&config.insights) {
            Ok(provider) => {
                runtime()?.block_on(generate_insights(&provider, &record, session.goals()))
            }
            Err(e) => {
                info!(reason = %e, "insight provider unavailable; using local advice");
                fallback_insights(&record)
            }
        }
    };

    if args.json {
        println!("{}", serde_json::to_string_pretty(&insights)?);
        return Ok(());
    }
    for insight in &insights {
        println!("[{:?}] {}", insight.priority, insight.title);
        println!("    {}", insight.message);
        if let Some(action) = &insight.action_text {
            println!("    -> {action}");
        }
    }
    Ok(())
}
