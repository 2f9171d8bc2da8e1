use chrono::NaiveDate;
use clap::Subcommand;
use healthquest_core::goals::active_goal_count;
use healthquest_core::insights::{generate_goal_suggestions, suggest_goals};
use healthquest_core::{ChatCompletionsProvider, Config, GoalType, NewGoal};
use tracing::info;

use super::{open_session, runtime, CmdResult};

#[derive(Subcommand)]
pub enum GoalAction {
    /// Create a new goal
    Add {
        /// Goal type: steps, water, sleep, calories or weight
        goal_type: GoalType,
        /// Target value
        target: f64,
        /// Start date (YYYY-MM-DD, default today)
        #[arg(long)]
        start: Option<NaiveDate>,
        /// End date (YYYY-MM-DD)
        #[arg(long)]
        end: Option<NaiveDate>,
    },
    /// List goals
    List {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Record progress on a goal
    Progress {
        /// Goal ID
        id: String,
        /// Current value
        current: f64,
    },
    /// Suggest goals from today's metrics
    Suggest {
        /// Skip the remote provider and use local rules only
        #[arg(long)]
        offline: bool,
    },
}

pub fn run(action: GoalAction) -> CmdResult {
    match action {
        GoalAction::Add {
            goal_type,
            target,
            start,
            end,
        } => {
            let mut session = open_session()?;
            let new_goal = NewGoal {
                start_date: start,
                end_date: end,
                ..NewGoal::new(goal_type, target)
            };
            let goal = session.add_goal(new_goal)?;
            println!("Goal created: {}", goal.id);
        }
        GoalAction::List { json } => {
            let session = open_session()?;
            let goals = session.goals();
            if json {
                println!("{}", serde_json::to_string_pretty(goals)?);
            } else if goals.is_empty() {
                println!("No goals yet.");
            } else {
                for goal in goals {
                    let mark = if goal.completed { "x" } else { " " };
                    println!(
                        "[{mark}] {} {}: {}/{} ({:.0}%)",
                        goal.id,
                        goal.goal_type.label(),
                        goal.current,
                        goal.target,
                        goal.progress_percent()
                    );
                }
                println!("{} active", active_goal_count(goals));
            }
        }
        GoalAction::Progress { id, current } => {
            let mut session = open_session()?;
            match session.update_goal_progress(&id, current)? {
                Some(goal) if goal.completed => println!("Goal completed: {}", goal.id),
                Some(goal) => println!("Progress: {:.0}%", goal.progress_percent()),
                None => {
                    eprintln!("goal not found: {id}");
                    std::process::exit(1);
                }
            }
        }
        GoalAction::Suggest { offline } => {
            let session = open_session()?;
            let record = session.metrics();
            let suggestions = if offline {
                suggest_goals(record)
            } else {
                match ChatCompletionsProvider::from_config(&Config::load_or_default().insights) {
                    Ok(provider) => runtime()?.block_on(generate_goal_suggestions(&provider, record)),
                    Err(e) => {
                        info!(reason = %e, "goal provider unavailable; using local rules");
                        suggest_goals(record)
                    }
                }
            };
            for suggestion in suggestions {
                println!("- {suggestion}");
            }
        }
    }
    Ok(())
}
