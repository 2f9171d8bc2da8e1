//! Health insights from an external text generator.
//!
//! The generator is reached through [`InsightProvider`]. Whatever it returns
//! is validated into typed [`Insight`]s; any failure (transport, missing key,
//! unparseable content) falls back to locally computed advice so callers
//! always get something to show.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::warn;

use crate::error::InsightError;
use crate::goals::Goal;
use crate::metrics::MetricsRecord;
use crate::storage::InsightsConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InsightKind {
    Recommendation,
    Warning,
    Achievement,
    Suggestion,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    Medium,
    High,
}

/// One piece of advice shown to the user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Insight {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: InsightKind,
    pub title: String,
    pub message: String,
    pub priority: Priority,
    #[serde(default = "Utc::now")]
    pub date: DateTime<Utc>,
    pub actionable: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub action_text: Option<String>,
}

impl Insight {
    fn new(id: &str, kind: InsightKind, priority: Priority, title: &str, message: &str) -> Self {
        Self {
            id: id.to_string(),
            kind,
            title: title.to_string(),
            message: message.to_string(),
            priority,
            date: Utc::now(),
            actionable: false,
            action_text: None,
        }
    }

    fn with_action(mut self, text: &str) -> Self {
        self.actionable = true;
        self.action_text = Some(text.to_string());
        self
    }
}

/// External insight generator.
#[async_trait]
pub trait InsightProvider: Send + Sync {
    async fn generate(
        &self,
        record: &MetricsRecord,
        goals: &[Goal],
    ) -> Result<Vec<Insight>, InsightError>;

    /// Short goal ideas for the given day. Providers without a goal mode
    /// report `Unavailable` and callers use [`suggest_goals`].
    async fn goal_suggestions(&self, _record: &MetricsRecord) -> Result<Vec<String>, InsightError> {
        Err(InsightError::Unavailable("goal suggestions not supported".into()))
    }
}

/// Ask `provider` for insights, falling back to local advice on any error.
pub async fn generate_insights(
    provider: &dyn InsightProvider,
    record: &MetricsRecord,
    goals: &[Goal],
) -> Vec<Insight> {
    match provider.generate(record, goals).await {
        Ok(insights) if !insights.is_empty() => insights,
        Ok(_) => {
            warn!("insight provider returned nothing; using fallback");
            fallback_insights(record)
        }
        Err(e) => {
            warn!(error = %e, "insight provider failed; using fallback");
            fallback_insights(record)
        }
    }
}

/// Ask `provider` for goal ideas, falling back to [`suggest_goals`].
pub async fn generate_goal_suggestions(
    provider: &dyn InsightProvider,
    record: &MetricsRecord,
) -> Vec<String> {
    match provider.goal_suggestions(record).await {
        Ok(goals) if !goals.is_empty() => goals,
        Ok(_) => {
            warn!("goal provider returned nothing; using fallback");
            suggest_goals(record)
        }
        Err(e) => {
            warn!(error = %e, "goal provider failed; using fallback");
            suggest_goals(record)
        }
    }
}

/// Fixed advice used when nothing better is available.
pub fn default_insights() -> Vec<Insight> {
    vec![
        Insight::new(
            "1",
            InsightKind::Recommendation,
            Priority::Low,
            "Great Start!",
            "You're on track with your daily goals. Keep up the momentum!",
        ),
        Insight::new(
            "2",
            InsightKind::Suggestion,
            Priority::Medium,
            "Hydration Tip",
            "Try to drink 8 glasses of water today for optimal health.",
        )
        .with_action("Set Water Goal"),
    ]
}

/// Rule-based advice from today's metrics. Never empty.
pub fn fallback_insights(record: &MetricsRecord) -> Vec<Insight> {
    let mut insights = Vec::new();

    if record.steps < 5_000 {
        insights.push(
            Insight::new(
                "1",
                InsightKind::Suggestion,
                Priority::Medium,
                "Increase Your Steps",
                "Try to reach 10,000 steps today for better cardiovascular health. \
                 A walk at lunch or taking the stairs adds up quickly.",
            )
            .with_action("Set Step Goal"),
        );
    } else if record.steps >= 10_000 {
        insights.push(Insight::new(
            "2",
            InsightKind::Achievement,
            Priority::Low,
            "Great Job on Steps!",
            "You've reached your daily step goal. Keep up the excellent work.",
        ));
    }

    if record.water_intake < 6 {
        insights.push(
            Insight::new(
                "3",
                InsightKind::Recommendation,
                Priority::High,
                "Stay Hydrated",
                "Aim for 8 glasses of water daily. Dehydration can affect your energy and focus.",
            )
            .with_action("Set Water Goal"),
        );
    }

    if record.sleep_hours < 7 {
        insights.push(
            Insight::new(
                "4",
                InsightKind::Warning,
                Priority::High,
                "Sleep Better",
                "Adults need 7-9 hours of sleep. A consistent bedtime routine helps.",
            )
            .with_action("Set Sleep Goal"),
        );
    }

    if insights.is_empty() {
        return default_insights();
    }
    insights
}

/// Short goal ideas based on what today's metrics are missing.
pub fn suggest_goals(record: &MetricsRecord) -> Vec<String> {
    let mut suggestions = Vec::new();

    if record.steps < 8_000 {
        let more = 10_000u64.saturating_sub(record.steps).max(2_000);
        suggestions.push(format!("Walk {more} more steps today"));
    }
    if record.water_intake < 8 {
        suggestions.push(format!(
            "Drink {} more glasses of water",
            8 - record.water_intake
        ));
    }
    if record.sleep_hours < 7 {
        suggestions.push("Aim for 8 hours of sleep tonight".to_string());
    }

    if suggestions.is_empty() {
        return vec![
            "Walk 10,000 steps today".to_string(),
            "Drink 8 glasses of water".to_string(),
            "Get 8 hours of sleep".to_string(),
        ];
    }
    suggestions
}

const GOAL_SUGGESTION_MAX_TOKENS: u32 = 200;

/// OpenAI-compatible chat completions provider.
pub struct ChatCompletionsProvider {
    api_base: String,
    model: String,
    api_key: String,
    temperature: f64,
    max_tokens: u32,
    http_client: Client,
}

impl ChatCompletionsProvider {
    /// Build from config, reading the API key from the configured env var.
    ///
    /// # Errors
    /// Returns [`InsightError::Unavailable`] when insights are disabled or the
    /// key is not set.
    pub fn from_config(config: &InsightsConfig) -> Result<Self, InsightError> {
        if !config.enabled {
            return Err(InsightError::Unavailable("insights disabled".into()));
        }
        let api_key = std::env::var(&config.api_key_env)
            .ok()
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| InsightError::Unavailable(format!("{} not set", config.api_key_env)))?;
        Ok(Self::new(config, api_key))
    }

    /// One chat completion round trip. Returns the assistant message text.
    async fn complete(
        &self,
        system: &str,
        user: String,
        max_tokens: u32,
    ) -> Result<String, InsightError> {
        let body = json!({
            "model": &self.model,
            "messages": [
                { "role": "system", "content": system },
                { "role": "user", "content": user }
            ],
            "temperature": self.temperature,
            "max_tokens": max_tokens,
        });

        let resp: serde_json::Value = self
            .http_client
            .post(format!("{}/chat/completions", self.api_base))
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        resp["choices"][0]["message"]["content"]
            .as_str()
            .map(str::to_string)
            .ok_or_else(|| InsightError::Malformed("no message content".into()))
    }

    pub fn new(config: &InsightsConfig, api_key: String) -> Self {
        Self {
            api_base: config.api_base.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            api_key,
            temperature: config.temperature,
            max_tokens: config.max_tokens,
            http_client: Client::new(),
        }
    }
}

#[async_trait]
impl InsightProvider for ChatCompletionsProvider {
    async fn generate(
        &self,
        record: &MetricsRecord,
        goals: &[Goal],
    ) -> Result<Vec<Insight>, InsightError> {
        let content = self
            .complete(
                "You are a health and wellness assistant. Give encouraging, \
                 practical advice and answer only with JSON.",
                build_prompt(record, goals),
                self.max_tokens,
            )
            .await?;
        parse_insights(&content)
    }

    async fn goal_suggestions(&self, record: &MetricsRecord) -> Result<Vec<String>, InsightError> {
        let content = self
            .complete(
                "You are a health coach. Suggest specific, achievable health goals.",
                build_goal_prompt(record),
                GOAL_SUGGESTION_MAX_TOKENS,
            )
            .await?;
        parse_goal_suggestions(&content)
    }
}

/// Prompt describing today's metrics and goal progress.
pub fn build_prompt(record: &MetricsRecord, goals: &[Goal]) -> String {
    let goal_lines = if goals.is_empty() {
        "none".to_string()
    } else {
        goals
            .iter()
            .map(|g| format!("{}: {}/{}", g.goal_type, g.current, g.target))
            .collect::<Vec<_>>()
            .join(", ")
    };

    format!(
        "Today's health data:\n\
         - Steps: {steps}\n\
         - Water intake: {water} glasses\n\
         - Sleep: {sleep} hours\n\
         - Calories: {calories}\n\
         Active goals: {goal_lines}\n\n\
         Reply with a JSON array of 3 insights. Each element has the fields \
         id (string), type (recommendation|warning|achievement|suggestion), \
         title, message, priority (low|medium|high), actionable (boolean) and \
         optionally actionText. Celebrate achievements, give actionable advice \
         and relate it to the goals above.",
        steps = record.steps,
        water = record.water_intake,
        sleep = record.sleep_hours,
        calories = record.calories,
    )
}

/// Prompt asking for three goals as a JSON array of strings.
pub fn build_goal_prompt(record: &MetricsRecord) -> String {
    format!(
        "Based on this health data, suggest 3 specific daily goals:\n\
         - Steps: {steps}\n\
         - Water: {water} glasses\n\
         - Sleep: {sleep} hours\n\n\
         Reply only with a JSON array of strings, for example [\"Goal 1\", \"Goal 2\", \"Goal 3\"].",
        steps = record.steps,
        water = record.water_intake,
        sleep = record.sleep_hours,
    )
}

fn strip_code_fence(content: &str) -> &str {
    let trimmed = content.trim();
    trimmed
        .strip_prefix("```json")
        .or_else(|| trimmed.strip_prefix("```"))
        .and_then(|rest| rest.strip_suffix("```"))
        .unwrap_or(trimmed)
        .trim()
}

/// Parse generator output into goal strings.
///
/// # Errors
/// Returns [`InsightError::Malformed`] unless the content is a JSON array of
/// non-blank strings.
pub fn parse_goal_suggestions(content: &str) -> Result<Vec<String>, InsightError> {
    let goals: Vec<String> = serde_json::from_str(strip_code_fence(content))
        .map_err(|e| InsightError::Malformed(e.to_string()))?;
    if goals.iter().any(|g| g.trim().is_empty()) {
        return Err(InsightError::Malformed("blank goal suggestion".into()));
    }
    Ok(goals.into_iter().map(|g| g.trim().to_string()).collect())
}

/// Parse generator output into insights, tolerating a Markdown code fence.
///
/// # Errors
/// Returns [`InsightError::Malformed`] unless the content is a JSON array of
/// well-formed insight objects.
pub fn parse_insights(content: &str) -> Result<Vec<Insight>, InsightError> {
    serde_json::from_str::<Vec<Insight>>(strip_code_fence(content))
        .map_err(|e| InsightError::Malformed(e.to_string()))
}
