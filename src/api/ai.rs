use super::{ApiClient, ApiResult};
use chrono::{DateTime, Utc};
use serde::Deserialize;

#[derive(Debug, Deserialize, Clone)]
pub struct DailySummary {
    pub id: i64,
    pub user_id: i64,
    pub date: DateTime<Utc>,
    pub summary_text: String,
    pub ai_generated: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct HabitRecommendation {
    pub recommendation: String,
    pub based_on_days: i64,
    pub total_activities: i64,
    pub existing_habits: i64,
    pub analysis_period: String,
    pub generated_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct Insights {
    pub user_id: i64,
    pub total_activities: i64,
    pub total_hours: f64,
    pub total_expenses: i64,
    pub active_habits: i64,
    pub avg_daily_hours: f64,
    #[serde(default)]
    pub most_productive_time: String,
    #[serde(default)]
    pub top_activity_type: String,
    #[serde(default)]
    pub spending_pattern: String,
    #[serde(default)]
    pub ai_insights: String,
    #[serde(default)]
    pub last_updated: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ActivityAnalysis {
    pub analysis: String,
    pub period_days: i64,
    pub activities_count: i64,
    pub period: String,
    pub generated_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ProductivityTips {
    pub tips: String,
    pub personalized: bool,
    pub based_on: String,
    pub generated_at: DateTime<Utc>,
}

pub struct AiApi {
    client: ApiClient,
}

impl AiApi {
    pub fn new() -> Self {
        Self {
            client: ApiClient::new(),
        }
    }

    pub fn with_client(client: ApiClient) -> Self {
        Self { client }
    }

    /// Generation is idempotent per day on the backend; a cached summary
    /// comes back when one already exists for the date.
    pub async fn daily_summary(&self, token: &str, date: Option<&str>) -> ApiResult<DailySummary> {
        let endpoint = match date {
            Some(date) => format!("/api/v1/ai/daily-summary?date={}", date),
            None => "/api/v1/ai/daily-summary".to_string(),
        };
        self.client.post_empty(&endpoint, Some(token)).await
    }

    pub async fn habit_recommendation(&self, token: &str) -> ApiResult<HabitRecommendation> {
        self.client
            .post_empty("/api/v1/ai/habit-recommendation", Some(token))
            .await
    }

    pub async fn insights(&self, token: &str) -> ApiResult<Insights> {
        self.client.get("/api/v1/ai/insights", Some(token)).await
    }

    pub async fn analyze_activities(&self, token: &str, days: i64) -> ApiResult<ActivityAnalysis> {
        let endpoint = format!("/api/v1/ai/analyze-activities?days={}", days);
        self.client.get(&endpoint, Some(token)).await
    }

    pub async fn productivity_tips(&self, token: &str) -> ApiResult<ProductivityTips> {
        self.client.get("/api/v1/ai/productivity-tips", Some(token)).await
    }
}

impl Default for AiApi {
    fn default() -> Self {
        Self::new()
    }
}
