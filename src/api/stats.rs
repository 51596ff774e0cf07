use super::{ApiClient, ApiResult};
use serde::Deserialize;

#[derive(Debug, Deserialize, Clone, Default)]
pub struct DashboardStats {
    pub total_activities: i64,
    pub total_hours: f64,
    pub total_expenses: i64,
    pub active_habits: i64,
    pub completed_habits: i64,
    pub avg_daily_hours: f64,
    pub streak_days: i64,
    pub this_week_hours: f64,
    pub last_week_hours: f64,
    pub hours_growth_percent: f64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ChartPoint {
    pub date: String,
    pub hours: f64,
    pub activities: i64,
    pub expenses: i64,
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct ActivityChart {
    pub labels: Vec<String>,
    pub data: Vec<ChartPoint>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct CategoryStats {
    pub category: String,
    pub count: i64,
    pub total_hours: f64,
    pub percentage: f64,
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct ActivitySummary {
    pub period: String,
    pub total_activities: i64,
    pub total_hours: f64,
    pub total_expenses: i64,
    pub avg_duration_mins: f64,
    #[serde(default)]
    pub most_productive_day: String,
    #[serde(default)]
    pub top_categories: Vec<CategoryStats>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct HabitProgressDetail {
    pub habit_id: i64,
    pub title: String,
    pub start_date: String,
    pub end_date: String,
    pub total_days: i64,
    pub completed_days: i64,
    pub success_rate: f64,
    pub current_streak: i64,
    /// "active", "completed" or "upcoming".
    pub status: String,
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct HabitProgress {
    pub total_habits: i64,
    pub active_habits: i64,
    pub completed_habits: i64,
    pub overall_success_rate: f64,
    #[serde(default)]
    pub habit_details: Vec<HabitProgressDetail>,
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct ExpenseDay {
    #[serde(default)]
    pub date: String,
    pub amount: i64,
    pub count: i64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ExpenseCategory {
    pub category: String,
    pub amount: i64,
    pub count: i64,
    pub percentage: f64,
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct ExpenseReport {
    pub period: String,
    pub total_expenses: i64,
    pub average_daily: f64,
    #[serde(default)]
    pub highest_day: ExpenseDay,
    #[serde(default)]
    pub expenses_by_category: Vec<ExpenseCategory>,
    #[serde(default)]
    pub daily_breakdown: Vec<ExpenseDay>,
}

pub struct StatsApi {
    client: ApiClient,
}

impl StatsApi {
    pub fn new() -> Self {
        Self {
            client: ApiClient::new(),
        }
    }

    pub fn with_client(client: ApiClient) -> Self {
        Self { client }
    }

    pub async fn dashboard(&self, token: &str) -> ApiResult<DashboardStats> {
        self.client.get("/api/v1/stats/dashboard", Some(token)).await
    }

    pub async fn activity_chart(
        &self,
        token: &str,
        kind: &str,
        period_days: i64,
    ) -> ApiResult<ActivityChart> {
        let endpoint = format!(
            "/api/v1/stats/activities/chart?type={}&period={}",
            kind, period_days
        );
        self.client.get(&endpoint, Some(token)).await
    }

    pub async fn activity_summary(
        &self,
        token: &str,
        start_date: Option<&str>,
        end_date: Option<&str>,
    ) -> ApiResult<ActivitySummary> {
        let endpoint = match (start_date, end_date) {
            (Some(start), Some(end)) => format!(
                "/api/v1/stats/activities/summary?start_date={}&end_date={}",
                start, end
            ),
            _ => "/api/v1/stats/activities/summary".to_string(),
        };
        self.client.get(&endpoint, Some(token)).await
    }

    pub async fn habit_progress(&self, token: &str) -> ApiResult<HabitProgress> {
        self.client.get("/api/v1/stats/habits/progress", Some(token)).await
    }

    pub async fn expense_report(&self, token: &str) -> ApiResult<ExpenseReport> {
        self.client.get("/api/v1/stats/expenses/report", Some(token)).await
    }
}

impl Default for StatsApi {
    fn default() -> Self {
        Self::new()
    }
}
