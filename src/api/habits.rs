use super::{ApiClient, ApiError, ApiResult};
use crate::validate;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum HabitStatus {
    Done,
    Skipped,
    Failed,
}

impl HabitStatus {
    pub const ALL: [HabitStatus; 3] = [HabitStatus::Done, HabitStatus::Skipped, HabitStatus::Failed];
}

impl fmt::Display for HabitStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HabitStatus::Done => write!(f, "Done"),
            HabitStatus::Skipped => write!(f, "Skipped"),
            HabitStatus::Failed => write!(f, "Failed"),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct Habit {
    pub id: i64,
    pub user_id: i64,
    pub title: String,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    #[serde(default)]
    pub reminder_time: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct HabitLog {
    pub id: i64,
    pub habit_id: i64,
    pub date: DateTime<Utc>,
    pub status: HabitStatus,
    #[serde(default)]
    pub photo_url: String,
    #[serde(default)]
    pub note: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct HabitStats {
    pub total_days: i64,
    pub completed_days: i64,
    pub skipped_days: i64,
    pub failed_days: i64,
    pub success_rate: f64,
    pub current_streak: i64,
    pub longest_streak: i64,
}

/// Habit, its log history, and computed stats in one payload.
#[derive(Debug, Deserialize, Clone)]
pub struct HabitWithLogs {
    pub habit: Habit,
    pub logs: Vec<HabitLog>,
    pub stats: HabitStats,
}

#[derive(Debug, Serialize, Clone)]
pub struct CreateHabitRequest {
    pub title: String,
    /// "YYYY-MM-DD".
    pub start_date: String,
    /// "YYYY-MM-DD"; must be strictly after `start_date`.
    pub end_date: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub reminder_time: String,
}

#[derive(Debug, Serialize, Clone)]
pub struct UpdateHabitRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reminder_time: Option<String>,
}

#[derive(Debug, Serialize, Clone)]
pub struct CreateHabitLogRequest {
    pub habit_id: i64,
    /// "YYYY-MM-DD".
    pub date: String,
    pub status: HabitStatus,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub note: String,
}

pub struct HabitsApi {
    client: ApiClient,
}

impl HabitsApi {
    pub fn new() -> Self {
        Self {
            client: ApiClient::new(),
        }
    }

    pub fn with_client(client: ApiClient) -> Self {
        Self { client }
    }

    pub async fn list(&self, token: &str, active_only: bool) -> ApiResult<Vec<Habit>> {
        let endpoint = if active_only {
            "/api/v1/habits?active=true"
        } else {
            "/api/v1/habits"
        };
        self.client.get(endpoint, Some(token)).await
    }

    pub async fn get(&self, token: &str, id: i64) -> ApiResult<Habit> {
        let endpoint = format!("/api/v1/habits/{}", id);
        self.client.get(&endpoint, Some(token)).await
    }

    /// Date ordering is enforced here, before any network call, so a bad
    /// range never leaves the client.
    pub async fn create(&self, token: &str, request: &CreateHabitRequest) -> ApiResult<Habit> {
        validate::habit_title(&request.title).map_err(ApiError::Validation)?;
        validate::habit_dates(&request.start_date, &request.end_date)
            .map_err(ApiError::Validation)?;
        self.client.post("/api/v1/habits", request, Some(token)).await
    }

    pub async fn update(&self, token: &str, id: i64, request: &UpdateHabitRequest) -> ApiResult<Habit> {
        if let Some(title) = &request.title {
            validate::habit_title(title).map_err(ApiError::Validation)?;
        }
        let endpoint = format!("/api/v1/habits/{}", id);
        self.client.put(&endpoint, request, Some(token)).await
    }

    pub async fn delete(&self, token: &str, id: i64) -> ApiResult<()> {
        let endpoint = format!("/api/v1/habits/{}", id);
        self.client.delete(&endpoint, Some(token)).await
    }

    pub async fn create_log(
        &self,
        token: &str,
        habit_id: i64,
        request: &CreateHabitLogRequest,
    ) -> ApiResult<HabitLog> {
        validate::note(&request.note).map_err(ApiError::Validation)?;
        let endpoint = format!("/api/v1/habits/{}/logs", habit_id);
        self.client.post(&endpoint, request, Some(token)).await
    }

    pub async fn list_logs(&self, token: &str, habit_id: i64) -> ApiResult<Vec<HabitLog>> {
        let endpoint = format!("/api/v1/habits/{}/logs", habit_id);
        self.client.get(&endpoint, Some(token)).await
    }

    pub async fn stats(&self, token: &str, habit_id: i64) -> ApiResult<HabitStats> {
        let endpoint = format!("/api/v1/habits/{}/stats", habit_id);
        self.client.get(&endpoint, Some(token)).await
    }

    pub async fn complete(&self, token: &str, habit_id: i64) -> ApiResult<HabitWithLogs> {
        let endpoint = format!("/api/v1/habits/{}/complete", habit_id);
        self.client.get(&endpoint, Some(token)).await
    }
}

impl Default for HabitsApi {
    fn default() -> Self {
        Self::new()
    }
}
