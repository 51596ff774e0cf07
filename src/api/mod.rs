pub mod client;
pub mod auth;
pub mod users;
pub mod activities;
pub mod habits;
pub mod stats;
pub mod ai;

use serde::Deserialize;
use std::fmt;

#[derive(Debug, Clone)]
pub enum ApiError {
    /// No response reached the client at all (connection refused, DNS,
    /// timeout). Carries status code 0.
    NetworkUnavailable(String),
    /// The gateway answered with a non-success status, or with a body
    /// that could not be interpreted.
    RequestFailed {
        status: u16,
        message: String,
        body: Option<serde_json::Value>,
    },
    /// Client-side form validation. Never reaches the network.
    Validation(String),
}

impl ApiError {
    pub fn status(&self) -> u16 {
        match self {
            ApiError::NetworkUnavailable(_) => 0,
            ApiError::RequestFailed { status, .. } => *status,
            ApiError::Validation(_) => 0,
        }
    }

    pub fn is_network_unavailable(&self) -> bool {
        matches!(self, ApiError::NetworkUnavailable(_))
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::NetworkUnavailable(msg) => write!(f, "Gateway unreachable: {}", msg),
            ApiError::RequestFailed { status, message, .. } => {
                write!(f, "Request failed (HTTP {}): {}", status, message)
            }
            ApiError::Validation(msg) => write!(f, "{}", msg),
        }
    }
}

impl std::error::Error for ApiError {}

impl From<reqwest::Error> for ApiError {
    fn from(error: reqwest::Error) -> Self {
        ApiError::NetworkUnavailable(format!(
            "{} - make sure the DailyTrackr gateway is running",
            error
        ))
    }
}

pub type ApiResult<T> = Result<T, ApiError>;

/// The `{ success, message, data }` shape every gateway response uses.
#[derive(Debug, Deserialize)]
pub struct Envelope<T> {
    pub success: bool,
    #[serde(default)]
    pub message: String,
    pub data: Option<T>,
}

impl<T> Envelope<T> {
    /// Unwraps the payload, treating a missing `data` field as a failed
    /// request even when the HTTP status said otherwise.
    pub fn into_data(self, status: u16) -> ApiResult<T> {
        self.data.ok_or(ApiError::RequestFailed {
            status,
            message: if self.message.is_empty() {
                "Response carried no data".to_string()
            } else {
                self.message
            },
            body: None,
        })
    }
}

#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub base_url: String,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: std::env::var("DAILYTRACKR_GATEWAY_URL")
                .unwrap_or_else(|_| "http://localhost:3000".to_string()),
        }
    }
}

/// Gateway routing table. Each domain family of logical paths is mounted
/// behind its own reverse-proxy segment; `/auth/*` is served by the
/// gateway at the root, so it maps to the empty segment.
const DOMAIN_PREFIXES: &[(&str, &str)] = &[
    ("/auth", ""),
    ("/api/v1/users", "/api/users"),
    ("/api/v1/activities", "/api/activities"),
    ("/api/v1/habits", "/api/habits"),
    ("/api/v1/habit-logs", "/api/habits"),
    ("/api/v1/stats", "/api/stats"),
    ("/api/v1/ai", "/api/ai"),
];

/// Rewrites a logical endpoint path to the path the gateway actually
/// routes: the matched domain segment prepended to the original path.
/// Paths outside the table pass through unchanged.
pub fn resolve_endpoint(path: &str) -> String {
    for (prefix, segment) in DOMAIN_PREFIXES {
        if path.starts_with(prefix) {
            return format!("{}{}", segment, path);
        }
    }
    path.to_string()
}

pub use client::ApiClient;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn activities_paths_gain_activities_segment() {
        assert_eq!(
            resolve_endpoint("/api/v1/activities"),
            "/api/activities/api/v1/activities"
        );
        assert_eq!(
            resolve_endpoint("/api/v1/activities/42/photo"),
            "/api/activities/api/v1/activities/42/photo"
        );
    }

    #[test]
    fn habit_and_habit_log_paths_share_the_habits_segment() {
        assert_eq!(resolve_endpoint("/api/v1/habits"), "/api/habits/api/v1/habits");
        assert_eq!(
            resolve_endpoint("/api/v1/habits/7/logs"),
            "/api/habits/api/v1/habits/7/logs"
        );
        assert_eq!(
            resolve_endpoint("/api/v1/habit-logs/3"),
            "/api/habits/api/v1/habit-logs/3"
        );
    }

    #[test]
    fn users_stats_and_ai_paths_resolve() {
        assert_eq!(
            resolve_endpoint("/api/v1/users/profile"),
            "/api/users/api/v1/users/profile"
        );
        assert_eq!(
            resolve_endpoint("/api/v1/stats/dashboard"),
            "/api/stats/api/v1/stats/dashboard"
        );
        assert_eq!(
            resolve_endpoint("/api/v1/ai/insights"),
            "/api/ai/api/v1/ai/insights"
        );
    }

    #[test]
    fn auth_paths_pass_through_to_the_gateway_root() {
        assert_eq!(resolve_endpoint("/auth/login"), "/auth/login");
        assert_eq!(resolve_endpoint("/auth/register"), "/auth/register");
    }

    #[test]
    fn unknown_paths_pass_through_unchanged() {
        assert_eq!(resolve_endpoint("/health"), "/health");
        assert_eq!(resolve_endpoint("/debug/routes"), "/debug/routes");
    }

    #[test]
    fn envelope_without_data_is_a_failure() {
        let envelope: Envelope<i64> = serde_json::from_str(
            r#"{"success": false, "message": "Habit not found"}"#,
        )
        .unwrap();
        let err = envelope.into_data(404).unwrap_err();
        match err {
            ApiError::RequestFailed { status, message, .. } => {
                assert_eq!(status, 404);
                assert_eq!(message, "Habit not found");
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }
}
