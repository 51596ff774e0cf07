use super::users::PhotoUpload;
use super::{ApiClient, ApiError, ApiResult};
use crate::validate;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize, Clone)]
pub struct Activity {
    pub id: i64,
    pub user_id: i64,
    pub title: String,
    pub start_time: DateTime<Utc>,
    pub duration_mins: i64,
    pub cost: Option<i64>,
    #[serde(default)]
    pub photo_url: String,
    #[serde(default)]
    pub note: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
pub struct ActivityPage {
    pub activities: Vec<Activity>,
    pub total: i64,
    pub page: i64,
    pub limit: i64,
}

#[derive(Debug, Serialize, Clone)]
pub struct CreateActivityRequest {
    pub title: String,
    /// RFC 3339, e.g. "2025-01-01T06:00:00Z".
    pub start_time: String,
    pub duration_mins: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cost: Option<i64>,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub note: String,
}

#[derive(Debug, Serialize, Clone)]
pub struct UpdateActivityRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_time: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration_mins: Option<i64>,
    /// Outer `None` leaves the cost untouched; `Some(None)` sends an
    /// explicit null so an existing cost can be cleared.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cost: Option<Option<i64>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

pub struct ActivitiesApi {
    client: ApiClient,
}

impl ActivitiesApi {
    pub fn new() -> Self {
        Self {
            client: ApiClient::new(),
        }
    }

    pub fn with_client(client: ApiClient) -> Self {
        Self { client }
    }

    pub async fn list(&self, token: &str, page: i64, limit: i64) -> ApiResult<ActivityPage> {
        let endpoint = format!("/api/v1/activities?page={}&limit={}", page, limit);
        self.client.get(&endpoint, Some(token)).await
    }

    pub async fn get(&self, token: &str, id: i64) -> ApiResult<Activity> {
        let endpoint = format!("/api/v1/activities/{}", id);
        self.client.get(&endpoint, Some(token)).await
    }

    pub async fn create(&self, token: &str, request: &CreateActivityRequest) -> ApiResult<Activity> {
        validate::activity_title(&request.title).map_err(ApiError::Validation)?;
        validate::duration_mins(request.duration_mins).map_err(ApiError::Validation)?;
        self.client
            .post("/api/v1/activities", request, Some(token))
            .await
    }

    pub async fn update(
        &self,
        token: &str,
        id: i64,
        request: &UpdateActivityRequest,
    ) -> ApiResult<Activity> {
        if let Some(title) = &request.title {
            validate::activity_title(title).map_err(ApiError::Validation)?;
        }
        if let Some(duration) = request.duration_mins {
            validate::duration_mins(duration).map_err(ApiError::Validation)?;
        }
        let endpoint = format!("/api/v1/activities/{}", id);
        self.client.put(&endpoint, request, Some(token)).await
    }

    pub async fn delete(&self, token: &str, id: i64) -> ApiResult<()> {
        let endpoint = format!("/api/v1/activities/{}", id);
        self.client.delete(&endpoint, Some(token)).await
    }

    pub async fn upload_photo(
        &self,
        token: &str,
        id: i64,
        filename: &str,
        bytes: Vec<u8>,
        mime: &str,
    ) -> ApiResult<PhotoUpload> {
        validate::photo(bytes.len(), mime).map_err(ApiError::Validation)?;
        let endpoint = format!("/api/v1/activities/{}/photo", id);
        self.client
            .post_multipart(&endpoint, "photo", filename, bytes, mime, Some(token))
            .await
    }
}

impl Default for ActivitiesApi {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn update_request_distinguishes_clearing_a_cost_from_leaving_it() {
        let untouched = UpdateActivityRequest {
            title: None,
            start_time: None,
            duration_mins: None,
            cost: None,
            note: None,
        };
        let json = serde_json::to_value(&untouched).unwrap();
        assert!(json.get("cost").is_none());

        let cleared = UpdateActivityRequest {
            cost: Some(None),
            ..untouched
        };
        let json = serde_json::to_value(&cleared).unwrap();
        assert!(json["cost"].is_null());

        let set = UpdateActivityRequest {
            title: None,
            start_time: None,
            duration_mins: None,
            cost: Some(Some(15_000)),
            note: None,
        };
        let json = serde_json::to_value(&set).unwrap();
        assert_eq!(json["cost"], 15_000);
    }
}
