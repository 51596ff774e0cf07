use super::auth::User;
use super::{ApiClient, ApiError, ApiResult};
use crate::validate;
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize)]
pub struct UpdateProfileRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ChangePasswordRequest {
    pub current_password: String,
    pub new_password: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct PhotoUpload {
    pub url: String,
    #[serde(default)]
    pub public_id: String,
    #[serde(default)]
    pub secure_url: String,
}

pub struct UsersApi {
    client: ApiClient,
}

impl UsersApi {
    pub fn new() -> Self {
        Self {
            client: ApiClient::new(),
        }
    }

    pub fn with_client(client: ApiClient) -> Self {
        Self { client }
    }

    pub async fn update_profile(
        &self,
        token: &str,
        request: &UpdateProfileRequest,
    ) -> ApiResult<User> {
        if let Some(username) = &request.username {
            validate::username(username).map_err(ApiError::Validation)?;
        }
        if let Some(email) = &request.email {
            validate::email(email).map_err(ApiError::Validation)?;
        }
        if let Some(bio) = &request.bio {
            validate::bio(bio).map_err(ApiError::Validation)?;
        }
        self.client
            .put("/api/v1/users/profile", request, Some(token))
            .await
    }

    pub async fn change_password(
        &self,
        token: &str,
        current_password: &str,
        new_password: &str,
    ) -> ApiResult<()> {
        validate::password(new_password).map_err(ApiError::Validation)?;
        let request = ChangePasswordRequest {
            current_password: current_password.to_string(),
            new_password: new_password.to_string(),
        };
        self.client
            .put_ack("/api/v1/users/password", &request, Some(token))
            .await
    }

    pub async fn upload_photo(
        &self,
        token: &str,
        filename: &str,
        bytes: Vec<u8>,
        mime: &str,
    ) -> ApiResult<PhotoUpload> {
        validate::photo(bytes.len(), mime).map_err(ApiError::Validation)?;
        self.client
            .post_multipart("/api/v1/users/profile/photo", "photo", filename, bytes, mime, Some(token))
            .await
    }

    pub async fn delete_account(&self, token: &str, password: &str) -> ApiResult<()> {
        let request = serde_json::json!({ "password": password });
        self.client
            .delete_with_body("/api/v1/users/account", &request, Some(token))
            .await
    }
}

impl Default for UsersApi {
    fn default() -> Self {
        Self::new()
    }
}
