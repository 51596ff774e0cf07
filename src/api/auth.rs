use super::{ApiClient, ApiResult};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub email: String,
    #[serde(default)]
    pub bio: String,
    #[serde(default)]
    pub profile_photo: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Token plus the user record it belongs to, as returned by both login
/// and register.
#[derive(Debug, Deserialize, Clone)]
pub struct AuthPayload {
    pub token: String,
    pub user: User,
}

pub struct AuthApi {
    client: ApiClient,
}

impl AuthApi {
    pub fn new() -> Self {
        Self {
            client: ApiClient::new(),
        }
    }

    pub fn with_client(client: ApiClient) -> Self {
        Self { client }
    }

    pub async fn login(&self, email: &str, password: &str) -> ApiResult<AuthPayload> {
        let request = LoginRequest {
            email: email.to_string(),
            password: password.to_string(),
        };
        self.client.post("/auth/login", &request, None).await
    }

    pub async fn register(
        &self,
        username: &str,
        email: &str,
        password: &str,
    ) -> ApiResult<AuthPayload> {
        let request = RegisterRequest {
            username: username.to_string(),
            email: email.to_string(),
            password: password.to_string(),
        };
        self.client.post("/auth/register", &request, None).await
    }

    pub async fn get_profile(&self, token: &str) -> ApiResult<User> {
        self.client.get("/api/v1/users/profile", Some(token)).await
    }
}

impl Default for AuthApi {
    fn default() -> Self {
        Self::new()
    }
}
