use super::{ApiConfig, ApiError, ApiResult, Envelope, resolve_endpoint};
use reqwest::header::CONTENT_TYPE;
use reqwest::{Client, Method, RequestBuilder, Response};
use serde::{Serialize, de::DeserializeOwned};

/// Single choke point for all gateway traffic. Resolves logical endpoint
/// paths against the domain-prefix table, attaches bearer credentials,
/// and normalizes every failure into an [`ApiError`]. Never retries.
#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    config: ApiConfig,
}

impl ApiClient {
    pub fn new() -> Self {
        Self {
            client: Client::new(),
            config: ApiConfig::default(),
        }
    }

    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            config: ApiConfig {
                base_url: base_url.into(),
            },
        }
    }

    pub fn base_url(&self) -> &str {
        &self.config.base_url
    }

    fn begin(&self, method: Method, endpoint: &str, token: Option<&str>) -> RequestBuilder {
        let url = format!("{}{}", self.config.base_url, resolve_endpoint(endpoint));
        let mut request = self.client.request(method, &url);
        if let Some(token) = token {
            request = request.header("Authorization", format!("Bearer {}", token));
        }
        request
    }

    async fn send(request: RequestBuilder) -> ApiResult<Response> {
        request.send().await.map_err(|e| {
            ApiError::NetworkUnavailable(format!(
                "{} - make sure the DailyTrackr gateway is running",
                e
            ))
        })
    }

    async fn handle_response<T: DeserializeOwned>(response: Response) -> ApiResult<T> {
        let status = response.status().as_u16();
        let is_json = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(|v| v.contains("application/json"))
            .unwrap_or(false);

        let text = response
            .text()
            .await
            .map_err(|e| ApiError::NetworkUnavailable(format!("Failed to read response body: {}", e)))?;

        // A non-JSON body (an HTML error page, usually) never bubbles up
        // as a parse error; it becomes a synthesized failure instead.
        if !is_json {
            return Err(ApiError::RequestFailed {
                status,
                message: format!("Service not available ({})", status),
                body: Some(serde_json::json!({ "success": false, "error": text })),
            });
        }

        if (200..300).contains(&status) {
            let envelope: Envelope<T> = serde_json::from_str(&text).map_err(|e| {
                ApiError::RequestFailed {
                    status,
                    message: format!("Unexpected response shape: {}", e),
                    body: serde_json::from_str(&text).ok(),
                }
            })?;
            envelope.into_data(status)
        } else {
            let body: serde_json::Value = serde_json::from_str(&text)
                .unwrap_or_else(|_| serde_json::json!({ "success": false }));
            let message = body
                .get("message")
                .and_then(|m| m.as_str())
                .unwrap_or("Request failed")
                .to_string();
            Err(ApiError::RequestFailed {
                status,
                message,
                body: Some(body),
            })
        }
    }

    /// Like `handle_response`, but tolerates an envelope with no `data`
    /// payload. Deletes and other acknowledgement-only responses use it.
    async fn handle_ack(response: Response) -> ApiResult<()> {
        let status = response.status().as_u16();
        let is_json = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(|v| v.contains("application/json"))
            .unwrap_or(false);

        let text = response
            .text()
            .await
            .map_err(|e| ApiError::NetworkUnavailable(format!("Failed to read response body: {}", e)))?;

        if !is_json {
            return Err(ApiError::RequestFailed {
                status,
                message: format!("Service not available ({})", status),
                body: Some(serde_json::json!({ "success": false, "error": text })),
            });
        }

        if (200..300).contains(&status) {
            Ok(())
        } else {
            let body: serde_json::Value = serde_json::from_str(&text)
                .unwrap_or_else(|_| serde_json::json!({ "success": false }));
            let message = body
                .get("message")
                .and_then(|m| m.as_str())
                .unwrap_or("Request failed")
                .to_string();
            Err(ApiError::RequestFailed {
                status,
                message,
                body: Some(body),
            })
        }
    }

    pub async fn get<T: DeserializeOwned>(&self, endpoint: &str, token: Option<&str>) -> ApiResult<T> {
        let response = Self::send(self.begin(Method::GET, endpoint, token)).await?;
        Self::handle_response(response).await
    }

    pub async fn post<T: DeserializeOwned, R: Serialize>(
        &self,
        endpoint: &str,
        body: &R,
        token: Option<&str>,
    ) -> ApiResult<T> {
        let request = self.begin(Method::POST, endpoint, token).json(body);
        let response = Self::send(request).await?;
        Self::handle_response(response).await
    }

    /// POST with no request body; the AI generation endpoints take their
    /// parameters in the query string.
    pub async fn post_empty<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        token: Option<&str>,
    ) -> ApiResult<T> {
        let request = self
            .begin(Method::POST, endpoint, token)
            .header(CONTENT_TYPE, "application/json");
        let response = Self::send(request).await?;
        Self::handle_response(response).await
    }

    pub async fn put<T: DeserializeOwned, R: Serialize>(
        &self,
        endpoint: &str,
        body: &R,
        token: Option<&str>,
    ) -> ApiResult<T> {
        let request = self.begin(Method::PUT, endpoint, token).json(body);
        let response = Self::send(request).await?;
        Self::handle_response(response).await
    }

    /// PUT whose response is an acknowledgement envelope with no payload.
    pub async fn put_ack<R: Serialize>(
        &self,
        endpoint: &str,
        body: &R,
        token: Option<&str>,
    ) -> ApiResult<()> {
        let request = self.begin(Method::PUT, endpoint, token).json(body);
        let response = Self::send(request).await?;
        Self::handle_ack(response).await
    }

    pub async fn delete(&self, endpoint: &str, token: Option<&str>) -> ApiResult<()> {
        let response = Self::send(self.begin(Method::DELETE, endpoint, token)).await?;
        Self::handle_ack(response).await
    }

    /// DELETE carrying a JSON body (account deletion confirms with the
    /// password this way).
    pub async fn delete_with_body<R: Serialize>(
        &self,
        endpoint: &str,
        body: &R,
        token: Option<&str>,
    ) -> ApiResult<()> {
        let request = self.begin(Method::DELETE, endpoint, token).json(body);
        let response = Self::send(request).await?;
        Self::handle_ack(response).await
    }

    /// Multipart upload. Content-Type is left to reqwest so the boundary
    /// is set correctly; the JSON default must not be attached here.
    pub async fn post_multipart<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        field: &str,
        filename: &str,
        bytes: Vec<u8>,
        mime: &str,
        token: Option<&str>,
    ) -> ApiResult<T> {
        let part = reqwest::multipart::Part::bytes(bytes)
            .file_name(filename.to_string())
            .mime_str(mime)
            .map_err(|e| ApiError::Validation(format!("Invalid MIME type {}: {}", mime, e)))?;
        let form = reqwest::multipart::Form::new().part(field.to_string(), part);

        let request = self.begin(Method::POST, endpoint, token).multipart(form);
        let response = Self::send(request).await?;
        Self::handle_response(response).await
    }
}

impl Default for ApiClient {
    fn default() -> Self {
        Self::new()
    }
}
