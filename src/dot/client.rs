//! Dot. open API client
//!
//! Thin bearer-token wrapper around the fixed `/api/authV2/open` endpoints.
//! Every failure is translated into one of the [`DotError`] kinds; nothing is
//! retried here.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Method, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use thiserror::Error;

use crate::config::DotConfig;
use crate::models::{DeviceInfo, DeviceStatus, ImageContent, TextContent};

/// Task list fetched when no type is given
pub const DEFAULT_TASK_TYPE: &str = "loop";

/// Non-auth API failure categories
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiFailure {
    Forbidden,
    NotFound,
    Server(u16),
    InvalidResponse,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DotError {
    #[error("Authentication failed: {0}")]
    Auth(String),

    #[error("API error: {message}")]
    Api { kind: ApiFailure, message: String },

    #[error("Connection error: {0}")]
    Connection(String),
}

impl DotError {
    /// Translate a non-success HTTP status
    pub fn from_status(status: StatusCode) -> Self {
        match status.as_u16() {
            401 => DotError::Auth("Invalid or expired API key".to_string()),
            403 => DotError::Api {
                kind: ApiFailure::Forbidden,
                message: "Forbidden: no permission for this device".to_string(),
            },
            404 => DotError::Api {
                kind: ApiFailure::NotFound,
                message: "Device or resource not found".to_string(),
            },
            code if code >= 500 => DotError::Api {
                kind: ApiFailure::Server(code),
                message: format!("Server error: {}", code),
            },
            code => DotError::Connection(format!("Unexpected response status: {}", code)),
        }
    }

    /// Whether this failure should abort a whole poll cycle
    pub fn is_fatal(&self) -> bool {
        matches!(self, DotError::Auth(_) | DotError::Connection(_))
    }
}

/// Operations the poller, actions and setup flow need from the cloud API
#[async_trait]
pub trait DeviceApi: Send + Sync {
    async fn get_devices(&self) -> Result<Vec<DeviceInfo>, DotError>;

    async fn get_device_status(&self, device_id: &str) -> Result<DeviceStatus, DotError>;

    async fn switch_next_content(&self, device_id: &str) -> Result<serde_json::Value, DotError>;

    async fn list_device_tasks(
        &self,
        device_id: &str,
        task_type: &str,
    ) -> Result<Vec<serde_json::Value>, DotError>;

    async fn send_text(
        &self,
        device_id: &str,
        content: &TextContent,
    ) -> Result<serde_json::Value, DotError>;

    async fn send_image(
        &self,
        device_id: &str,
        content: &ImageContent,
    ) -> Result<serde_json::Value, DotError>;
}

pub struct DotClient {
    http_client: Client,
    base_url: String,
    api_key: String,
}

impl DotClient {
    pub fn new(config: &DotConfig) -> Result<Self, DotError> {
        Self::with_api_key(config, &config.api_key)
    }

    /// Client for a key other than the configured one (setup validation)
    pub fn with_api_key(config: &DotConfig, api_key: &str) -> Result<Self, DotError> {
        let http_client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .connect_timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .map_err(|e| DotError::Connection(format!("HTTP client init failed: {}", e)))?;

        Ok(Self {
            http_client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
        })
    }

    async fn request<B, T>(&self, method: Method, path: &str, body: Option<&B>) -> Result<T, DotError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let url = format!("{}{}", self.base_url, path);

        let mut req = self
            .http_client
            .request(method.clone(), &url)
            .bearer_auth(&self.api_key)
            .header(reqwest::header::CONTENT_TYPE, "application/json");
        if let Some(body) = body {
            req = req.json(body);
        }

        let resp = req.send().await.map_err(|e| {
            tracing::debug!("[DotClient] {} {} failed: {}", method, path, e);
            DotError::Connection(e.to_string())
        })?;

        let status = resp.status();
        if !status.is_success() {
            tracing::debug!("[DotClient] {} {} returned {}", method, path, status);
            return Err(DotError::from_status(status));
        }

        let bytes = resp
            .bytes()
            .await
            .map_err(|e| DotError::Connection(e.to_string()))?;

        serde_json::from_slice(&bytes).map_err(|e| DotError::Api {
            kind: ApiFailure::InvalidResponse,
            message: format!("Unexpected response from {}: {}", path, e),
        })
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, DotError> {
        self.request::<(), T>(Method::GET, path, None).await
    }

    async fn post<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        path: &str,
        body: Option<&B>,
    ) -> Result<T, DotError> {
        self.request(Method::POST, path, body).await
    }
}

#[async_trait]
impl DeviceApi for DotClient {
    async fn get_devices(&self) -> Result<Vec<DeviceInfo>, DotError> {
        self.get("/api/authV2/open/devices").await
    }

    async fn get_device_status(&self, device_id: &str) -> Result<DeviceStatus, DotError> {
        self.get(&format!("/api/authV2/open/device/{}/status", device_id))
            .await
    }

    async fn switch_next_content(&self, device_id: &str) -> Result<serde_json::Value, DotError> {
        self.post::<(), _>(&format!("/api/authV2/open/device/{}/next", device_id), None)
            .await
    }

    async fn list_device_tasks(
        &self,
        device_id: &str,
        task_type: &str,
    ) -> Result<Vec<serde_json::Value>, DotError> {
        self.get(&format!(
            "/api/authV2/open/device/{}/{}/list",
            device_id, task_type
        ))
        .await
    }

    async fn send_text(
        &self,
        device_id: &str,
        content: &TextContent,
    ) -> Result<serde_json::Value, DotError> {
        self.post(
            &format!("/api/authV2/open/device/{}/text", device_id),
            Some(content),
        )
        .await
    }

    async fn send_image(
        &self,
        device_id: &str,
        content: &ImageContent,
    ) -> Result<serde_json::Value, DotError> {
        self.post(
            &format!("/api/authV2/open/device/{}/image", device_id),
            Some(content),
        )
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    use axum::{
        extract::{Path, State},
        http::{HeaderMap, StatusCode},
        routing::{get, post},
        Json, Router,
    };
    use serde_json::{json, Value};

    type Captured = Arc<Mutex<Vec<(String, Option<String>, Value)>>>;

    async fn spawn_stub(router: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        format!("http://{}", addr)
    }

    fn client_for(base_url: &str) -> DotClient {
        let config = DotConfig {
            api_key: "dot_app_test".to_string(),
            base_url: base_url.to_string(),
            request_timeout_secs: 5,
            ..Default::default()
        };
        DotClient::new(&config).unwrap()
    }

    fn status_router(code: u16) -> Router {
        Router::new().route(
            "/api/authV2/open/devices",
            get(move || async move { (StatusCode::from_u16(code).unwrap(), "{}") }),
        )
    }

    #[tokio::test]
    async fn test_status_code_mapping() {
        let cases: [(u16, fn(&DotError) -> bool); 6] = [
            (401, |e| matches!(e, DotError::Auth(_))),
            (403, |e| matches!(e, DotError::Api { kind: ApiFailure::Forbidden, .. })),
            (404, |e| matches!(e, DotError::Api { kind: ApiFailure::NotFound, .. })),
            (500, |e| matches!(e, DotError::Api { kind: ApiFailure::Server(500), .. })),
            (503, |e| matches!(e, DotError::Api { kind: ApiFailure::Server(503), .. })),
            (400, |e| matches!(e, DotError::Connection(_))),
        ];

        for (code, check) in cases {
            let base = spawn_stub(status_router(code)).await;
            let err = client_for(&base).get_devices().await.unwrap_err();
            assert!(check(&err), "status {} mapped to {:?}", code, err);
        }
    }

    #[tokio::test]
    async fn test_unreachable_host_is_connection_error() {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let err = client_for(&format!("http://{}", addr))
            .get_devices()
            .await
            .unwrap_err();
        assert!(matches!(err, DotError::Connection(_)));
        assert!(err.is_fatal());
    }

    #[tokio::test]
    async fn test_malformed_body_is_api_error() {
        let router = Router::new().route(
            "/api/authV2/open/devices",
            get(|| async { Json(json!({ "not": "a list" })) }),
        );
        let base = spawn_stub(router).await;

        let err = client_for(&base).get_devices().await.unwrap_err();
        assert!(matches!(
            err,
            DotError::Api { kind: ApiFailure::InvalidResponse, .. }
        ));
        assert!(!err.is_fatal());
    }

    #[tokio::test]
    async fn test_requests_carry_bearer_and_paths() {
        let captured: Captured = Arc::new(Mutex::new(Vec::new()));

        async fn record(
            State(captured): State<Captured>,
            Path((id, action)): Path<(String, String)>,
            headers: HeaderMap,
            body: Option<Json<Value>>,
        ) -> Json<Value> {
            let auth = headers
                .get("authorization")
                .and_then(|v| v.to_str().ok())
                .map(|s| s.to_string());
            let body = body.map(|Json(v)| v).unwrap_or(Value::Null);
            captured
                .lock()
                .unwrap()
                .push((format!("{}/{}", id, action), auth, body));
            Json(json!({ "code": 200, "message": "ok" }))
        }

        let router = Router::new()
            .route("/api/authV2/open/device/:id/:action", post(record))
            .route(
                "/api/authV2/open/device/:id/loop/list",
                get(|| async { Json(json!([{ "type": "TEXT_API", "key": "k1" }])) }),
            )
            .with_state(captured.clone());
        let base = spawn_stub(router).await;
        let client = client_for(&base);

        client.switch_next_content("DEV1").await.unwrap();
        client
            .send_text(
                "DEV1",
                &TextContent {
                    refresh_now: Some(true),
                    message: Some("hi".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        client
            .send_image(
                "DEV1",
                &ImageContent {
                    image: "aGVsbG8=".to_string(),
                    border: Some(0),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        let tasks = client
            .list_device_tasks("DEV1", DEFAULT_TASK_TYPE)
            .await
            .unwrap();
        assert_eq!(tasks.len(), 1);

        let captured = captured.lock().unwrap();
        assert_eq!(captured.len(), 3);
        assert_eq!(captured[0].0, "DEV1/next");
        assert_eq!(captured[1].0, "DEV1/text");
        assert_eq!(captured[1].2, json!({ "refreshNow": true, "message": "hi" }));
        assert_eq!(captured[2].0, "DEV1/image");
        assert_eq!(captured[2].2, json!({ "image": "aGVsbG8=", "border": 0 }));
        for (_, auth, _) in captured.iter() {
            assert_eq!(auth.as_deref(), Some("Bearer dot_app_test"));
        }
    }

    #[tokio::test]
    async fn test_device_list_and_status_parse() {
        let router = Router::new()
            .route(
                "/api/authV2/open/devices",
                get(|| async { Json(json!([{ "id": "DEV1", "series": "quote", "model": "quote_0", "edition": 1 }])) }),
            )
            .route(
                "/api/authV2/open/device/DEV1/status",
                get(|| async { Json(json!({ "alias": "Desk", "status": { "wifi": "-40 dBm" } })) }),
            );
        let base = spawn_stub(router).await;
        let client = client_for(&format!("{}/", base));

        let devices = client.get_devices().await.unwrap();
        assert_eq!(devices[0].id, "DEV1");

        let status = client.get_device_status("DEV1").await.unwrap();
        assert_eq!(status.alias.as_deref(), Some("Desk"));
        assert_eq!(status.status.wifi.as_deref(), Some("-40 dBm"));
    }
}
