//! Outbound client for the n8n automation service.
//!
//! [`AutomationClient`] POSTs JSON to `{base}{workflow path}` with the shared
//! secret header. Calls are single-shot: failures are reported to the caller
//! and never retried.

use std::time::Duration;

use content_engine_core::workflow::Workflow;
use serde_json::{json, Map, Value};

use crate::config::AutomationConfig;

/// Header carrying the shared secret in both directions.
pub const WEBHOOK_SECRET_HEADER: &str = "x-webhook-secret";

/// HTTP request timeout for a single outbound call.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

// ---------------------------------------------------------------------------
// Error
// ---------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum AutomationError {
    /// No webhook base URL is configured.
    #[error("n8n webhook URL not configured")]
    NotConfigured,

    /// The request never produced a response (network, DNS, timeout).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The workflow answered with a non-2xx status.
    #[error("Workflow returned HTTP {status}")]
    HttpStatus { status: u16, body: String },
}

// ---------------------------------------------------------------------------
// Client
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct AutomationClient {
    client: reqwest::Client,
    base_url: Option<String>,
    secret: Option<String>,
    callback_url: String,
}

impl AutomationClient {
    pub fn new(config: &AutomationConfig) -> Self {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .expect("Failed to build reqwest HTTP client");
        Self {
            client,
            base_url: config.webhook_base_url.clone(),
            secret: config.callback_secret.clone(),
            callback_url: config.callback_url(),
        }
    }

    pub fn is_configured(&self) -> bool {
        self.base_url.is_some()
    }

    pub fn callback_url(&self) -> &str {
        &self.callback_url
    }

    /// Start `workflow` for a project and return the workflow's response.
    ///
    /// The body is `{ projectId, timestamp, callbackUrl }` merged with
    /// `payload`; payload keys win on collision. A non-JSON response body is
    /// returned as a string and an empty one as `null`.
    pub async fn trigger(
        &self,
        project_id: &str,
        workflow: Workflow,
        payload: Option<Map<String, Value>>,
    ) -> Result<Value, AutomationError> {
        let mut body = Map::new();
        body.insert("projectId".into(), json!(project_id));
        body.insert("timestamp".into(), json!(chrono::Utc::now().to_rfc3339()));
        body.insert("callbackUrl".into(), json!(self.callback_url));
        body.extend(payload.unwrap_or_default());

        let text = self.post(workflow.webhook_path(), &Value::Object(body)).await?;
        Ok(parse_result(&text))
    }

    /// Ask the ingest workflow to analyse an uploaded reference video.
    pub async fn notify_ingest(&self, project_id: &str, video_url: &str) -> Result<(), AutomationError> {
        let body = json!({
            "projectId": project_id,
            "videoUrl": video_url,
            "action": "analyze",
            "callbackUrl": self.callback_url,
        });
        self.post(Workflow::IngestUnderstand.webhook_path(), &body)
            .await
            .map(|_| ())
    }

    /// POST `body` to `{base}{path}`, returning the response text on 2xx.
    async fn post(&self, path: &str, body: &Value) -> Result<String, AutomationError> {
        let base = self.base_url.as_deref().ok_or(AutomationError::NotConfigured)?;
        let url = format!("{base}{path}");

        let mut request = self.client.post(&url).json(body);
        if let Some(secret) = &self.secret {
            request = request.header(WEBHOOK_SECRET_HEADER, secret);
        }

        let response = request.send().await?;
        let status = response.status();
        let text = response.text().await?;
        if !status.is_success() {
            tracing::warn!(%url, status = status.as_u16(), "Automation webhook returned an error");
            return Err(AutomationError::HttpStatus {
                status: status.as_u16(),
                body: text,
            });
        }
        tracing::debug!(%url, status = status.as_u16(), "Automation webhook accepted request");
        Ok(text)
    }
}

fn parse_result(text: &str) -> Value {
    if text.trim().is_empty() {
        return Value::Null;
    }
    serde_json::from_str(text).unwrap_or_else(|_| Value::String(text.to_string()))
}
