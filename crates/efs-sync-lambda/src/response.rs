// CloudFormation custom resource responses
//
// The orchestrator waits for a JSON document PUT to the pre-signed
// ResponseURL. The whole body must stay under 4 KiB.

use crate::dispatch::DispatchError;
use crate::event::CustomResourceEvent;
use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use reqwest::Client;
use serde::Serialize;
use serde_json::{Map, Value};
use tracing::{debug, error};

const MAX_REASON_CHARS: usize = 1024;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ResponseStatus {
    Success,
    Failed,
}

/// Body sent back to the orchestrator
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct CustomResourceResponse {
    pub status: ResponseStatus,
    pub reason: String,
    pub physical_resource_id: String,
    pub stack_id: String,
    pub request_id: String,
    pub logical_resource_id: String,
    pub no_echo: bool,
    pub data: Map<String, Value>,
}

impl CustomResourceResponse {
    pub fn success(event: &CustomResourceEvent, log_stream: &str, data: Map<String, Value>) -> Self {
        Self::build(
            event,
            log_stream,
            ResponseStatus::Success,
            log_pointer(log_stream),
            data,
        )
    }

    pub fn failed(event: &CustomResourceEvent, log_stream: &str, message: &str) -> Self {
        let reason = truncate(&format!("{}. {}", message, log_pointer(log_stream)));
        Self::build(event, log_stream, ResponseStatus::Failed, reason, Map::new())
    }

    fn build(
        event: &CustomResourceEvent,
        log_stream: &str,
        status: ResponseStatus,
        reason: String,
        data: Map<String, Value>,
    ) -> Self {
        // Keeping the incoming id stops CloudFormation from treating an Update as a replacement
        let physical_resource_id = event
            .physical_resource_id
            .clone()
            .filter(|id| !id.is_empty())
            .unwrap_or_else(|| log_stream.to_string());

        Self {
            status,
            reason,
            physical_resource_id,
            stack_id: event.stack_id.clone(),
            request_id: event.request_id.clone(),
            logical_resource_id: event.logical_resource_id.clone(),
            no_echo: false,
            data,
        }
    }
}

fn log_pointer(log_stream: &str) -> String {
    format!("See the details in CloudWatch Log Stream: {}", log_stream)
}

fn truncate(reason: &str) -> String {
    match reason.char_indices().nth(MAX_REASON_CHARS) {
        Some((idx, _)) => format!("{}...", &reason[..idx]),
        None => reason.to_string(),
    }
}

/// Delivers the lifecycle signal to the orchestrator
#[async_trait]
pub trait Responder: Send + Sync {
    async fn respond(
        &self,
        response_url: &str,
        response: &CustomResourceResponse,
    ) -> Result<(), DispatchError>;
}

/// Sends the response with an HTTP PUT to the pre-signed URL
#[derive(Debug, Clone)]
pub struct HttpResponder {
    client: Client,
}

impl HttpResponder {
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Responder for HttpResponder {
    async fn respond(
        &self,
        response_url: &str,
        response: &CustomResourceResponse,
    ) -> Result<(), DispatchError> {
        let body = serde_json::to_string(response)
            .map_err(|e| DispatchError::Respond(format!("failed to encode response: {}", e)))?;

        debug!(status = ?response.status, body = %body, "Sending custom resource response");

        // Pre-signed S3 URLs are signed without a content type
        let result = self
            .client
            .put(response_url)
            .header(CONTENT_TYPE, "")
            .body(body)
            .send()
            .await
            .map_err(|e| DispatchError::Respond(e.to_string()))?;

        let status = result.status();
        if !status.is_success() {
            let detail = result.text().await.unwrap_or_default();
            error!(%status, detail = %detail, "Custom resource response rejected");
            return Err(DispatchError::Respond(format!(
                "response URL returned HTTP {}",
                status
            )));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::RequestType;

    fn event(physical_resource_id: Option<&str>) -> CustomResourceEvent {
        CustomResourceEvent {
            request_type: RequestType::Update,
            response_url: "https://example.com/callback".to_string(),
            stack_id: "stack-1".to_string(),
            request_id: "req-1".to_string(),
            resource_type: "Custom::EfsSync".to_string(),
            logical_resource_id: "SyncArchive".to_string(),
            physical_resource_id: physical_resource_id.map(str::to_string),
            resource_properties: Value::Null,
            old_resource_properties: None,
        }
    }

    #[test]
    fn serializes_with_cloudformation_field_names() {
        let response = CustomResourceResponse::success(&event(None), "stream-1", Map::new());
        let value = serde_json::to_value(&response).unwrap();

        assert_eq!(value["Status"], "SUCCESS");
        assert_eq!(value["PhysicalResourceId"], "stream-1");
        assert_eq!(value["StackId"], "stack-1");
        assert_eq!(value["RequestId"], "req-1");
        assert_eq!(value["LogicalResourceId"], "SyncArchive");
        assert_eq!(value["NoEcho"], false);
        assert!(value["Data"].as_object().unwrap().is_empty());
    }

    #[test]
    fn incoming_physical_id_is_kept() {
        let response = CustomResourceResponse::failed(&event(Some("existing")), "stream-2", "boom");

        assert_eq!(response.status, ResponseStatus::Failed);
        assert_eq!(response.physical_resource_id, "existing");
        assert!(response.reason.starts_with("boom. "));
        assert!(response.reason.ends_with("stream-2"));
    }

    #[test]
    fn long_reasons_are_truncated() {
        let message = "x".repeat(5000);
        let response = CustomResourceResponse::failed(&event(None), "stream", &message);

        assert_eq!(response.reason.chars().count(), MAX_REASON_CHARS + 3);
    }
}
