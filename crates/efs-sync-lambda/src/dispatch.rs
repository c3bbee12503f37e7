// Lifecycle dispatcher
//
// Create and Update run a full resync, Delete is a no-op, anything else is
// an error. Exactly one response is sent per invocation, and a FAILED
// response always goes out before the error is handed back to the runtime.

use crate::event::{CustomResourceEvent, RequestType};
use crate::response::{CustomResourceResponse, Responder};
use async_trait::async_trait;
use efs_sync_core::{ArchiveSource, ArchiveSyncer, DestinationPath, SyncError, SyncReport};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;
use tracing::{error, info, warn};

#[derive(Debug, Error)]
pub enum DispatchError {
    #[error(transparent)]
    Sync(#[from] SyncError),

    #[error("Unknown request type '{0}'")]
    UnknownRequestType(String),

    #[error("Invalid resource properties: {0}")]
    InvalidProperties(String),

    #[error("Malformed custom resource event: {0}")]
    InvalidEvent(String),

    #[error("Failed to encode sync report: {0}")]
    Report(String),

    #[error("Failed to deliver custom resource response: {0}")]
    Respond(String),
}

/// The fetch-and-extract step, abstracted for the dispatcher
#[async_trait]
pub trait Synchronizer: Send + Sync {
    async fn sync(
        &self,
        source: &ArchiveSource,
        destination: &DestinationPath,
    ) -> Result<SyncReport, SyncError>;
}

#[async_trait]
impl Synchronizer for ArchiveSyncer {
    async fn sync(
        &self,
        source: &ArchiveSource,
        destination: &DestinationPath,
    ) -> Result<SyncReport, SyncError> {
        ArchiveSyncer::sync(self, source, destination).await
    }
}

/// Parse a raw invocation payload and dispatch it.
///
/// A payload that does not parse is still answered with FAILED when it
/// carries a `ResponseURL`; without one there is nobody to signal.
pub async fn dispatch_payload<S, R>(
    payload: &Value,
    log_stream: &str,
    syncer: &S,
    responder: &R,
) -> Result<CustomResourceResponse, DispatchError>
where
    S: Synchronizer + ?Sized,
    R: Responder + ?Sized,
{
    let parse_err = match CustomResourceEvent::deserialize(payload) {
        Ok(event) => return dispatch(&event, log_stream, syncer, responder).await,
        Err(e) => DispatchError::InvalidEvent(e.to_string()),
    };

    match CustomResourceEvent::from_malformed(payload) {
        Some(event) => signal_failure(&event, log_stream, responder, &parse_err).await,
        None => error!(error = %parse_err, "Event has no ResponseURL; cannot signal FAILED"),
    }
    Err(parse_err)
}

/// Handle one custom resource event and signal the orchestrator.
///
/// Returns the response that was delivered. On failure the FAILED response
/// has already been sent when the error comes back.
pub async fn dispatch<S, R>(
    event: &CustomResourceEvent,
    log_stream: &str,
    syncer: &S,
    responder: &R,
) -> Result<CustomResourceResponse, DispatchError>
where
    S: Synchronizer + ?Sized,
    R: Responder + ?Sized,
{
    info!(
        request_type = %event.request_type,
        request_id = %event.request_id,
        logical_resource_id = %event.logical_resource_id,
        "Handling custom resource event"
    );

    match perform(event, syncer).await {
        Ok(data) => {
            let response = CustomResourceResponse::success(event, log_stream, data);
            responder.respond(&event.response_url, &response).await?;
            info!(request_id = %event.request_id, "Signalled SUCCESS");
            Ok(response)
        }
        Err(err) => {
            signal_failure(event, log_stream, responder, &err).await;
            Err(err)
        }
    }
}

async fn signal_failure<R>(
    event: &CustomResourceEvent,
    log_stream: &str,
    responder: &R,
    err: &DispatchError,
) where
    R: Responder + ?Sized,
{
    error!(
        request_type = %event.request_type,
        request_id = %event.request_id,
        error = %err,
        "Custom resource action failed"
    );
    let response = CustomResourceResponse::failed(event, log_stream, &err.to_string());
    if let Err(send_err) = responder.respond(&event.response_url, &response).await {
        error!(error = %send_err, "Could not deliver FAILED response");
    }
}

async fn perform<S>(
    event: &CustomResourceEvent,
    syncer: &S,
) -> Result<Map<String, Value>, DispatchError>
where
    S: Synchronizer + ?Sized,
{
    match &event.request_type {
        RequestType::Create | RequestType::Update => {
            let props = event.sync_properties()?;
            let source = props.source()?;
            let destination = props.destination()?;

            let report = syncer.sync(&source, &destination).await?;
            response_data(&report)
        }
        RequestType::Delete => {
            info!("Delete requested; volume contents are left in place");
            Ok(Map::new())
        }
        RequestType::Unknown(verb) => {
            warn!(request_type = %verb, "Unrecognized request type");
            Err(DispatchError::UnknownRequestType(verb.clone()))
        }
    }
}

/// Flatten a report into the response `Data` object
fn response_data<T: Serialize>(report: &T) -> Result<Map<String, Value>, DispatchError> {
    match serde_json::to_value(report).map_err(|e| DispatchError::Report(e.to_string()))? {
        Value::Object(data) => Ok(data),
        other => Err(DispatchError::Report(format!(
            "expected an object, got {}",
            other
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use efs_sync_core::SyncReport;
    use std::collections::BTreeMap;
    use std::path::PathBuf;

    #[test]
    fn report_fields_become_data() {
        let data = response_data(&SyncReport {
            destination: PathBuf::from("/mnt/files/foobar"),
            bytes_downloaded: 42,
            files_written: 3,
            directories_created: 1,
        })
        .unwrap();

        assert_eq!(data["Destination"], "/mnt/files/foobar");
        assert_eq!(data["BytesDownloaded"], 42);
        assert_eq!(data["FilesWritten"], 3);
        assert_eq!(data["DirectoriesCreated"], 1);
    }

    #[test]
    fn unencodable_report_is_an_error() {
        // JSON object keys must be strings
        let bad: BTreeMap<(u8, u8), u8> = BTreeMap::from([((1, 2), 3)]);
        assert!(matches!(response_data(&bad), Err(DispatchError::Report(_))));

        assert!(matches!(response_data(&5u8), Err(DispatchError::Report(_))));
    }
}
