// CloudFormation custom resource request model
//
// Property values arrive as strings regardless of their declared type in the
// template, so everything here deserializes from strings.

use crate::dispatch::DispatchError;
use efs_sync_core::{ArchiveSource, DestinationPath};
use serde::Deserialize;
use std::fmt;

/// Lifecycle verb carried in `RequestType`
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(from = "String")]
pub enum RequestType {
    Create,
    Update,
    Delete,
    Unknown(String),
}

impl From<String> for RequestType {
    fn from(value: String) -> Self {
        match value.as_str() {
            "Create" => RequestType::Create,
            "Update" => RequestType::Update,
            "Delete" => RequestType::Delete,
            _ => RequestType::Unknown(value),
        }
    }
}

impl fmt::Display for RequestType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RequestType::Create => write!(f, "Create"),
            RequestType::Update => write!(f, "Update"),
            RequestType::Delete => write!(f, "Delete"),
            RequestType::Unknown(verb) => write!(f, "{}", verb),
        }
    }
}

/// Custom resource invocation payload
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct CustomResourceEvent {
    pub request_type: RequestType,
    #[serde(rename = "ResponseURL")]
    pub response_url: String,
    pub stack_id: String,
    pub request_id: String,
    #[serde(default)]
    pub resource_type: String,
    pub logical_resource_id: String,
    #[serde(default)]
    pub physical_resource_id: Option<String>,
    #[serde(default)]
    pub resource_properties: serde_json::Value,
    #[serde(default)]
    pub old_resource_properties: Option<serde_json::Value>,
}

impl CustomResourceEvent {
    /// Best-effort view of a payload that failed to parse, so a FAILED
    /// response can still reach the orchestrator.
    ///
    /// Returns `None` when there is no `ResponseURL` to answer to.
    pub fn from_malformed(payload: &serde_json::Value) -> Option<Self> {
        let field = |key: &str| {
            payload
                .get(key)
                .and_then(serde_json::Value::as_str)
                .unwrap_or_default()
                .to_string()
        };

        let response_url = field("ResponseURL");
        if response_url.is_empty() {
            return None;
        }

        let request_type = match payload.get("RequestType") {
            Some(serde_json::Value::String(verb)) => RequestType::from(verb.clone()),
            Some(other) => RequestType::Unknown(other.to_string()),
            None => RequestType::Unknown(String::new()),
        };

        Some(Self {
            request_type,
            response_url,
            stack_id: field("StackId"),
            request_id: field("RequestId"),
            resource_type: field("ResourceType"),
            logical_resource_id: field("LogicalResourceId"),
            physical_resource_id: Some(field("PhysicalResourceId")).filter(|id| !id.is_empty()),
            resource_properties: serde_json::Value::Null,
            old_resource_properties: None,
        })
    }

    /// Parse `ResourceProperties` into the sync parameters
    pub fn sync_properties(&self) -> Result<SyncProperties, DispatchError> {
        SyncProperties::deserialize(&self.resource_properties)
            .map_err(|e| DispatchError::InvalidProperties(e.to_string()))
    }
}

/// `ResourceProperties` understood by the sync function
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct SyncProperties {
    #[serde(default)]
    pub file_system_id: Option<String>,
    #[serde(default)]
    pub access_point_id: Option<String>,
    pub root_directory: String,
    #[serde(default)]
    pub sub_directory: String,
    pub archive_url: String,
}

impl SyncProperties {
    pub fn source(&self) -> Result<ArchiveSource, DispatchError> {
        Ok(ArchiveSource::parse(&self.archive_url)?)
    }

    pub fn destination(&self) -> Result<DestinationPath, DispatchError> {
        Ok(DestinationPath::new(&self.root_directory, &self.sub_directory)?)
    }
}
