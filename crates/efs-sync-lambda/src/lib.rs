// AWS Lambda runtime adapter
//
// Runs as a CloudFormation custom resource: syncs a zip archive onto the
// EFS access point mounted under /mnt and reports back to CloudFormation.

use efs_sync_config::{LogFormat, RuntimeConfig};
use efs_sync_core::{ArchiveSyncer, SyncOptions};
use lambda_runtime::{service_fn, Error, LambdaEvent};
use serde_json::Value;
use std::sync::Arc;
use tracing::info;

mod dispatch;
mod event;
mod response;

pub use dispatch::{dispatch, dispatch_payload, DispatchError, Synchronizer};
pub use event::{CustomResourceEvent, RequestType, SyncProperties};
pub use response::{CustomResourceResponse, HttpResponder, Responder, ResponseStatus};

pub(crate) struct LambdaState {
    pub syncer: ArchiveSyncer,
    pub responder: HttpResponder,
}

/// Lambda handler for custom resource events
///
/// Takes the raw payload so a malformed event is still answered.
async fn handle_request(
    event: LambdaEvent<Value>,
    state: Arc<LambdaState>,
) -> Result<CustomResourceResponse, Error> {
    let (payload, context) = event.into_parts();
    let log_stream = context.env_config.log_stream.clone();

    let response =
        dispatch_payload(&payload, &log_stream, &state.syncer, &state.responder).await?;
    Ok(response)
}

/// Lambda runtime entry point
pub async fn run() -> Result<(), Error> {
    let config = RuntimeConfig::load()?;
    init_tracing(&config);

    info!(
        version = env!("CARGO_PKG_VERSION"),
        git_hash = env!("GIT_HASH"),
        built = env!("BUILD_TIMESTAMP"),
        mount_base = %config.mount.base,
        tmp_dir = %config.download.tmp_dir,
        "efs-sync Lambda starting"
    );

    let client = reqwest::Client::builder()
        .user_agent(config.download.user_agent.clone())
        .build()?;

    let state = Arc::new(LambdaState {
        syncer: ArchiveSyncer::new(
            client.clone(),
            SyncOptions {
                mount_base: config.mount.base_path().to_path_buf(),
                tmp_dir: config.download.tmp_path(),
            },
        ),
        responder: HttpResponder::new(client),
    });

    lambda_runtime::run(service_fn(move |event: LambdaEvent<Value>| {
        let state = state.clone();
        async move { handle_request(event, state).await }
    }))
    .await
}

/// Initialize tracing/logging from RuntimeConfig
fn init_tracing(config: &RuntimeConfig) {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let env_filter =
        EnvFilter::try_new(&config.logging.level).unwrap_or_else(|_| EnvFilter::new("info"));
    let ansi = config.lambda.as_ref().is_some_and(|lambda| lambda.ansi_logs);

    let registry = tracing_subscriber::registry().with(env_filter);

    // CloudWatch stamps every line, so timestamps are dropped
    let _ = match config.logging.format {
        LogFormat::Json => tracing::subscriber::set_global_default(
            registry.with(fmt::layer().json().without_time().with_ansi(ansi)),
        ),
        LogFormat::Text => tracing::subscriber::set_global_default(
            registry.with(fmt::layer().without_time().with_ansi(ansi)),
        ),
    };

    if config.logging.is_trace() {
        tracing::warn!("logging.level is trace; every archive entry will be logged");
    }
}
