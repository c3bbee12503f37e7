// AWS Lambda binary entry point
//
// Build with: cargo build -p efs-sync-lambda --release
// The output binary is named `bootstrap` for the provided.al2023 runtime.

#[tokio::main]
async fn main() -> Result<(), lambda_runtime::Error> {
    efs_sync_lambda::run().await
}
