// efs-sync operator CLI
//
// Local sync runs and CloudFormation template generation. The Lambda
// handler itself lives in crates/efs-sync-lambda.

pub mod deploy;
pub mod init;
pub mod local;
