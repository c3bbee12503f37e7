//! Deploy command - generates the CloudFormation stack definition

mod names;

pub mod aws;

use clap::Subcommand;

#[derive(Subcommand)]
pub enum DeployCommand {
    /// Generate template.yaml for EFS + the efs-sync custom resource
    Aws(aws::AwsArgs),
}

impl DeployCommand {
    pub fn run(self) -> anyhow::Result<()> {
        match self {
            DeployCommand::Aws(args) => aws::run(args),
        }
    }
}
