//! AWS CloudFormation deployment config generator

use anyhow::{Context, Result};
use clap::Args;
use dialoguer::{Confirm, Input};
use std::fs;
use std::path::PathBuf;

use super::names;

const TEMPLATE: &str = include_str!("../../templates/cloudformation.yaml");

#[derive(Args)]
pub struct AwsArgs {
    /// Lambda package version used in the default code key (e.g., v0.1.0 or "latest")
    #[arg(long, default_value = "latest")]
    pub version: String,

    /// CloudFormation stack name, also the default environment name
    #[arg(long)]
    pub stack_name: Option<String>,

    /// Directory on the volume that receives the archive
    #[arg(long)]
    pub root_dir: Option<String>,

    /// Optional subdirectory below the root directory
    #[arg(long)]
    pub sub_dir: Option<String>,

    /// URL of the zip archive to extract
    #[arg(long)]
    pub archive_url: Option<String>,

    /// CloudWatch log retention in days
    #[arg(long, default_value = "7")]
    pub retention: u16,

    /// Output file
    #[arg(long, default_value = "template.yaml")]
    pub output: PathBuf,

    /// Overwrite existing file without asking
    #[arg(long)]
    pub force: bool,
}

/// Values substituted into the template
#[derive(Debug, Clone)]
pub struct TemplateValues {
    pub stack_name: String,
    pub root_directory: String,
    pub sub_directory: String,
    pub archive_url: String,
    pub log_retention: u16,
    pub lambda_version: String,
}

/// Render the CloudFormation template with the given values
pub fn render_template(values: &TemplateValues) -> String {
    TEMPLATE
        .replace("{{STACK_NAME}}", &values.stack_name)
        .replace("{{ENVIRONMENT_NAME}}", &values.stack_name)
        .replace("{{ROOT_DIRECTORY}}", &values.root_directory)
        .replace("{{SUB_DIRECTORY}}", &values.sub_directory)
        .replace("{{ARCHIVE_URL}}", &values.archive_url)
        .replace("{{LOG_RETENTION}}", &values.log_retention.to_string())
        .replace("{{LAMBDA_VERSION}}", &values.lambda_version)
}

pub fn run(args: AwsArgs) -> Result<()> {
    println!();
    println!("efs-sync deploy - EFS volume + archive sync custom resource");
    println!();

    let stack_name = match args.stack_name {
        Some(name) => {
            validate_environment_name(&name)
                .map_err(|e| anyhow::anyhow!("Invalid stack name: {}", e))?;
            name
        }
        None => Input::new()
            .with_prompt("Stack name")
            .default(names::generate())
            .validate_with(|input: &String| validate_environment_name(input))
            .interact_text()?,
    };

    let root_directory = match args.root_dir {
        Some(dir) => {
            validate_root_directory(&dir)
                .map_err(|e| anyhow::anyhow!("Invalid root directory: {}", e))?;
            dir
        }
        None => Input::new()
            .with_prompt("Root directory on the volume")
            .default("files".to_string())
            .validate_with(|input: &String| validate_root_directory(input))
            .interact_text()?,
    };

    let sub_directory = match args.sub_dir {
        Some(dir) => {
            validate_sub_directory(&dir)
                .map_err(|e| anyhow::anyhow!("Invalid subdirectory: {}", e))?;
            dir
        }
        None => Input::new()
            .with_prompt("Subdirectory (empty for the root directory itself)")
            .allow_empty(true)
            .validate_with(|input: &String| validate_sub_directory(input))
            .interact_text()?,
    };

    let archive_url = match args.archive_url {
        Some(url) => {
            validate_archive_url(&url).map_err(|e| anyhow::anyhow!("Invalid archive URL: {}", e))?;
            url
        }
        None => Input::new()
            .with_prompt("Archive URL (zip)")
            .validate_with(|input: &String| validate_archive_url(input))
            .interact_text()?,
    };

    let output_path = args.output.as_path();
    if output_path.exists() && !args.force {
        let overwrite = Confirm::new()
            .with_prompt(format!("{} already exists. Overwrite?", output_path.display()))
            .default(false)
            .interact()?;
        if !overwrite {
            println!("Aborted.");
            return Ok(());
        }
    }

    let content = render_template(&TemplateValues {
        stack_name: stack_name.clone(),
        root_directory,
        sub_directory,
        archive_url,
        log_retention: args.retention,
        lambda_version: args.version.clone(),
    });

    fs::write(output_path, &content)
        .with_context(|| format!("Failed to write {}", output_path.display()))?;

    println!();
    println!(
        "Created {} (version: {})",
        output_path.display(),
        args.version
    );
    println!();
    println!("Next steps:");
    println!("  1. Upload the Lambda package:");
    println!("     cargo lambda build -p efs-sync-lambda --release --arm64 --output-format zip");
    println!(
        "     aws s3 cp target/lambda/bootstrap/bootstrap.zip s3://<bucket>/efs-sync/{}/bootstrap.zip",
        args.version
    );
    println!("  2. Deploy:");
    println!("     aws cloudformation deploy \\");
    println!("       --template-file {} \\", output_path.display());
    println!("       --stack-name {} \\", stack_name);
    println!("       --parameter-overrides VpcId=<vpc> SubnetIdA=<subnet> SubnetIdB=<subnet> CodeBucket=<bucket> \\");
    println!("       --capabilities CAPABILITY_IAM");
    println!();

    Ok(())
}

/// Mirrors the EnvironmentName AllowedPattern: `^[a-z][a-z0-9-]{0,31}$`
pub fn validate_environment_name(input: &str) -> Result<(), String> {
    if input.is_empty() {
        return Err("Name cannot be empty".to_string());
    }
    if input.len() > 32 {
        return Err("Name must be at most 32 characters".to_string());
    }
    if !input.starts_with(|c: char| c.is_ascii_lowercase()) {
        return Err("Name must start with a lowercase letter".to_string());
    }
    if !input
        .chars()
        .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
    {
        return Err("Name must contain only lowercase letters, numbers, and hyphens".to_string());
    }
    Ok(())
}

/// Mirrors the RootDirectory AllowedPattern: `^[A-Za-z0-9][A-Za-z0-9_.-]*$`
pub fn validate_root_directory(input: &str) -> Result<(), String> {
    validate_segment(input)
}

/// Mirrors the SubDirectory AllowedPattern: empty, or `/`-separated directory names
pub fn validate_sub_directory(input: &str) -> Result<(), String> {
    if input.is_empty() {
        return Ok(());
    }
    input.split('/').try_for_each(validate_segment)
}

/// Mirrors the ArchiveUrl AllowedPattern: `^https?://\S+$`
pub fn validate_archive_url(input: &str) -> Result<(), String> {
    let rest = input
        .strip_prefix("https://")
        .or_else(|| input.strip_prefix("http://"))
        .ok_or_else(|| "URL must start with http:// or https://".to_string())?;
    if rest.is_empty() || rest.chars().any(char::is_whitespace) {
        return Err("URL must have a host and no whitespace".to_string());
    }
    Ok(())
}

fn validate_segment(segment: &str) -> Result<(), String> {
    let mut chars = segment.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphanumeric() => {}
        Some(_) => return Err(format!("'{}' must start with a letter or digit", segment)),
        None => return Err("Directory names cannot be empty".to_string()),
    }
    if !chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '-')) {
        return Err(format!(
            "'{}' may contain only letters, digits, '_', '.', and '-'",
            segment
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn values() -> TemplateValues {
        TemplateValues {
            stack_name: "calm-harbor-1234".to_string(),
            root_directory: "files".to_string(),
            sub_directory: "foobar".to_string(),
            archive_url: "https://example.com/site.zip".to_string(),
            log_retention: 14,
            lambda_version: "v0.1.0".to_string(),
        }
    }

    #[test]
    fn render_fills_every_placeholder() {
        let rendered = render_template(&values());

        assert!(!rendered.contains("{{"));
        assert!(rendered.contains("Default: \"calm-harbor-1234\""));
        assert!(rendered.contains("Default: \"files\""));
        assert!(rendered.contains("Default: \"foobar\""));
        assert!(rendered.contains("Default: \"https://example.com/site.zip\""));
        assert!(rendered.contains("RetentionInDays: 14"));
        assert!(rendered.contains("efs-sync/v0.1.0/bootstrap.zip"));
    }

    #[test]
    fn template_declares_the_stack_resources() {
        for resource in [
            "AWS::EFS::FileSystem",
            "AWS::EFS::MountTarget",
            "AWS::EFS::AccessPoint",
            "AWS::Lambda::Function",
            "Custom::EfsSync",
        ] {
            assert!(TEMPLATE.contains(resource), "missing {}", resource);
        }
    }

    #[test]
    fn test_validate_environment_name() {
        assert!(validate_environment_name("calm-harbor-1234").is_ok());
        assert!(validate_environment_name("").is_err());
        assert!(validate_environment_name("1abc").is_err());
        assert!(validate_environment_name("Upper").is_err());
        assert!(validate_environment_name(&"a".repeat(33)).is_err());
    }

    #[test]
    fn test_validate_directories() {
        assert!(validate_root_directory("files").is_ok());
        assert!(validate_root_directory("site_v1.2").is_ok());
        assert!(validate_root_directory("").is_err());
        assert!(validate_root_directory("..").is_err());
        assert!(validate_root_directory("a/b").is_err());

        assert!(validate_sub_directory("").is_ok());
        assert!(validate_sub_directory("foobar").is_ok());
        assert!(validate_sub_directory("a/b/c").is_ok());
        assert!(validate_sub_directory("a//b").is_err());
        assert!(validate_sub_directory("../etc").is_err());
        assert!(validate_sub_directory("/abs").is_err());
    }

    #[test]
    fn test_validate_archive_url() {
        assert!(validate_archive_url("https://example.com/site.zip").is_ok());
        assert!(validate_archive_url("http://host/a.zip?x=1").is_ok());
        assert!(validate_archive_url("ftp://host/a.zip").is_err());
        assert!(validate_archive_url("https://").is_err());
        assert!(validate_archive_url("https://host/a b.zip").is_err());
    }
}
