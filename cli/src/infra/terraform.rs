//! Infrastructure implementation of the `Provisioner` port.
//!
//! `TerraformCli<R>` routes all terraform CLI calls through a
//! `CommandRunner`, always with `-chdir=<dir>` so parallel variants never
//! share a working directory.

use anyhow::{Context, Result};

use crate::application::ports::{CommandRunner, ProvisionOptions, Provisioner};
use crate::domain::ToolError;
use crate::infra::command_runner::check_success;

const TERRAFORM: &str = "terraform";

/// Infrastructure adapter that routes all terraform CLI calls through a `CommandRunner`.
///
/// Generic over `R: CommandRunner` so that tests can inject a mock runner
/// without spawning real processes.
pub struct TerraformCli<R: CommandRunner> {
    runner: R,
}

impl<R: CommandRunner> TerraformCli<R> {
    pub fn new(runner: R) -> Self {
        Self { runner }
    }

    async fn invoke(&self, step: &str, args: &[String]) -> Result<std::process::Output> {
        let arg_refs: Vec<&str> = args.iter().map(String::as_str).collect();
        let output = self
            .runner
            .run(TERRAFORM, &arg_refs)
            .await
            .with_context(|| format!("terraform {step}"))?;
        check_success(TERRAFORM, step, output)
    }
}

/// `-chdir=<dir> <subcommand>`
fn base_args(opts: &ProvisionOptions, subcommand: &str) -> Vec<String> {
    vec![
        format!("-chdir={}", opts.dir.display()),
        subcommand.to_owned(),
    ]
}

fn lock_args(opts: &ProvisionOptions) -> [String; 2] {
    ["-lock=true".to_owned(), format!("-lock-timeout={}", opts.lock_timeout)]
}

/// Arguments for `terraform init`.
#[must_use]
pub fn init_args(opts: &ProvisionOptions) -> Vec<String> {
    let mut args = base_args(opts, "init");
    args.push(format!("-upgrade={}", opts.upgrade));
    args.push("-input=false".to_owned());
    args.push(format!("-lock-timeout={}", opts.lock_timeout));
    args
}

/// Arguments for `terraform apply`, including one `-target` per target.
#[must_use]
pub fn apply_args(opts: &ProvisionOptions) -> Vec<String> {
    let mut args = base_args(opts, "apply");
    args.extend(["-input=false".to_owned(), "-auto-approve".to_owned()]);
    args.extend(lock_args(opts));
    args.extend(opts.targets.iter().map(|t| format!("-target={t}")));
    args
}

/// Arguments for `terraform output -json <name>`.
#[must_use]
pub fn output_args(opts: &ProvisionOptions, name: &str) -> Vec<String> {
    let mut args = base_args(opts, "output");
    args.extend(["-no-color".to_owned(), "-json".to_owned(), name.to_owned()]);
    args
}

/// Arguments for `terraform destroy`.
#[must_use]
pub fn destroy_args(opts: &ProvisionOptions) -> Vec<String> {
    let mut args = base_args(opts, "destroy");
    args.extend(["-input=false".to_owned(), "-auto-approve".to_owned()]);
    args.extend(lock_args(opts));
    args
}

/// Decode `terraform output -json` for a single output. Strings are
/// returned unquoted; any other JSON value is returned as compact JSON.
///
/// # Errors
///
/// Returns [`ToolError::UnparseableOutput`] when stdout is not JSON.
pub fn parse_output_value(name: &str, stdout: &[u8]) -> Result<String> {
    let value: serde_json::Value =
        serde_json::from_slice(stdout).map_err(|_| ToolError::UnparseableOutput {
            tool: TERRAFORM.to_owned(),
            step: format!("output {name}"),
            output: String::from_utf8_lossy(stdout).trim().to_owned(),
        })?;
    Ok(match value {
        serde_json::Value::String(s) => s,
        other => other.to_string(),
    })
}

impl<R: CommandRunner> Provisioner for TerraformCli<R> {
    async fn init(&self, opts: &ProvisionOptions) -> Result<()> {
        self.invoke("init", &init_args(opts)).await.map(drop)
    }

    async fn apply(&self, opts: &ProvisionOptions) -> Result<()> {
        self.invoke("apply", &apply_args(opts)).await.map(drop)
    }

    async fn output(&self, opts: &ProvisionOptions, name: &str) -> Result<String> {
        let output = self
            .invoke(&format!("output {name}"), &output_args(opts, name))
            .await?;
        parse_output_value(name, &output.stdout)
    }

    async fn destroy(&self, opts: &ProvisionOptions) -> Result<()> {
        self.invoke("destroy", &destroy_args(opts)).await.map(drop)
    }
}
