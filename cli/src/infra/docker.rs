//! Infrastructure implementation of the `ContainerTool` port over the docker CLI.

use std::path::Path;

use anyhow::{Context, Result};

use crate::application::ports::{CommandRunner, ContainerRun, ContainerStop, ContainerTool, ImageBuild};
use crate::domain::RegistryCredentials;
use crate::infra::command_runner::{check_success, combined_output};

const DOCKER: &str = "docker";

/// Infrastructure adapter that routes all docker CLI calls through a `CommandRunner`.
pub struct DockerCli<R: CommandRunner> {
    runner: R,
}

impl<R: CommandRunner> DockerCli<R> {
    pub fn new(runner: R) -> Self {
        Self { runner }
    }

    async fn invoke(&self, step: &str, args: &[String]) -> Result<std::process::Output> {
        let arg_refs: Vec<&str> = args.iter().map(String::as_str).collect();
        let output = self
            .runner
            .run(DOCKER, &arg_refs)
            .await
            .with_context(|| format!("docker {step}"))?;
        check_success(DOCKER, step, output)
    }
}

/// Arguments for an image build. Multi-platform builds go through buildx.
#[must_use]
pub fn build_args(context_dir: &Path, opts: &ImageBuild) -> Vec<String> {
    let mut args = if opts.platforms.is_empty() {
        vec!["build".to_owned()]
    } else {
        vec![
            "buildx".to_owned(),
            "build".to_owned(),
            "--platform".to_owned(),
            opts.platforms.join(","),
        ]
    };
    for tag in &opts.tags {
        args.push("--tag".to_owned());
        args.push(tag.clone());
    }
    args.extend(opts.extra.iter().cloned());
    args.push(context_dir.display().to_string());
    args
}

/// Arguments for `docker run`.
#[must_use]
pub fn run_args(image: &str, opts: &ContainerRun) -> Vec<String> {
    let mut args = vec!["run".to_owned()];
    if opts.remove {
        args.push("--rm".to_owned());
    }
    if opts.detach {
        args.push("--detach".to_owned());
    }
    args.push("--name".to_owned());
    args.push(opts.name.clone());
    args.extend(opts.extra.iter().cloned());
    args.push(image.to_owned());
    args
}

/// Arguments for `docker stop`.
#[must_use]
pub fn stop_args(names: &[&str], opts: &ContainerStop) -> Vec<String> {
    let mut args = vec![
        "stop".to_owned(),
        "--time".to_owned(),
        opts.grace_secs.to_string(),
    ];
    args.extend(names.iter().map(|n| (*n).to_owned()));
    args
}

/// Arguments for `docker login`; the password goes on stdin.
#[must_use]
pub fn login_args(creds: &RegistryCredentials) -> Vec<String> {
    vec![
        "login".to_owned(),
        "--username".to_owned(),
        creds.username.clone(),
        "--password-stdin".to_owned(),
        creds.registry.clone(),
    ]
}

impl<R: CommandRunner> ContainerTool for DockerCli<R> {
    async fn build(&self, context_dir: &Path, opts: &ImageBuild) -> Result<()> {
        self.invoke("build", &build_args(context_dir, opts))
            .await
            .map(drop)
    }

    async fn run(&self, image: &str, opts: &ContainerRun) -> Result<()> {
        self.invoke("run", &run_args(image, opts)).await.map(drop)
    }

    async fn stop(&self, names: &[&str], opts: &ContainerStop) -> Result<()> {
        self.invoke("stop", &stop_args(names, opts)).await.map(drop)
    }

    async fn push(&self, tag: &str) -> Result<()> {
        self.invoke("push", &["push".to_owned(), tag.to_owned()])
            .await
            .map(drop)
    }

    async fn login(&self, creds: &RegistryCredentials) -> Result<String> {
        let args = login_args(creds);
        let arg_refs: Vec<&str> = args.iter().map(String::as_str).collect();
        let output = self
            .runner
            .run_with_stdin(DOCKER, &arg_refs, creds.password.as_bytes())
            .await
            .context("docker login")?;
        let output = check_success(DOCKER, "login", output)?;
        Ok(combined_output(&output))
    }
}
