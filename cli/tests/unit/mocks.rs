//! Shared mock infrastructure for unit tests.
//!
//! Every fake writes to a shared [`Journal`] so tests can assert the order
//! of calls across ports (for example that destroy always comes last).

#![allow(clippy::expect_used, dead_code)]

use std::collections::{HashMap, VecDeque};
use std::path::Path;
use std::process::Output;
use std::sync::{Arc, Mutex};

use anyhow::{Result, bail};
use base64::Engine as _;
use lambda_api_verify::application::ports::{
    CloudApi, CommandRunner, ContainerRun, ContainerStop, ContainerTool, HttpProbe, HttpResponse,
    ImageBuild, LogGroupDeletion, ProgressReporter, ProvisionOptions, Provisioner,
};
use lambda_api_verify::domain::{ProbeError, RegistryCredentials};

use crate::helpers::{ALT_DOMAIN, HOSTED_ZONE, ok_output};

pub const ACCOUNT_ID: &str = "123456789012";
pub const REGISTRY_PASSWORD: &str = "s3cr3t:with:colons";

// ── Journal ──────────────────────────────────────────────────────────────────

/// Ordered log of every call made through the fakes.
#[derive(Clone, Default)]
pub struct Journal(Arc<Mutex<Vec<String>>>);

impl Journal {
    pub fn record(&self, entry: impl Into<String>) {
        self.0.lock().expect("journal lock").push(entry.into());
    }

    pub fn entries(&self) -> Vec<String> {
        self.0.lock().expect("journal lock").clone()
    }

    pub fn contains(&self, entry: &str) -> bool {
        self.entries().iter().any(|e| e == entry)
    }

    pub fn position(&self, entry: &str) -> Option<usize> {
        self.entries().iter().position(|e| e == entry)
    }

    pub fn count_prefix(&self, prefix: &str) -> usize {
        self.entries().iter().filter(|e| e.starts_with(prefix)).count()
    }
}

// ── RecordingRunner ──────────────────────────────────────────────────────────

type Responder = dyn Fn(&str, &[String]) -> Result<Output> + Send + Sync;

/// A `CommandRunner` that records every `(program, args)` call and returns
/// whatever the responder yields.
///
/// Cloning shares the call log, so a test keeps one clone and hands the
/// other to the adapter under test.
#[derive(Clone)]
pub struct RecordingRunner {
    calls: Arc<Mutex<Vec<(String, Vec<String>)>>>,
    stdin: Arc<Mutex<Vec<Vec<u8>>>>,
    respond: Arc<Responder>,
}

impl RecordingRunner {
    pub fn responding(
        respond: impl Fn(&str, &[String]) -> Result<Output> + Send + Sync + 'static,
    ) -> Self {
        Self {
            calls: Arc::default(),
            stdin: Arc::default(),
            respond: Arc::new(respond),
        }
    }

    /// Every call succeeds with empty output.
    pub fn ok() -> Self {
        Self::responding(|_, _| Ok(ok_output(b"")))
    }

    /// Every call succeeds with `stdout`.
    pub fn with_stdout(stdout: &'static [u8]) -> Self {
        Self::responding(move |_, _| Ok(ok_output(stdout)))
    }

    /// Every call returns the given `Output`.
    pub fn returning(output: Output) -> Self {
        Self::responding(move |_, _| Ok(output.clone()))
    }

    /// Every call fails to spawn.
    pub fn spawn_error(msg: &'static str) -> Self {
        Self::responding(move |_, _| bail!("{msg}"))
    }

    pub fn calls(&self) -> Vec<(String, Vec<String>)> {
        self.calls.lock().expect("calls lock").clone()
    }

    pub fn last_args(&self) -> Vec<String> {
        self.calls().last().map(|(_, a)| a.clone()).unwrap_or_default()
    }

    pub fn stdin(&self) -> Vec<Vec<u8>> {
        self.stdin.lock().expect("stdin lock").clone()
    }

    fn record(&self, program: &str, args: &[&str]) -> Result<Output> {
        let args: Vec<String> = args.iter().map(|a| (*a).to_owned()).collect();
        self.calls
            .lock()
            .expect("calls lock")
            .push((program.to_owned(), args.clone()));
        (self.respond)(program, &args)
    }
}

impl CommandRunner for RecordingRunner {
    async fn run(&self, program: &str, args: &[&str]) -> Result<Output> {
        self.record(program, args)
    }

    async fn run_with_stdin(&self, program: &str, args: &[&str], input: &[u8]) -> Result<Output> {
        self.stdin.lock().expect("stdin lock").push(input.to_vec());
        self.record(program, args)
    }
}

// ── FakeProvisioner ──────────────────────────────────────────────────────────

/// Outputs a healthy deployment of `variant` reports.
pub fn healthy_outputs(variant: &str) -> HashMap<String, String> {
    let resource = format!("ex-tf-lambda-api-{variant}");
    HashMap::from([
        (
            "arn".to_owned(),
            "arn:aws:apigateway:us-east-1::/apis/a1b2c3".to_owned(),
        ),
        ("domain_name".to_owned(), format!("{resource}.{HOSTED_ZONE}")),
        (
            "ecr_repo_url".to_owned(),
            format!("{ACCOUNT_ID}.dkr.ecr.us-east-1.amazonaws.com/{resource}"),
        ),
        ("alternate_domain_name".to_owned(), ALT_DOMAIN.to_owned()),
        (
            "alternate_domain_endpoint".to_owned(),
            "d-abc123.execute-api.us-east-1.amazonaws.com".to_owned(),
        ),
    ])
}

/// In-memory provisioner. Journal entries look like `terraform apply`,
/// `terraform apply -target=module.ecr`, `terraform output arn`.
pub struct FakeProvisioner {
    journal: Journal,
    outputs: HashMap<String, String>,
    fail_at: Option<String>,
    seen: Mutex<Vec<ProvisionOptions>>,
}

impl FakeProvisioner {
    pub fn new(journal: &Journal, variant: &str) -> Self {
        Self {
            journal: journal.clone(),
            outputs: healthy_outputs(variant),
            fail_at: None,
            seen: Mutex::default(),
        }
    }

    /// Fail the call whose journal entry equals `entry`.
    #[must_use]
    pub fn failing_at(mut self, entry: &str) -> Self {
        self.fail_at = Some(entry.to_owned());
        self
    }

    #[must_use]
    pub fn with_output(mut self, name: &str, value: &str) -> Self {
        self.outputs.insert(name.to_owned(), value.to_owned());
        self
    }

    pub fn options_seen(&self) -> Vec<ProvisionOptions> {
        self.seen.lock().expect("seen lock").clone()
    }

    fn step(&self, entry: String, opts: &ProvisionOptions) -> Result<()> {
        self.seen.lock().expect("seen lock").push(opts.clone());
        self.journal.record(entry.clone());
        if self.fail_at.as_deref() == Some(entry.as_str()) {
            bail!("{entry} failed: Error acquiring the state lock");
        }
        Ok(())
    }
}

impl Provisioner for FakeProvisioner {
    async fn init(&self, opts: &ProvisionOptions) -> Result<()> {
        self.step("terraform init".to_owned(), opts)
    }

    async fn apply(&self, opts: &ProvisionOptions) -> Result<()> {
        let entry = if opts.targets.is_empty() {
            "terraform apply".to_owned()
        } else {
            format!("terraform apply -target={}", opts.targets.join(","))
        };
        self.step(entry, opts)
    }

    async fn output(&self, opts: &ProvisionOptions, name: &str) -> Result<String> {
        self.step(format!("terraform output {name}"), opts)?;
        match self.outputs.get(name) {
            Some(value) => Ok(value.clone()),
            None => bail!("Output \"{name}\" not found"),
        }
    }

    async fn destroy(&self, opts: &ProvisionOptions) -> Result<()> {
        self.step("terraform destroy".to_owned(), opts)
    }
}

// ── FakeContainers ───────────────────────────────────────────────────────────

/// In-memory container tool. Journal entries look like `docker run docker`.
pub struct FakeContainers {
    journal: Journal,
    fail_at: Option<String>,
    logins: Mutex<Vec<RegistryCredentials>>,
    builds: Mutex<Vec<(String, ImageBuild)>>,
    runs: Mutex<Vec<ContainerRun>>,
}

impl FakeContainers {
    pub fn new(journal: &Journal) -> Self {
        Self {
            journal: journal.clone(),
            fail_at: None,
            logins: Mutex::default(),
            builds: Mutex::default(),
            runs: Mutex::default(),
        }
    }

    #[must_use]
    pub fn failing_at(mut self, entry: &str) -> Self {
        self.fail_at = Some(entry.to_owned());
        self
    }

    pub fn logins(&self) -> Vec<RegistryCredentials> {
        self.logins.lock().expect("logins lock").clone()
    }

    pub fn builds(&self) -> Vec<(String, ImageBuild)> {
        self.builds.lock().expect("builds lock").clone()
    }

    pub fn runs(&self) -> Vec<ContainerRun> {
        self.runs.lock().expect("runs lock").clone()
    }

    fn step(&self, entry: String) -> Result<()> {
        self.journal.record(entry.clone());
        if self.fail_at.as_deref() == Some(entry.as_str()) {
            bail!("{entry} failed: exit status 1");
        }
        Ok(())
    }
}

impl ContainerTool for FakeContainers {
    async fn build(&self, context_dir: &Path, opts: &ImageBuild) -> Result<()> {
        self.builds
            .lock()
            .expect("builds lock")
            .push((context_dir.display().to_string(), opts.clone()));
        self.step(format!("docker build {}", opts.tags.join(",")))
    }

    async fn run(&self, image: &str, opts: &ContainerRun) -> Result<()> {
        self.runs.lock().expect("runs lock").push(opts.clone());
        self.step(format!("docker run {} {image}", opts.name))
    }

    async fn stop(&self, names: &[&str], opts: &ContainerStop) -> Result<()> {
        self.step(format!("docker stop --time {} {}", opts.grace_secs, names.join(" ")))
    }

    async fn push(&self, tag: &str) -> Result<()> {
        self.step(format!("docker push {tag}"))
    }

    async fn login(&self, creds: &RegistryCredentials) -> Result<String> {
        self.logins.lock().expect("logins lock").push(creds.clone());
        self.step(format!("docker login {}", creds.registry))?;
        Ok("Login Succeeded".to_owned())
    }
}

// ── FakeCloud ────────────────────────────────────────────────────────────────

/// `base64("AWS:<password>")`, the shape ECR returns.
pub fn encode_token(password: &str) -> String {
    base64::engine::general_purpose::STANDARD.encode(format!("AWS:{password}"))
}

/// In-memory cloud API.
pub struct FakeCloud {
    journal: Journal,
    tokens: Vec<String>,
    log_group: LogGroupDeletion,
    fail_identity: bool,
}

impl FakeCloud {
    pub fn new(journal: &Journal) -> Self {
        Self {
            journal: journal.clone(),
            tokens: vec![encode_token(REGISTRY_PASSWORD)],
            log_group: LogGroupDeletion::NotFound,
            fail_identity: false,
        }
    }

    #[must_use]
    pub fn with_tokens(mut self, tokens: Vec<String>) -> Self {
        self.tokens = tokens;
        self
    }

    #[must_use]
    pub fn with_stale_log_group(mut self) -> Self {
        self.log_group = LogGroupDeletion::Deleted;
        self
    }

    #[must_use]
    pub fn failing_identity(mut self) -> Self {
        self.fail_identity = true;
        self
    }
}

impl CloudApi for FakeCloud {
    async fn caller_account_id(&self) -> Result<String> {
        self.journal.record("sts get-caller-identity");
        if self.fail_identity {
            bail!("ExpiredToken: The security token included in the request is expired");
        }
        Ok(ACCOUNT_ID.to_owned())
    }

    async fn registry_authorization_tokens(&self) -> Result<Vec<String>> {
        self.journal.record("ecr get-authorization-token");
        Ok(self.tokens.clone())
    }

    async fn delete_log_group(&self, name: &str) -> Result<LogGroupDeletion> {
        self.journal.record(format!("logs delete-log-group {name}"));
        Ok(self.log_group)
    }
}

// ── ScriptedHttp ─────────────────────────────────────────────────────────────

/// One scripted probe result. `Err` stands for "no response".
#[derive(Clone)]
pub enum Scripted {
    Answer(HttpResponse),
    Refused,
    BodyLost,
}

pub fn response(status: u16, body: &str) -> Scripted {
    Scripted::Answer(HttpResponse {
        status,
        body: body.to_owned(),
    })
}

pub fn refused() -> Scripted {
    Scripted::Refused
}

/// Headers arrive but the connection drops mid-body.
pub fn body_lost() -> Scripted {
    Scripted::BodyLost
}

/// HTTP probe that replays a per-URL script. The last entry of a script
/// repeats forever; unknown URLs refuse the connection.
#[derive(Default)]
pub struct ScriptedHttp {
    journal: Journal,
    scripts: Mutex<HashMap<String, VecDeque<Scripted>>>,
    calls: Mutex<HashMap<String, usize>>,
}

impl ScriptedHttp {
    pub fn new(journal: &Journal) -> Self {
        Self {
            journal: journal.clone(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn script(self, url: &str, steps: Vec<Scripted>) -> Self {
        self.scripts
            .lock()
            .expect("scripts lock")
            .insert(url.to_owned(), steps.into());
        self
    }

    pub fn calls_to(&self, url: &str) -> usize {
        self.calls
            .lock()
            .expect("calls lock")
            .get(url)
            .copied()
            .unwrap_or(0)
    }
}

impl HttpProbe for ScriptedHttp {
    async fn get(&self, url: &str) -> Result<HttpResponse> {
        self.journal.record(format!("GET {url}"));
        *self
            .calls
            .lock()
            .expect("calls lock")
            .entry(url.to_owned())
            .or_default() += 1;
        let mut scripts = self.scripts.lock().expect("scripts lock");
        let next = match scripts.get_mut(url) {
            Some(queue) if queue.len() > 1 => queue.pop_front(),
            Some(queue) => queue.front().cloned(),
            None => None,
        };
        match next {
            Some(Scripted::Answer(response)) => Ok(response),
            Some(Scripted::BodyLost) => Err(ProbeError::UnreadableBody {
                url: url.to_owned(),
                reason: "connection closed before message completed".to_owned(),
            }
            .into()),
            Some(Scripted::Refused) | None => bail!("connection refused"),
        }
    }
}

// ── RecordingReporter ────────────────────────────────────────────────────────

/// Collects progress messages as `step: ...`, `ok: ...`, `warn: ...`.
#[derive(Default)]
pub struct RecordingReporter {
    messages: Mutex<Vec<String>>,
}

impl RecordingReporter {
    pub fn messages(&self) -> Vec<String> {
        self.messages.lock().expect("messages lock").clone()
    }

    pub fn any(&self, needle: &str) -> bool {
        self.messages().iter().any(|m| m.contains(needle))
    }
}

impl ProgressReporter for RecordingReporter {
    fn step(&self, message: &str) {
        self.messages
            .lock()
            .expect("messages lock")
            .push(format!("step: {message}"));
    }

    fn success(&self, message: &str) {
        self.messages
            .lock()
            .expect("messages lock")
            .push(format!("ok: {message}"));
    }

    fn warn(&self, message: &str) {
        self.messages
            .lock()
            .expect("messages lock")
            .push(format!("warn: {message}"));
    }
}
