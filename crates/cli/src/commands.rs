//! Subcommand implementations.

use std::path::Path;
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::Context;
use tracing::info;

use docforge_client::config::{API_TOKEN_VAR, API_URL_VAR};
use docforge_client::{ClientConfig, HttpJobBackend, JobBackend};
use docforge_core::{Artifact, GenerationRequest, Job, TemplateRef};
use docforge_jobs::{
    CancellationToken, DocumentGenerator, GenerationOutcome, PollPolicy, StagedArtifact,
    TracingNotificationSink, save_into,
};

use crate::args::{Cli, Command, FetchArgs, GenerateArgs, JobArgs};

/// Exit status when the job did not finish while we were watching.
pub const EXIT_INCOMPLETE: u8 = 2;

/// Non-error result of a command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunStatus {
    Success,
    /// Timed out or interrupted; the job may still finish server-side.
    Incomplete,
}

impl From<RunStatus> for ExitCode {
    fn from(status: RunStatus) -> Self {
        match status {
            RunStatus::Success => ExitCode::SUCCESS,
            RunStatus::Incomplete => ExitCode::from(EXIT_INCOMPLETE),
        }
    }
}

pub async fn run(cli: Cli) -> anyhow::Result<RunStatus> {
    let config = client_config(&cli, |key| std::env::var(key).ok())?;
    let backend = Arc::new(HttpJobBackend::new(&config).context("failed to build HTTP client")?);
    info!(base_url = backend.base_url(), "using document backend");

    match cli.command {
        Command::Generate(args) => {
            let policy = PollPolicy::from_env().context("invalid polling configuration")?;
            let cancel = CancellationToken::new();
            cancel_on_interrupt(cancel.clone());
            generate(backend, policy, args, &cancel).await
        }
        Command::Status(args) => status(backend.as_ref(), &args).await,
        Command::Fetch(args) => fetch(backend.as_ref(), &args).await,
    }
}

/// Client settings from `lookup`, with command-line flags taking precedence.
pub fn client_config<F>(cli: &Cli, lookup: F) -> anyhow::Result<ClientConfig>
where
    F: Fn(&str) -> Option<String>,
{
    ClientConfig::from_lookup(|key| match key {
        API_URL_VAR if cli.api_url.is_some() => cli.api_url.clone(),
        API_TOKEN_VAR if cli.token.is_some() => cli.token.clone(),
        _ => lookup(key),
    })
    .context("invalid client configuration")
}

fn cancel_on_interrupt(cancel: CancellationToken) {
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("interrupted; no longer waiting for the job");
            cancel.cancel();
        }
    });
}

pub async fn generate<B: JobBackend>(
    backend: Arc<B>,
    policy: PollPolicy,
    args: GenerateArgs,
    cancel: &CancellationToken,
) -> anyhow::Result<RunStatus> {
    let generator =
        DocumentGenerator::new(backend, Arc::new(TracingNotificationSink)).with_policy(policy);
    let request = GenerationRequest::new(
        args.record.kind,
        args.record.record,
        TemplateRef::new(args.template, args.template_name),
    );

    match generator.generate(request, cancel).await? {
        GenerationOutcome::Completed { artifact, .. } => {
            let staged = StagedArtifact::stage(&artifact).context("failed to stage document")?;
            let path = staged
                .persist(&args.out)
                .with_context(|| format!("failed to save document into {}", args.out.display()))?;
            println!("{}", path.display());
            Ok(RunStatus::Success)
        }
        GenerationOutcome::TimedOut { job } | GenerationOutcome::Cancelled { job } => {
            eprintln!("{}", resume_hint(&job));
            Ok(RunStatus::Incomplete)
        }
    }
}

/// Tells the user how to look the job up again once we stop waiting.
fn resume_hint(job: &Job) -> String {
    format!(
        "job {id} has not finished; check it later with \
         `docforge status --kind {kind} --record {record} --job {id}`",
        id = job.job_id,
        kind = job.kind,
        record = job.source_record_id,
    )
}

pub async fn status<B: JobBackend + ?Sized>(backend: &B, args: &JobArgs) -> anyhow::Result<RunStatus> {
    let snapshot = backend
        .job_status(&args.record.key(), &args.job)
        .await
        .with_context(|| format!("failed to check job {}", args.job))?;

    let body = serde_json::json!({
        "job_id": args.job,
        "status": snapshot.status,
        "error": snapshot.error,
    });
    println!("{}", serde_json::to_string_pretty(&body)?);
    Ok(RunStatus::Success)
}

pub async fn fetch<B: JobBackend + ?Sized>(backend: &B, args: &FetchArgs) -> anyhow::Result<RunStatus> {
    let path = download_into(backend, &args.job, &args.out).await?;
    println!("{}", path.display());
    Ok(RunStatus::Success)
}

async fn download_into<B: JobBackend + ?Sized>(
    backend: &B,
    job: &JobArgs,
    dir: &Path,
) -> anyhow::Result<std::path::PathBuf> {
    let download = backend
        .download(&job.record.key(), &job.job)
        .await
        .with_context(|| format!("failed to download job {}", job.job))?;

    let filename = download
        .filename
        .unwrap_or_else(|| format!("{}.bin", job.job));
    let mut artifact = Artifact::new(job.job.clone(), filename, download.bytes);
    if let Some(content_type) = download.content_type {
        artifact = artifact.with_content_type(content_type);
    }

    save_into(&artifact, dir).with_context(|| format!("failed to save document into {}", dir.display()))
}
