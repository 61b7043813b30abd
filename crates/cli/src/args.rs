//! Command-line arguments.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use docforge_core::{JobId, RecordKey, RecordKind, SourceRecordId, TemplateCode};

#[derive(Debug, Parser)]
#[command(name = "docforge", version, about = "Generate documents through the backend job API")]
pub struct Cli {
    /// Backend base URL; overrides DOCFORGE_API_URL.
    #[arg(long, global = true)]
    pub api_url: Option<String>,

    /// Bearer token; overrides DOCFORGE_API_TOKEN.
    #[arg(long, global = true)]
    pub token: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Submit a generation job, wait for it and save the document.
    Generate(GenerateArgs),
    /// Print the current status of a job as JSON.
    Status(JobArgs),
    /// Download the document of a finished job.
    Fetch(FetchArgs),
}

#[derive(Debug, Args)]
pub struct RecordArgs {
    /// Record kind: `submission`, `referat`, or a custom path segment.
    #[arg(long)]
    pub kind: RecordKind,

    /// Source record identifier.
    #[arg(long)]
    pub record: SourceRecordId,
}

impl RecordArgs {
    pub fn key(&self) -> RecordKey {
        RecordKey {
            kind: self.kind.clone(),
            source_record_id: self.record.clone(),
        }
    }
}

#[derive(Debug, Args)]
pub struct GenerateArgs {
    #[command(flatten)]
    pub record: RecordArgs,

    /// Template code.
    #[arg(long)]
    pub template: TemplateCode,

    /// Human-readable template name.
    #[arg(long)]
    pub template_name: String,

    /// Directory the document is saved into.
    #[arg(long, default_value = ".")]
    pub out: PathBuf,
}

#[derive(Debug, Args)]
pub struct JobArgs {
    #[command(flatten)]
    pub record: RecordArgs,

    #[arg(long)]
    pub job: JobId,
}

#[derive(Debug, Args)]
pub struct FetchArgs {
    #[command(flatten)]
    pub job: JobArgs,

    #[arg(long, default_value = ".")]
    pub out: PathBuf,
}
