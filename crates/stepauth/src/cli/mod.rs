//! CLI definitions and subcommand implementations for the stepauth binary.

pub mod login_cmd;
pub mod output;

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// Run multi-step HTTP login sequences with dynamic parameters.
#[derive(Debug, Parser)]
#[command(name = "stepauth", version, about)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Machine-readable JSON output on stdout.
    #[arg(long, global = true)]
    pub json: bool,

    /// Suppress progress output.
    #[arg(long, short, global = true)]
    pub quiet: bool,

    /// Show extracted values and request details.
    #[arg(long, short, global = true)]
    pub verbose: bool,

    /// Disable colored output.
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Emit logs as JSON lines.
    #[arg(long, global = true)]
    pub log_json: bool,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Run a declarative step list (JSON array of steps).
    Steps {
        /// File containing the step array.
        file: PathBuf,

        /// Optional parameter file supplying credentials.
        #[arg(long)]
        params: Option<PathBuf>,

        #[command(flatten)]
        run: RunArgs,
    },

    /// Run a `;`-delimited list of `METHOD url` entries with shared templates.
    Urls {
        /// Entries such as "GET https://host/login; POST https://host/login".
        #[arg(long)]
        login_urls: String,

        /// Body template shared by every POST step.
        #[arg(long)]
        post_data: String,

        /// `;`-delimited dynamic parameter names.
        #[arg(long)]
        dynamic_names: Option<String>,

        /// `;`-delimited `name=value` cookie template.
        #[arg(long)]
        cookies: Option<String>,

        /// `;`-delimited `Name: value` header template.
        #[arg(long)]
        headers: Option<String>,

        /// JSON path read for every dynamic parameter.
        #[arg(long)]
        json_path: Option<String>,

        #[command(flatten)]
        run: RunArgs,
    },

    /// Run whichever sequence a host parameter file configures.
    Params {
        /// JSON object of host parameters.
        file: PathBuf,

        #[command(flatten)]
        run: RunArgs,
    },
}

/// Options shared by every run subcommand.
#[derive(Debug, Clone, Args)]
pub struct RunArgs {
    /// Per-request timeout in seconds.
    #[arg(long, default_value_t = 30)]
    pub timeout: u64,

    /// Let the HTTP client follow redirects.
    #[arg(long)]
    pub follow_redirects: bool,

    /// Append unreferenced parameters to POST bodies only.
    #[arg(long)]
    pub body_only_append: bool,

    /// Append a JSONL transcript (default ~/.stepauth/transcript.jsonl).
    #[arg(long)]
    pub transcript: Option<Option<PathBuf>>,

    /// Regex that identifies a logged-in final response.
    #[arg(long)]
    pub logged_in: Option<String>,

    /// Regex that identifies a logged-out final response.
    #[arg(long)]
    pub logged_out: Option<String>,
}
