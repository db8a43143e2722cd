//! CLI command definitions

use clap::{Args, Parser, Subcommand, ValueEnum};
use compend_domain::OutputFormat;
use std::path::PathBuf;

/// Output format for `compend list`
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputArg {
    /// Table with colored status
    Text,
    /// JSON array of rows
    Json,
}

impl From<OutputArg> for OutputFormat {
    fn from(arg: OutputArg) -> Self {
        match arg {
            OutputArg::Text => OutputFormat::Text,
            OutputArg::Json => OutputFormat::Json,
        }
    }
}

/// CLI arguments for compend
#[derive(Parser, Debug)]
#[command(name = "compend")]
#[command(author, version, about = "Document session client - upload, track, and query documents")]
#[command(long_about = r#"
Compend talks to a document question-answering backend: upload files, watch
their ingestion status, delete them, and ask questions answered from the
processed documents.

Every command except `login` and `logout` requires a prior `compend login`.
The access key only keeps casual users out of the client; it is NOT a
security boundary and the backend does not check it.

Configuration is loaded from (in priority order):
1. COMPEND_<SECTION>__<KEY>   Environment (e.g. COMPEND_API__BASE_URL)
2. --config <path>            Explicit config file
3. ./compend.toml             Project-level config
4. ~/.config/compend/config.toml   Global config

Example:
  compend --api-url http://localhost:8000 login
  compend upload report.pdf notes.md
  compend watch
  compend ask "What is in report.pdf?"
  compend chat
"#)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,

    /// Verbosity level (-v = info, -vv = debug, -vvv = trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress progress indicators
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Path to configuration file
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Disable loading of configuration files
    #[arg(long, global = true)]
    pub no_config: bool,

    /// Show configuration file locations and exit
    #[arg(long)]
    pub show_config: bool,

    /// Backend base URL (overrides configuration)
    #[arg(long, global = true, value_name = "URL")]
    pub api_url: Option<String>,

    /// Also write logs to this file
    #[arg(long, global = true, value_name = "PATH")]
    pub log_file: Option<PathBuf>,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Open the access gate (not a security boundary)
    Login {
        /// Access key; prompted for when omitted
        #[arg(long)]
        key: Option<String>,
    },

    /// Close the access gate
    Logout,

    /// Show documents and their ingestion status
    List {
        /// Output format (defaults to the configured one)
        #[arg(short, long, value_enum)]
        output: Option<OutputArg>,
    },

    /// Upload files, one at a time
    Upload(UploadArgs),

    /// Delete documents by name
    Delete {
        /// Document names as shown by `compend list`
        #[arg(required = true, value_name = "NAME")]
        names: Vec<String>,
    },

    /// Ask a question answered from the processed documents
    Ask {
        /// The question
        #[arg(required = true, num_args = 1.., value_name = "QUESTION")]
        question: Vec<String>,
    },

    /// Wait for the backend, then keep the document list on screen
    Watch,

    /// Interactive session with background refresh
    Chat,
}

#[derive(Args, Debug, Clone, PartialEq, Eq)]
pub struct UploadArgs {
    /// Files to upload
    #[arg(required = true, value_name = "PATH")]
    pub paths: Vec<PathBuf>,
}

impl Command {
    /// Commands that work without the access flag.
    pub fn bypasses_gate(&self) -> bool {
        matches!(self, Command::Login { .. } | Command::Logout)
    }
}
