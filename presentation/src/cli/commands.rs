//! CLI command definitions

use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Output format for consultation results
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Full transcript, votes and final summary
    Full,
    /// Only the final summary
    Summary,
    /// JSON output
    Json,
}

/// CLI arguments for consilium
#[derive(Parser, Debug)]
#[command(name = "consilium")]
#[command(author, version, about = "Multi-agent medical consultation with elimination voting")]
#[command(long_about = r#"
Consilium runs a panel of LLM agents that discuss a patient case.

Each round has two phases:
1. Discussion: every active agent speaks once, in turn order
2. Voting: every active agent names the least accurate contributor

A unique top-voted agent is eliminated. The consultation ends when one
agent remains or too many rounds pass without an elimination, and a
final summary is written.

Configuration files are loaded from (in priority order):
1. --config <path>       Explicit config file
2. ./consilium.toml      Project-level config
3. ~/.config/consilium/config.toml   Global config

Example:
  consilium consult --case case.toml
  consilium kb add "Pneumonia guideline" --file guideline.md --tags lung
  consilium kb search "fever and cough"
"#)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

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

    /// Write daily rolling log files into this directory
    #[arg(long, global = true, value_name = "DIR")]
    pub log_dir: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run a consultation on a case file
    Consult(ConsultArgs),

    /// Manage the knowledge base
    #[command(subcommand)]
    Kb(KbCommand),

    /// Inspect or change stored settings
    #[command(subcommand)]
    Config(ConfigCommand),

    /// List the models offered by a provider
    Models(ModelsArgs),
}

#[derive(Args, Debug)]
pub struct ConsultArgs {
    /// Case file (TOML or JSON)
    #[arg(long, value_name = "FILE")]
    pub case: PathBuf,

    /// Restrict retrieval to these knowledge document ids
    #[arg(long = "knowledge", value_name = "DOC_ID")]
    pub knowledge: Vec<String>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "full")]
    pub output: OutputFormat,

    /// Read pause/resume/quit commands from stdin while running
    #[arg(long)]
    pub interactive: bool,

    /// Print each reply as it is revealed instead of progress bars
    #[arg(long)]
    pub stream: bool,
}

#[derive(Subcommand, Debug)]
pub enum KbCommand {
    /// Add a document from a file
    Add {
        title: String,
        #[arg(long, value_name = "FILE")]
        file: PathBuf,
        /// Comma-separated tags
        #[arg(long, value_delimiter = ',')]
        tags: Vec<String>,
        #[arg(long)]
        collection: Option<String>,
        /// Store the document without computing embeddings
        #[arg(long)]
        no_embed: bool,
    },

    /// List documents, optionally filtered
    List {
        #[arg(long)]
        query: Option<String>,
        #[arg(long)]
        tag: Vec<String>,
    },

    /// Remove a document and its chunks
    Remove { id: String },

    /// Recompute the chunks and embeddings of a document
    Reembed { id: String },

    /// Run a hybrid retrieval query
    Search {
        query: String,
        /// Restrict the search to these document ids
        #[arg(long = "doc", value_name = "DOC_ID")]
        doc: Vec<String>,
        #[arg(long)]
        top_k: Option<f64>,
        #[arg(long)]
        keyword_weight: Option<f64>,
    },

    /// Merge documents from a JSON export
    Import { file: PathBuf },

    /// Print all documents as JSON
    Export,
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommand {
    /// Show configuration sources, panel and stored settings
    Show,

    /// Change the default retrieval parameters
    SetRetrieval {
        #[arg(long)]
        top_k: f64,
        #[arg(long)]
        keyword_weight: f64,
    },

    /// Change the embedding provider settings
    SetEmbedding {
        #[arg(long)]
        model: Option<String>,
        #[arg(long)]
        api_key: Option<String>,
        #[arg(long)]
        base_url: Option<String>,
    },
}

#[derive(Args, Debug)]
pub struct ModelsArgs {
    /// openai, anthropic, gemini, siliconflow or modelscope
    #[arg(long)]
    pub provider: String,
    #[arg(long)]
    pub api_key: Option<String>,
    #[arg(long)]
    pub base_url: Option<String>,
}
