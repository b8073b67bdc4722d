//! CLI command definitions and parsing
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "sectionrank",
    version,
    author = "neur0map",
    about = "Rank the document sections most relevant to a persona and a task",
    long_about = "sectionrank processes collections of PDFs, each with a persona.txt and job.txt, \
                  selects the sections whose headings best match the persona's task using BM25 \
                  followed by semantic reranking, and writes the selected sections together with \
                  the reconstructed text of their pages as JSON."
)]
pub struct Cli {
    /// Global config file path (defaults to ~/.config/sectionrank/config.toml)
    #[arg(short, long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Profile to apply from the config file (e.g., "fast")
    #[arg(short, long, global = true)]
    pub profile: Option<String>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Process every collection in the input directory
    Run {
        /// Directory whose sub-directories are collections
        #[arg(short, long, value_name = "DIR")]
        input: Option<PathBuf>,

        /// Directory receiving one JSON result per collection
        #[arg(short, long, value_name = "DIR")]
        output: Option<PathBuf>,

        /// Number of sections to select per collection
        #[arg(short = 'k', long)]
        top_k: Option<usize>,

        /// Number of lexical results passed to semantic reranking
        #[arg(short, long)]
        window: Option<usize>,
    },

    /// Process a single collection directory
    Rank {
        /// Collection directory containing PDFs, persona.txt and job.txt
        collection: PathBuf,

        /// Directory receiving the JSON result
        #[arg(short, long, value_name = "DIR")]
        output: Option<PathBuf>,

        /// Print the result to stdout instead of writing a file
        #[arg(long)]
        json: bool,
    },

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Show the effective configuration
    Show,

    /// Validate configuration file
    Validate {
        /// Path to config file (defaults to standard location)
        #[arg(short, long)]
        file: Option<PathBuf>,
    },

    /// Initialize default configuration
    Init {
        /// Force overwrite existing config
        #[arg(short, long)]
        force: bool,
    },
}

impl Cli {
    /// Parse CLI arguments from command line
    pub fn parse_args() -> Self {
        Self::parse()
    }
}
