//! Command-line definitions.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "first-agent")]
#[command(author, version, about = "Search-then-answer agent and web page extractor")]
#[command(long_about = r#"
Credentials are read from the environment (a .env file in the working
directory is loaded first):

  TAVILY_API_KEY   Tavily search key
  LLM_API_KEY      key for the OpenAI-compatible endpoint
  LLM_BASE_URL     e.g. https://api.openai.com/v1
  LLM_MODEL_ID     e.g. gpt-4o-mini

Non-secret settings live in config/default.toml (or --config <PATH>).

Example:
  first-agent check
  first-agent ask "What changed in the latest Rust edition?"
  first-agent extract https://docs.python.org/3/tutorial/ -o notes
"#)]
pub struct Cli {
    /// Path to configuration file (default: config/default.toml)
    #[arg(short = 'f', long, value_name = "PATH", global = true)]
    pub config: Option<String>,

    /// Increase logging verbosity (-v warn, -vv info, -vvv debug, -vvvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Also append logs to this file
    #[arg(long, value_name = "PATH", global = true)]
    pub log_file: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Report which credentials are configured (values masked)
    Check {
        /// Also send a HEAD request to the LLM endpoint
        #[arg(long)]
        ping: bool,
    },
    /// Run a web search and print the results
    Search {
        query: String,

        /// Number of results (1-20)
        #[arg(short = 'n', long, value_name = "N")]
        max_results: Option<usize>,
    },
    /// Search the web, then answer the question with the LLM
    Ask { question: String },
    /// Download a page and save its structure as Markdown
    Extract {
        url: String,

        /// Directory for the Markdown file
        #[arg(short, long, value_name = "DIR")]
        output_dir: Option<PathBuf>,

        /// Request timeout in seconds
        #[arg(long, value_name = "SECS")]
        timeout: Option<u64>,
    },
}
