//! CLI argument parsing and command dispatch.
//!
//! # Commands
//!
//! - `serve`: serve the HTTP API
//! - `extract <url>`: mine one repository and print its frequency table
//!
//! Every flag that configures extraction also reads an environment variable,
//! so the server can be configured without arguments:
//!
//! | Flag             | Environment variable     | Default          |
//! |------------------|--------------------------|------------------|
//! | `--bind`         | `FREQTABLE_BIND`         | `127.0.0.1:8080` |
//! | `--database`     | `FREQTABLE_DATABASE`     | in memory        |
//! | `--parse-policy` | `FREQTABLE_PARSE_POLICY` | `fatal`          |
//! | `--max-workers`  | `FREQTABLE_MAX_WORKERS`  | unbounded        |
//! | `--extension`    | `FREQTABLE_EXTENSIONS`   | `go`             |
//!
//! # Example
//!
//! ```bash
//! freqtable serve --bind 0.0.0.0:8080 --database /var/lib/freqtable/tables.db
//! freqtable extract https://github.com/src-d/go-siva --parse-policy tolerant
//! ```

use std::io;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{ArgAction, Args, Parser, Subcommand};
use colored::Colorize;
use freqtable::{
    CountMiner, CreateFrequencyTableUsecase, FrequencyTableRepository, GitCloner,
    InMemoryRepository, ParsePolicy, Processor, ProcessorConfig, SqliteRepository, factory_of,
};
use tokio::net::TcpListener;

use crate::output::{self, OutputOptions};
use crate::validation::validate_url;
use crate::{AppState, serve};

/// Freqtable - word frequency tables mined from source repositories
///
/// Clones a repository, parses its source files and counts the words that
/// make up every identifier.
#[derive(Parser, Debug)]
#[command(name = "freqtable")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Serve the HTTP API
    ///
    /// Tables created through `POST /frequency-tables` are stored in the
    /// configured database, or in memory when no database is set.
    Serve(ServeArgs),

    /// Extract the frequency table of one repository and print it
    ///
    /// Nothing is stored. Single-letter words are hidden unless `--all` is set.
    Extract(ExtractArgs),
}

/// Arguments of `serve`
#[derive(Args, Debug, Clone)]
pub struct ServeArgs {
    /// Address to listen on
    #[arg(long, env = "FREQTABLE_BIND", default_value = "127.0.0.1:8080")]
    pub bind: SocketAddr,

    /// `SQLite` database file; tables are kept in memory when omitted
    #[arg(long, env = "FREQTABLE_DATABASE")]
    pub database: Option<PathBuf>,

    /// Extraction settings
    #[command(flatten)]
    pub extraction: ExtractionArgs,
}

/// Arguments of `extract`
#[derive(Args, Debug, Clone)]
pub struct ExtractArgs {
    /// Repository URL (scheme://host/...)
    #[arg(value_parser = parse_url)]
    pub url: String,

    /// Print single-letter words too
    #[arg(long)]
    pub all: bool,

    /// Print at most this many words
    #[arg(long)]
    pub limit: Option<usize>,

    /// Extraction settings
    #[command(flatten)]
    pub extraction: ExtractionArgs,
}

/// Settings shared by every command that runs extractions
#[derive(Args, Debug, Clone)]
pub struct ExtractionArgs {
    /// What failed parses mean: fatal, tolerant or require-any
    #[arg(
        long,
        env = "FREQTABLE_PARSE_POLICY",
        default_value = "fatal",
        value_parser = parse_policy
    )]
    pub parse_policy: ParsePolicy,

    /// Cap on concurrent parse workers
    #[arg(long, env = "FREQTABLE_MAX_WORKERS")]
    pub max_workers: Option<usize>,

    /// File extensions to parse (repeat or separate with commas)
    #[arg(
        long = "extension",
        env = "FREQTABLE_EXTENSIONS",
        value_delimiter = ',',
        default_value = "go"
    )]
    pub extensions: Vec<String>,

    /// Branch to check out instead of the remote's default
    #[arg(long)]
    pub branch: Option<String>,
}

impl ExtractionArgs {
    /// Build a processor that clones with git and counts identifier words.
    ///
    /// # Errors
    ///
    /// Returns `Error::Config` if the worker cap is invalid.
    pub fn processor(&self) -> freqtable::Result<Processor> {
        let cloner = match &self.branch {
            Some(branch) => GitCloner::new().with_branch(branch),
            None => GitCloner::new(),
        };

        let mut config = ProcessorConfig::new(Arc::new(cloner), factory_of::<CountMiner>())
            .with_extensions(&self.extensions)
            .with_parse_policy(self.parse_policy);
        if let Some(workers) = self.max_workers {
            config = config.with_max_workers(workers);
        }

        Processor::new(config)
    }
}

/// Validate a parse policy name.
///
/// # Errors
///
/// Returns the list of accepted names if `s` is not one of them.
pub fn parse_policy(s: &str) -> std::result::Result<ParsePolicy, String> {
    s.parse::<ParsePolicy>().map_err(|e| e.to_string())
}

/// Validate a repository URL.
///
/// # Errors
///
/// Returns why `s` is not an absolute URL.
pub fn parse_url(s: &str) -> std::result::Result<String, String> {
    let s = s.trim();
    validate_url(s)?;
    Ok(s.to_string())
}

impl Cli {
    /// Parse arguments from the command line.
    #[must_use]
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Default log filter for the `-v` count; `RUST_LOG` takes precedence.
    #[must_use]
    pub fn log_filter(&self) -> &'static str {
        match self.verbose {
            0 => "freqtable=warn,freqtable_server=info",
            1 => "freqtable=info,freqtable_server=info",
            2 => "freqtable=debug,freqtable_server=debug",
            _ => "freqtable=trace,freqtable_server=trace",
        }
    }

    /// Execute the parsed command.
    ///
    /// # Errors
    ///
    /// Returns an error if the command fails.
    pub async fn execute(self) -> Result<()> {
        match self.command {
            Commands::Serve(args) => run_serve(args).await,
            Commands::Extract(args) => run_extract(args).await,
        }
    }
}

async fn run_serve(args: ServeArgs) -> Result<()> {
    let processor = Arc::new(args.extraction.processor()?);

    let tables: Arc<dyn FrequencyTableRepository> = match &args.database {
        Some(path) => Arc::new(
            SqliteRepository::open(path)
                .with_context(|| format!("Failed to open database {}", path.display()))?,
        ),
        None => {
            tracing::warn!("No database configured, tables are lost when the server stops");
            Arc::new(InMemoryRepository::new())
        }
    };
    let create = Arc::new(CreateFrequencyTableUsecase::new(
        processor,
        Arc::clone(&tables),
    ));

    let listener = TcpListener::bind(args.bind)
        .await
        .with_context(|| format!("Failed to bind {}", args.bind))?;
    serve(listener, AppState::new(create, tables)).await?;

    Ok(())
}

async fn run_extract(args: ExtractArgs) -> Result<()> {
    let processor = args.extraction.processor()?;
    let url = args.url.clone();
    let extraction = tokio::task::spawn_blocking(move || processor.run(&url))
        .await
        .context("Extraction task failed")?;

    let options = OutputOptions {
        min_word_len: if args.all { 1 } else { 2 },
        limit: args.limit,
    };
    output::write_extraction(&mut io::stdout().lock(), &extraction, &options)?;

    if let Err(e) = extraction.result() {
        eprintln!("{} {e}", "error:".red().bold());
        if let freqtable::Error::Parse { errors, .. } = e {
            for error in errors {
                eprintln!("  {error}");
            }
        }
    }
    extraction.into_result()?;

    Ok(())
}
