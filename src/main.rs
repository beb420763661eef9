//! Briefly CLI - summarise a web page or YouTube video
//!
//! The application logic is contained in lib.rs, and this file is responsible
//! for parsing arguments, wiring dependencies and handling top-level errors.

use briefly::agent::ChatClient;
use briefly::document::format_duration;
use briefly::loader::Loader;
use briefly::{pipeline, ui, Config, Document, Outcome, Pipeline};
use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::Shell;
use colored::Colorize;
use std::fs::{self, File};
use std::path::PathBuf;
use std::sync::Mutex;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser)]
#[command(name = "briefly")]
#[command(author, version, about = "Summarise any YouTube or website URL", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Summarise a URL and print the result
    Summarise {
        /// URL to summarise
        url: String,
        /// Show raw extracted text instead of summary
        #[arg(long)]
        raw: bool,
    },
    /// Generate shell completions
    Completions {
        /// Target shell
        shell: Shell,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Completions { shell }) => {
            clap_complete::generate(shell, &mut Cli::command(), "briefly", &mut std::io::stdout());
        }
        Some(Commands::Summarise { url, raw: true }) => {
            let config = startup(false)?;
            // Extraction only; no model call, so no credential needed
            let loader = Loader::new(&config.fetch)?;
            let document = pipeline::extract(&loader, &url).await?;
            print_header(&document);
            println!("{}", document.text);
            println!(
                "\n{}",
                format!("--- Extracted {} characters ---", document.char_count()).dimmed()
            );
        }
        Some(Commands::Summarise { url, raw: false }) => {
            let config = startup(false)?;
            let pipeline = build_pipeline(&config)?;

            println!("{} {}", "Fetching:".dimmed(), url);
            match pipeline.run(&url).await {
                Outcome::EmptyInput => fail("No URL entered."),
                Outcome::InvalidUrl => fail("Invalid URL format."),
                Outcome::Summarised { document, summary } => {
                    print_header(&document);
                    println!("{}", "Summary:".green().bold());
                    println!("{}", summary);
                }
                Outcome::Failed(e) => {
                    eprintln!("{}", "An error occurred:".red().bold());
                    for (depth, message) in e.chain().iter().enumerate() {
                        if depth == 0 {
                            eprintln!("  {message}");
                        } else {
                            eprintln!("  caused by: {message}");
                        }
                    }
                    std::process::exit(1);
                }
            }
        }
        None => {
            // Default: Launch the TUI
            let config = startup(true)?;
            let pipeline = build_pipeline(&config)?;
            ui::run(&pipeline).await?;
        }
    }

    Ok(())
}

fn startup(interactive: bool) -> anyhow::Result<Config> {
    init_logging(interactive)?;
    Ok(Config::load()?)
}

/// Build the loader and LLM client once. A missing API key is fatal here,
/// before anything is fetched or drawn.
fn build_pipeline(config: &Config) -> anyhow::Result<Pipeline<Loader, ChatClient>> {
    let api_key = match config.api_key() {
        Ok(key) => key,
        Err(e) => {
            eprintln!("{} {}", "Error:".red().bold(), e);
            std::process::exit(1);
        }
    };

    let loader = Loader::new(&config.fetch)?;
    let llm = ChatClient::new(&config.agent, api_key)?;
    Ok(Pipeline::new(loader, llm))
}

fn print_header(document: &Document) {
    println!("\n=== {} ===", document.display_title().bold());
    let meta = &document.metadata;
    if let Some(author) = &meta.author {
        let length = meta.duration.map(format_duration).unwrap_or_default();
        println!("{} {}", author.cyan(), length.dimmed());
    }
    println!();
}

fn fail(message: &str) -> ! {
    eprintln!("{}", message.red().bold());
    std::process::exit(1);
}

/// Log to stderr for one-shot commands, to a file while the TUI owns the screen
fn init_logging(interactive: bool) -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("briefly=info"));
    let registry = tracing_subscriber::registry().with(filter);

    if interactive {
        let path = log_path();
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir)?;
        }
        let file = File::options().create(true).append(true).open(&path)?;
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .with_ansi(false)
                    .with_writer(Mutex::new(file)),
            )
            .init();
    } else {
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .with_target(false)
                    .with_writer(std::io::stderr),
            )
            .init();
    }
    Ok(())
}

fn log_path() -> PathBuf {
    dirs::cache_dir()
        .unwrap_or_else(std::env::temp_dir)
        .join("briefly")
        .join("briefly.log")
}
