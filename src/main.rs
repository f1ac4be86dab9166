//! Blindmark - combinatorial text watermarking
//!
//! A CLI tool that hides a bit-string in a text by choosing one
//! meaning-preserving rewrite per sentence, and recovers it blindly.

mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use commands::{CapacityCommand, CommandExecutor, EmbedCommand, ExtractCommand};

/// Blindmark - combinatorial text watermarking
///
/// Every sentence gets a list of rewrites that survive a blind consistency
/// check; the message selects one rewrite per sentence.
#[derive(Parser)]
#[command(name = "blindmark")]
#[command(version)]
#[command(about = "Blind combinatorial text watermarking")]
#[command(long_about = None)]
struct Cli {
    /// Enable debug logging (RUST_LOG overrides)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show per-sentence variant counts and the capacity of a text
    Capacity(CapacityCommand),

    /// Embed a binary message into a text
    Embed(EmbedCommand),

    /// Recover the binary message from a watermarked text
    Extract(ExtractCommand),

    /// Print an example configuration file
    ExampleConfig,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    setup_logging(cli.verbose);

    match cli.command {
        Commands::Capacity(cmd) => cmd.execute(),
        Commands::Embed(cmd) => cmd.execute(),
        Commands::Extract(cmd) => cmd.execute(),
        Commands::ExampleConfig => {
            print_example_config();
            Ok(())
        }
    }
}

/// Log level used when `RUST_LOG` is not set.
fn default_level(verbose: bool) -> &'static str {
    if verbose {
        "debug"
    } else {
        "info"
    }
}

fn setup_logging(verbose: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_level(verbose)));
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_ids(false)
        .compact()
        .finish();
    tracing::subscriber::set_global_default(subscriber).expect("Failed to set subscriber");
}

fn print_example_config() {
    let example = r#"# blindmark configuration file

[watermark]
# "mask-only": accept a rewrite when the substitution sites are reproduced
# "mask-and-keywords": additionally require identical keywords and entities
acceptance = "mask-only"
# Check the combinations of a sentence on all cores
parallel = true
# Log a warning when a sentence has more combinations than this
combination_warning_threshold = 4096

[lexicon]
# Maximum substitution sites per sentence
max_masks = 3
# Candidates per site
top_k = 8
# Words that are never substituted
custom_keywords = ["watermark"]
# Interchangeable words; candidate order is the order listed here
groups = [
    ["fast", "quick", "rapid", "swift"],
    ["big", "large", "huge"],
    ["small", "little", "tiny"],
    ["begin", "start"],
]
"#;
    println!("{}", example);
}
