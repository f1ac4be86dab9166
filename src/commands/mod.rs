//! Command module - Strategy pattern for CLI commands.
//!
//! Each command is a separate module implementing the `CommandExecutor` trait.
//! All of them share the same inputs: a TOML config and a text file (or stdin).

mod capacity;
mod embed;
mod extract;

pub use capacity::CapacityCommand;
pub use embed::EmbedCommand;
pub use extract::ExtractCommand;

use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::Args;

use blindmark::{Config, Document, DocumentBuilder, DocumentStats, LexiconPipeline};

/// Trait for command execution - Strategy pattern.
///
/// Each command struct holds its parsed arguments and implements
/// this trait to define its execution logic.
pub trait CommandExecutor {
    /// Executes the command with its parsed arguments.
    fn execute(&self) -> Result<()>;
}

/// Arguments shared by every command.
#[derive(Args, Debug)]
pub struct CorpusArgs {
    /// Path to the TOML configuration (synonym groups, acceptance policy)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Path to the input text (reads stdin when omitted)
    #[arg(short, long)]
    pub input: Option<PathBuf>,
}

/// A loaded text together with the document derived from it.
pub struct Corpus {
    pub sentences: Vec<String>,
    pub document: Document,
    pub stats: DocumentStats,
}

impl CorpusArgs {
    /// Loads the config, falling back to defaults without `--config`.
    pub fn load_config(&self) -> Result<Config> {
        match &self.config {
            Some(path) => Config::load(path)
                .with_context(|| format!("Failed to load config from {}", path.display())),
            None => Ok(Config::default()),
        }
    }

    /// Reads the input text.
    pub fn read_input(&self) -> Result<String> {
        let text = match &self.input {
            Some(path) => read_file(path)?,
            None => {
                eprintln!("Reading text from stdin (Ctrl+D to finish):");
                let mut buffer = String::new();
                io::stdin()
                    .read_to_string(&mut buffer)
                    .context("Failed to read text from stdin")?;
                buffer
            }
        };

        if text.trim().is_empty() {
            bail!("Input text cannot be empty");
        }
        Ok(text)
    }

    /// Loads everything and builds the document.
    pub fn load(&self) -> Result<Corpus> {
        let config = self.load_config()?;
        let text = self.read_input()?;

        let pipeline = LexiconPipeline::new(&config.lexicon);
        let builder = DocumentBuilder::new(&pipeline, &config.watermark);
        let sentences = blindmark::text::preprocess(&text);
        let (document, stats) = builder.build(&sentences);

        Ok(Corpus {
            sentences,
            document,
            stats,
        })
    }
}

fn read_file(path: &Path) -> Result<String> {
    fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))
}
