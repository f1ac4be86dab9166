//! Embed command - watermark a text with a bit-string.

use std::fs;
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::Args;

use blindmark::encode;

use super::{CommandExecutor, CorpusArgs};

/// Embed a binary message by choosing one rewrite per sentence.
///
/// Messages shorter than the capacity are left-padded with zeros; longer
/// ones are truncated to the capacity (with a warning).
#[derive(Args, Debug)]
pub struct EmbedCommand {
    #[command(flatten)]
    pub corpus: CorpusArgs,

    /// Message as a string of 0 and 1 characters
    #[arg(short, long)]
    pub message: String,

    /// Write the watermarked text here instead of stdout
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

impl CommandExecutor for EmbedCommand {
    fn execute(&self) -> Result<()> {
        let corpus = self.corpus.load()?;
        let document = &corpus.document;

        if document.capacity() == 0 {
            bail!("Text has no capacity: no sentence admits a consistent rewrite");
        }

        let encoded = encode(document, &self.message).context("Failed to encode message")?;

        for warning in &encoded.warnings {
            eprintln!("WARNING: {}", warning);
        }
        eprintln!(
            "Embedded {} bits (capacity {}), fingerprint {}",
            encoded.message_bits.len(),
            document.capacity(),
            document.fingerprint()
        );

        let watermarked = encoded.text();
        match &self.output {
            Some(path) => {
                fs::write(path, format!("{}\n", watermarked))
                    .with_context(|| format!("Failed to write {}", path.display()))?;
                eprintln!("Watermarked text written to {}", path.display());
            }
            None => println!("{}", watermarked),
        }

        Ok(())
    }
}
