//! Extract command - recover a bit-string from watermarked text.

use anyhow::{bail, Context, Result};
use clap::Args;

use blindmark::decode_texts;

use super::{CommandExecutor, CorpusArgs};

/// Recover the embedded message from a watermarked text.
///
/// Extraction is blind: the variant lists are rebuilt from the watermarked
/// text itself, so only the config used for embedding is needed.
#[derive(Args, Debug)]
pub struct ExtractCommand {
    #[command(flatten)]
    pub corpus: CorpusArgs,

    /// Also print the matched variant index of every sentence
    #[arg(long)]
    pub indices: bool,

    /// Fingerprint printed by `embed`; extraction fails if the rebuilt
    /// variant lists differ
    #[arg(long)]
    pub fingerprint: Option<String>,
}

impl CommandExecutor for ExtractCommand {
    fn execute(&self) -> Result<()> {
        let corpus = self.corpus.load()?;

        if let Some(expected) = &self.fingerprint {
            let actual = corpus.document.fingerprint();
            if actual != expected.trim() {
                bail!(
                    "Fingerprint mismatch: expected {}, rebuilt {} (different config or altered text)",
                    expected.trim(),
                    actual
                );
            }
        }

        let decoded = decode_texts(&corpus.document, &corpus.sentences)
            .context("Failed to extract message")?;

        if self.indices {
            eprintln!("Indices: {:?}", decoded.indices);
            eprintln!("Fingerprint: {}", corpus.document.fingerprint());
        }

        println!("{}", decoded.bits);
        Ok(())
    }
}
