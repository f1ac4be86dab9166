//! Capacity command - report how many bits a text can carry.

use anyhow::Result;
use clap::Args;

use super::{CommandExecutor, CorpusArgs};

/// Show the per-sentence variant counts and capacity of a text.
#[derive(Args, Debug)]
pub struct CapacityCommand {
    #[command(flatten)]
    pub corpus: CorpusArgs,

    /// Print the variants of every sentence, substituted words in brackets
    #[arg(long)]
    pub list: bool,
}

impl CommandExecutor for CapacityCommand {
    fn execute(&self) -> Result<()> {
        let corpus = self.corpus.load()?;
        let document = &corpus.document;
        let stats = &corpus.stats;

        for (index, list) in document.lists().iter().enumerate() {
            let marker = if list.is_fallback() { " (unmodified)" } else { "" };
            println!("Sentence {}: {} variant(s){}", index + 1, list.len(), marker);
            if self.list {
                for (v, variant) in list.variants().iter().enumerate() {
                    println!("  {:>3}: {}", v, variant.highlighted("[", "]"));
                }
            }
        }

        println!();
        println!("Sentences:    {}", document.len());
        println!("Unmodified:   {}", stats.fallbacks);
        println!("Combinations: {}", document.num_options());
        println!("Capacity:     {} bits", document.capacity());
        println!("Upper bound:  {:.2} bits", stats.upper_bound);
        println!(
            "BPW:          {:.4} ({} content words)",
            stats.bits_per_word(),
            stats.word_count
        );
        println!(
            "Checked:      {} rewrites, {} keyword matches, {} mask matches, {} accepted",
            stats.enumeration.tried,
            stats.enumeration.keyword_matches,
            stats.enumeration.mask_matches,
            stats.enumeration.accepted
        );
        println!("Fingerprint:  {}", document.fingerprint());

        Ok(())
    }
}
