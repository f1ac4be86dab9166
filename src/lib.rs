//! # Blindmark - combinatorial text watermarking
//!
//! Blindmark hides a bit-string in a text by choosing, for every sentence,
//! one of several meaning-preserving rewrites.
//!
//! ## Overview
//!
//! - Each sentence gets a few **substitution sites** (content words that are
//!   not stopwords, keywords or named entities)
//! - Every combination of ranked candidates at those sites is a **rewrite**
//! - A rewrite is kept only if it is **blindly consistent**: analysing the
//!   rewritten text selects exactly the same sites again
//! - The per-sentence lists form a **mixed-radix** number system; the
//!   message is one integer in it, first sentence most significant
//! - The receiver re-runs the same analysis on the watermarked text, which
//!   reproduces the lists, and reads back the index of every sentence
//!
//! ## Guarantees
//!
//! - **Never empty**: a sentence without valid rewrites keeps its original
//!   text as its only variant
//! - **Exact capacity**: `floor(log2(product of list sizes))`, computed on
//!   the exact product with arbitrary-precision integers
//! - **Bounded messages**: only the first `2^capacity` combinations are used
//!
//! ## Example Usage
//!
//! ```rust
//! use blindmark::analysis::LexiconPipeline;
//! use blindmark::config::Config;
//! use blindmark::text::preprocess;
//! use blindmark::{decode_texts, encode, DocumentBuilder};
//!
//! let config = Config::from_toml_str(r#"
//!     [lexicon]
//!     groups = [["fast", "quick", "rapid", "swift"], ["big", "large"]]
//! "#).unwrap();
//! let pipeline = LexiconPipeline::new(&config.lexicon);
//! let builder = DocumentBuilder::new(&pipeline, &config.watermark);
//!
//! let (document, _stats) = builder.build_text("The fast car stopped. A big dog barked.");
//! assert_eq!(document.capacity(), 3);
//!
//! let encoded = encode(&document, "101").unwrap();
//! let watermarked = encoded.text();
//!
//! // The receiver only has the watermarked text.
//! let (received, _) = builder.build_text(&watermarked);
//! let decoded = decode_texts(&received, &preprocess(&watermarked)).unwrap();
//! assert_eq!(decoded.bits, "101");
//! ```
//!
//! ## Modules
//!
//! - [`text`]: Cleaning, sentence splitting, tokenization, stopwords
//! - [`analysis`]: The NLP pipeline seam and the lexicon adapter
//! - [`consistency`]: Blind consistency check of a rewrite
//! - [`variants`]: Enumeration of the valid rewrites of a sentence
//! - [`capacity`]: Exact capacity and embedding statistics
//! - [`document`]: Corpus-level variant lists
//! - [`encoder`] / [`decoder`]: The mixed-radix message codec

/// Protocol version, mixed into document fingerprints.
pub const PROTOCOL_VERSION: u8 = 1;

pub mod analysis;
pub mod capacity;
pub mod config;
pub mod consistency;
pub mod decoder;
pub mod document;
pub mod encoder;
pub mod odometer;
pub mod text;
pub mod variants;

// Re-export commonly used types at the crate root
pub use analysis::{LexiconPipeline, Pipeline, PipelineError};
pub use capacity::DocumentStats;
pub use config::{AcceptancePolicy, Config, ConfigError};
pub use consistency::{CheckOutcome, ConsistencyChecker};
pub use decoder::{decode, decode_indices, decode_texts, DecodedMessage, DecoderError};
pub use document::{Document, DocumentBuilder};
pub use encoder::{encode, encode_index, EncodeWarning, EncodedMessage, EncoderError};
pub use odometer::MixedRadix;
pub use variants::{EnumerationStats, Variant, VariantEnumerator, VariantList};
