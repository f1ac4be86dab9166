//! Text processing for watermark carriers.
//!
//! This module provides:
//! - Word tokenization with whitespace preservation
//! - Cover text cleanup and sentence segmentation
//! - Stopword handling and content-word counting

pub mod segment;
pub mod stopwords;
pub mod tokenize;

pub use segment::{clean_text, preprocess, split_sentences};
pub use stopwords::{count_content_words, is_stopword, STOPWORDS};
pub use tokenize::{tokenize, Sentence, Token};
