//! Message decoding.
//!
//! The receiver rebuilds the [`Document`] from the watermarked text and
//! recovers the message:
//! 1. Locate each received sentence in its variant list (exact text match)
//! 2. Recompose the mixed-radix integer, first sentence most significant
//! 3. Render it as a zero-padded bit-string of the document capacity
//!
//! Unlike extraction in lossy schemes, a sentence that matches no variant is
//! an error, not a guess.

use num_bigint::BigUint;
use num_traits::One;
use thiserror::Error;
use tracing::debug;

use crate::document::Document;
use crate::encoder::render_bits;
use crate::odometer::MixedRadix;
use crate::text::{tokenize, Sentence};

/// Errors that can occur during decoding.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DecoderError {
    #[error("Expected {expected} sentences, got {got}")]
    SentenceCountMismatch { expected: usize, got: usize },

    #[error("Sentence {sentence} matches no variant: {text:?}")]
    VariantNotFound { sentence: usize, text: String },

    #[error("Sentence {sentence} has {variants} variants, index {index} is out of range")]
    IndexOutOfRange {
        sentence: usize,
        index: usize,
        variants: usize,
    },

    #[error("Recovered value {value} does not fit in {capacity} bits")]
    MessageOutOfRange { value: BigUint, capacity: u64 },
}

/// Result of decoding a message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedMessage {
    /// Bit-string of exactly `capacity` characters.
    pub bits: String,
    /// The recovered integer.
    pub value: BigUint,
    /// Matched variant index per sentence.
    pub indices: Vec<usize>,
}

/// Decodes received sentences against a document.
///
/// # Arguments
/// * `document` - Variant lists rebuilt from the received text
/// * `received` - One sentence per document position, in order
///
/// # Returns
/// The recovered message, or an error if any sentence is unknown.
pub fn decode(document: &Document, received: &[Sentence]) -> Result<DecodedMessage, DecoderError> {
    if received.len() != document.len() {
        return Err(DecoderError::SentenceCountMismatch {
            expected: document.len(),
            got: received.len(),
        });
    }

    let indices = document
        .lists()
        .iter()
        .zip(received)
        .enumerate()
        .map(|(sentence, (list, candidate))| {
            let text = candidate.text();
            list.position_of(&text)
                .ok_or(DecoderError::VariantNotFound { sentence, text })
        })
        .collect::<Result<Vec<_>, DecoderError>>()?;

    decode_indices(document, indices)
}

/// Decodes raw sentence strings.
pub fn decode_texts<S: AsRef<str>>(
    document: &Document,
    received: &[S],
) -> Result<DecodedMessage, DecoderError> {
    let sentences: Vec<Sentence> = received.iter().map(|s| tokenize(s.as_ref())).collect();
    decode(document, &sentences)
}

/// Recomposes a message from variant indices.
pub fn decode_indices(
    document: &Document,
    indices: Vec<usize>,
) -> Result<DecodedMessage, DecoderError> {
    if indices.len() != document.len() {
        return Err(DecoderError::SentenceCountMismatch {
            expected: document.len(),
            got: indices.len(),
        });
    }

    let counts = document.variant_counts();
    if let Some((sentence, (&index, &variants))) = indices
        .iter()
        .zip(&counts)
        .enumerate()
        .find(|(_, (index, variants))| **index >= **variants)
    {
        return Err(DecoderError::IndexOutOfRange {
            sentence,
            index,
            variants,
        });
    }

    let capacity = document.capacity();
    let value = MixedRadix::new(counts)
        .index_of(&indices)
        .ok_or(DecoderError::SentenceCountMismatch {
            expected: document.len(),
            got: indices.len(),
        })?;

    // Combinations past 2^capacity are never produced by the encoder.
    if value >= BigUint::one() << (capacity as usize) {
        return Err(DecoderError::MessageOutOfRange { value, capacity });
    }

    debug!(value = %value, capacity, "decoded message");

    Ok(DecodedMessage {
        bits: render_bits(&value, capacity),
        value,
        indices,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::encoder::{encode, encode_index};
    use crate::variants::VariantList;

    fn document(sizes: &[usize]) -> Document {
        Document::new(
            sizes
                .iter()
                .enumerate()
                .map(|(s, &n)| {
                    VariantList::from_texts((0..n).map(|v| format!("sentence {} variant {}.", s, v)))
                        .unwrap()
                })
                .collect(),
        )
    }

    #[test]
    fn test_encode_decode_roundtrip() {
        let doc = document(&[3, 4, 2, 5]);
        assert_eq!(doc.capacity(), 6);

        for value in 0u32..64 {
            let encoded = encode_index(&doc, &BigUint::from(value)).unwrap();
            let decoded = decode(&doc, &encoded.sentences).unwrap();
            assert_eq!(decoded.value, BigUint::from(value));
            assert_eq!(decoded.bits, encoded.message_bits);
            assert_eq!(decoded.indices, encoded.indices);
        }
    }

    #[test]
    fn test_decode_three_by_three() {
        let doc = document(&[3, 3]);
        let decoded =
            decode_texts(&doc, &["sentence 0 variant 2.", "sentence 1 variant 1."]).unwrap();
        assert_eq!(decoded.value, BigUint::from(7u32));
        assert_eq!(decoded.bits, "111");
    }

    #[test]
    fn test_decode_pads_to_capacity() {
        let doc = document(&[3, 3]);
        let encoded = encode(&doc, "1").unwrap();
        let decoded = decode(&doc, &encoded.sentences).unwrap();
        assert_eq!(decoded.bits, "001");
    }

    #[test]
    fn test_decode_count_mismatch() {
        let doc = document(&[3, 3]);
        assert_eq!(
            decode_texts(&doc, &["sentence 0 variant 2."]),
            Err(DecoderError::SentenceCountMismatch {
                expected: 2,
                got: 1
            })
        );
    }

    #[test]
    fn test_decode_unknown_sentence() {
        let doc = document(&[3, 3]);
        let result = decode_texts(&doc, &["sentence 0 variant 2.", "tampered text."]);
        assert_eq!(
            result,
            Err(DecoderError::VariantNotFound {
                sentence: 1,
                text: "tampered text.".to_string()
            })
        );
    }

    #[test]
    fn test_decode_combination_beyond_capacity() {
        // [3, 2] has 6 combinations but only 4 are addressable.
        let doc = document(&[3, 2]);
        let result = decode_texts(&doc, &["sentence 0 variant 2.", "sentence 1 variant 0."]);
        assert_eq!(
            result,
            Err(DecoderError::MessageOutOfRange {
                value: BigUint::from(4u32),
                capacity: 2
            })
        );
    }

    #[test]
    fn test_decode_indices_digit_past_list() {
        let doc = document(&[3, 3]);
        assert_eq!(
            decode_indices(&doc, vec![1, 3]),
            Err(DecoderError::IndexOutOfRange {
                sentence: 1,
                index: 3,
                variants: 3
            })
        );
    }

    #[test]
    fn test_decode_indices_wrong_length() {
        let doc = document(&[3, 3]);
        assert_eq!(
            decode_indices(&doc, vec![1]),
            Err(DecoderError::SentenceCountMismatch {
                expected: 2,
                got: 1
            })
        );
    }

    #[test]
    fn test_decode_zero_capacity() {
        let doc = document(&[1, 1]);
        let decoded =
            decode_texts(&doc, &["sentence 0 variant 0.", "sentence 1 variant 0."]).unwrap();
        assert_eq!(decoded.bits, "");
        assert_eq!(decoded.value, BigUint::from(0u32));
    }

    #[test]
    fn test_decode_empty_document() {
        let decoded = decode(&Document::default(), &[]).unwrap();
        assert!(decoded.bits.is_empty());
        assert!(decoded.indices.is_empty());
    }

    #[test]
    fn test_decode_ignores_trailing_whitespace() {
        let doc = document(&[2]);
        let decoded = decode_texts(&doc, &["  sentence 0 variant 1.  "]).unwrap();
        assert_eq!(decoded.bits, "1");
    }
}
