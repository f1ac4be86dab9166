//! Message encoding.
//!
//! This module maps a bit-string onto one variant per sentence:
//! 1. Strip whitespace and validate the bits
//! 2. Left-pad with '0' to the document capacity, or truncate (with warning)
//! 3. Parse the bits as an arbitrary-precision integer
//! 4. Decompose it in mixed radix, first sentence most significant
//! 5. Pick the variant at each resulting index

use std::fmt;

use num_bigint::BigUint;
use num_traits::{One, Zero};
use thiserror::Error;
use tracing::{debug, warn};

use crate::document::Document;
use crate::text::Sentence;

/// Errors that can occur during encoding.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EncoderError {
    #[error("Invalid character {found:?} at position {position}: message must be binary")]
    InvalidBit { position: usize, found: char },

    #[error("Message value {value} out of range for a capacity of {capacity} bits")]
    MessageOutOfRange { value: BigUint, capacity: u64 },
}

/// Non-fatal conditions reported by the encoder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EncodeWarning {
    /// The message was longer than the capacity and was truncated.
    MessageTooLong {
        /// Bits supplied by the caller.
        given: usize,
        /// Bits actually embedded.
        capacity: u64,
    },
}

impl fmt::Display for EncodeWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EncodeWarning::MessageTooLong { given, capacity } => write!(
                f,
                "message longer than capacity, truncated: {} > {}",
                given, capacity
            ),
        }
    }
}

/// Result of encoding a message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedMessage {
    /// The selected sentence for every position, in corpus order.
    pub sentences: Vec<Sentence>,
    /// Chosen variant index per sentence.
    pub indices: Vec<usize>,
    /// The bits actually embedded (exactly `capacity` long).
    pub message_bits: String,
    /// The embedded integer.
    pub value: BigUint,
    /// Lossy adjustments made to the input.
    pub warnings: Vec<EncodeWarning>,
}

impl EncodedMessage {
    /// Watermarked text: sentences joined by single spaces.
    pub fn text(&self) -> String {
        self.sentences
            .iter()
            .map(Sentence::text)
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Returns true if the input was truncated.
    pub fn was_truncated(&self) -> bool {
        self.warnings
            .iter()
            .any(|w| matches!(w, EncodeWarning::MessageTooLong { .. }))
    }
}

/// Validates a message and fits it to `capacity` bits.
///
/// Whitespace is ignored. Short messages are left-padded with '0'; long
/// ones keep their first `capacity` bits and produce a warning.
pub fn fit_message(
    message: &str,
    capacity: u64,
) -> Result<(String, Option<EncodeWarning>), EncoderError> {
    let mut bits = String::with_capacity(message.len());
    for (position, c) in message.chars().filter(|c| !c.is_whitespace()).enumerate() {
        if c != '0' && c != '1' {
            return Err(EncoderError::InvalidBit { position, found: c });
        }
        bits.push(c);
    }

    let capacity_len = capacity as usize;
    if bits.len() > capacity_len {
        let warning = EncodeWarning::MessageTooLong {
            given: bits.len(),
            capacity,
        };
        bits.truncate(capacity_len);
        return Ok((bits, Some(warning)));
    }

    Ok((format!("{:0>width$}", bits, width = capacity_len), None))
}

/// Renders `value` as a binary string of exactly `width` digits.
///
/// `value` must fit in `width` bits.
pub fn render_bits(value: &BigUint, width: u64) -> String {
    if width == 0 {
        return String::new();
    }
    format!("{:0>width$}", value.to_str_radix(2), width = width as usize)
}

fn parse_bits(bits: &str) -> BigUint {
    if bits.is_empty() {
        return BigUint::zero();
    }
    BigUint::parse_bytes(bits.as_bytes(), 2).unwrap_or_default()
}

/// Encodes a bit-string into a choice of variants.
///
/// # Arguments
/// * `document` - Variant lists of the cover text
/// * `message` - '0'/'1' characters; whitespace is ignored
///
/// # Returns
/// The selected sentences, plus a warning if the message was truncated.
pub fn encode(document: &Document, message: &str) -> Result<EncodedMessage, EncoderError> {
    let capacity = document.capacity();
    let (bits, warning) = fit_message(message, capacity)?;

    if let Some(w) = &warning {
        warn!("{}", w);
    }

    let mut encoded = encode_index(document, &parse_bits(&bits))?;
    encoded.warnings.extend(warning);
    Ok(encoded)
}

/// Encodes an integer directly.
///
/// The value must be below `2^capacity`: only that many combinations are
/// addressable by a `capacity`-bit message, even when the document has more.
pub fn encode_index(document: &Document, value: &BigUint) -> Result<EncodedMessage, EncoderError> {
    let capacity = document.capacity();
    let out_of_range = || EncoderError::MessageOutOfRange {
        value: value.clone(),
        capacity,
    };

    let limit = BigUint::one() << (capacity as usize);
    if *value >= limit {
        return Err(out_of_range());
    }

    let indices = document.radix().digits_at(value).ok_or_else(out_of_range)?;

    let sentences = document
        .lists()
        .iter()
        .zip(&indices)
        .map(|(list, &index)| {
            list.get(index)
                .map(|variant| variant.sentence.clone())
                .ok_or_else(out_of_range)
        })
        .collect::<Result<Vec<_>, EncoderError>>()?;

    debug!(value = %value, capacity, indices = ?indices, "encoded message");

    Ok(EncodedMessage {
        sentences,
        indices,
        message_bits: render_bits(value, capacity),
        value: value.clone(),
        warnings: Vec::new(),
    })
}
