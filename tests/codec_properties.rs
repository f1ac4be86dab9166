//! Property-based tests for the message codec.
//!
//! Documents are generated from arbitrary variant counts; messages from
//! arbitrary bit-strings. Every addressable message must survive a round
//! trip, and capacity must follow the exact product of list sizes.

use blindmark::capacity::floor_log2;
use blindmark::{decode, encode, Document, MixedRadix, VariantList};
use num_bigint::BigUint;
use proptest::prelude::*;

/// Generate variant counts for a small document.
fn sizes_strategy() -> impl Strategy<Value = Vec<usize>> {
    prop::collection::vec(1usize..12, 0..10)
}

/// Generate a message of '0'/'1' characters.
fn bits_strategy() -> impl Strategy<Value = String> {
    prop::collection::vec(prop::bool::ANY, 0..48)
        .prop_map(|bits| bits.into_iter().map(|b| if b { '1' } else { '0' }).collect())
}

fn document(sizes: &[usize]) -> Document {
    Document::new(
        sizes
            .iter()
            .enumerate()
            .map(|(s, &n)| {
                VariantList::from_texts((0..n).map(|v| format!("s{} v{}.", s, v))).unwrap()
            })
            .collect(),
    )
}

proptest! {
    /// Embedded bits are recovered exactly.
    #[test]
    fn prop_encode_decode_roundtrip(sizes in sizes_strategy(), bits in bits_strategy()) {
        let doc = document(&sizes);
        let capacity = doc.capacity() as usize;

        let encoded = encode(&doc, &bits).unwrap();
        prop_assert_eq!(encoded.message_bits.len(), capacity);
        prop_assert_eq!(encoded.was_truncated(), bits.len() > capacity);

        let decoded = decode(&doc, &encoded.sentences).unwrap();
        prop_assert_eq!(&decoded.bits, &encoded.message_bits);
        prop_assert_eq!(decoded.indices, encoded.indices);

        if bits.len() <= capacity {
            prop_assert!(decoded.bits.ends_with(&bits));
        } else {
            prop_assert_eq!(&decoded.bits[..], &bits[..capacity]);
        }
    }

    /// Odometer iteration and direct indexing agree.
    #[test]
    fn prop_odometer_matches_digits_at(radices in prop::collection::vec(1usize..5, 0..5)) {
        let system = MixedRadix::new(radices);
        let mut count = 0u64;
        for (index, digits) in system.iter().enumerate() {
            let index = BigUint::from(index);
            prop_assert_eq!(system.digits_at(&index), Some(digits.clone()));
            prop_assert_eq!(system.index_of(&digits), Some(index));
            count += 1;
        }
        prop_assert_eq!(BigUint::from(count), system.total());
        prop_assert_eq!(system.digits_at(&system.total()), None);
    }

    /// Adding a sentence never lowers capacity; two or more variants add a bit.
    #[test]
    fn prop_capacity_monotonic(sizes in sizes_strategy(), extra in 1usize..12) {
        let before = document(&sizes).capacity();
        let mut grown = sizes.clone();
        grown.push(extra);
        let after = document(&grown).capacity();

        prop_assert!(after >= before);
        if extra >= 2 {
            prop_assert!(after > before);
        }
    }

    /// Capacity is the floor of log2 of the exact product.
    #[test]
    fn prop_capacity_is_floor_log2(sizes in sizes_strategy()) {
        let doc = document(&sizes);
        let product = sizes.iter().fold(BigUint::from(1u32), |acc, &n| acc * n);

        prop_assert_eq!(doc.num_options(), product.clone());
        prop_assert_eq!(doc.capacity(), floor_log2(&product));
        prop_assert!(BigUint::from(1u32) << (doc.capacity() as usize) <= product);
    }
}
