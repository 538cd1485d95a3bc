//! `gapindex-codec`: gap (delta) codecs for ascending document ids.
//!
//! This crate holds the *mechanical* building blocks shared by postings lists:
//! - a fixed-width integer abstraction ([`GapInt`]) so one codec serves
//!   `u16`/`u32`/`u64`/`i32`/`i64` ids
//! - checked gap encoding and decoding
//! - a lazy decoder over a gap stream ([`DeltaDecoder`])
//! - a LEB128 varint byte representation of a gap stream ([`varint`])
//!
//! It intentionally does **not** define an inverted index.

#![warn(missing_docs)]

mod int;
pub mod varint;

use std::iter::FusedIterator;
use std::slice;

pub use int::GapInt;

/// Errors for gap codecs.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// Input ids were not strictly increasing.
    #[error("ids are not strictly increasing at index {index}: prev={prev}, next={next}")]
    NotStrictlyIncreasing {
        /// Index where the monotonicity violation occurred.
        index: usize,
        /// Previous id (expected smaller than `next`).
        prev: i128,
        /// Next id (must be strictly greater than `prev`).
        next: i128,
    },
    /// Decoding overflowed the id type.
    #[error("overflow while decoding at index {index}")]
    Overflow {
        /// Index in the gaps stream where overflow occurred.
        index: usize,
    },
    /// A varint was truncated or longer than 64 bits.
    #[error("invalid varint at byte offset {offset}")]
    InvalidVarint {
        /// Byte offset where the bad varint starts.
        offset: usize,
    },
    /// A decoded gap does not fit the target id width.
    #[error("gap {value} at index {index} does not fit the id type")]
    OutOfRange {
        /// Index in the gaps stream.
        index: usize,
        /// Decoded raw value.
        value: u64,
    },
}

/// Encode a sorted list of ids as gaps (delta encoding).
///
/// Input must be strictly increasing. The first gap is the first id itself.
pub fn gaps_from_sorted_ids<T: GapInt>(ids: &[T]) -> Result<Vec<T>, Error> {
    let Some((&first, rest)) = ids.split_first() else {
        return Ok(Vec::new());
    };
    let mut out = Vec::with_capacity(ids.len());
    out.push(first);
    let mut prev = first;
    for (i, &next) in rest.iter().enumerate() {
        if next <= prev {
            return Err(Error::NotStrictlyIncreasing {
                index: i + 1,
                prev: prev.to_i128(),
                next: next.to_i128(),
            });
        }
        out.push(next.wrapping_gap(prev));
        prev = next;
    }
    Ok(out)
}

/// Decode gaps back into absolute ids.
///
/// This is the **checked** variant: a zero gap after the first position, or a
/// sum that leaves the range of `T`, is an error.
pub fn ids_from_gaps<T: GapInt>(gaps: &[T]) -> Result<Vec<T>, Error> {
    let mut out = Vec::with_capacity(gaps.len());
    let mut cur: Option<T> = None;
    for (i, &g) in gaps.iter().enumerate() {
        let next = match cur {
            None => g,
            Some(prev) => {
                let step = g.to_wire();
                if step == 0 {
                    return Err(Error::NotStrictlyIncreasing {
                        index: i,
                        prev: prev.to_i128(),
                        next: prev.to_i128(),
                    });
                }
                let sum = prev.to_i128() + i128::from(step);
                let next = T::from_i128_lossy(sum);
                if next.to_i128() != sum {
                    return Err(Error::Overflow { index: i });
                }
                next
            }
        };
        out.push(next);
        cur = Some(next);
    }
    Ok(out)
}

/// Lazily decode a gap stream into absolute ids.
pub fn decode_iter<T: GapInt>(gaps: &[T]) -> DeltaDecoder<'_, T> {
    DeltaDecoder {
        gaps: gaps.iter(),
        cur: None,
    }
}

/// Running prefix sum over a gap stream, seeded by the first (absolute) value.
///
/// No overflow checking: the stream is assumed to come from a strictly
/// increasing sequence (see [`ids_from_gaps`] for the checked variant).
#[derive(Debug, Clone)]
pub struct DeltaDecoder<'a, T> {
    gaps: slice::Iter<'a, T>,
    cur: Option<T>,
}

impl<T: GapInt> Iterator for DeltaDecoder<'_, T> {
    type Item = T;

    #[inline]
    fn next(&mut self) -> Option<T> {
        let &gap = self.gaps.next()?;
        let value = match self.cur {
            None => gap,
            Some(prev) => prev.wrapping_advance(gap),
        };
        self.cur = Some(value);
        Some(value)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.gaps.size_hint()
    }
}

impl<T: GapInt> ExactSizeIterator for DeltaDecoder<'_, T> {}

impl<T: GapInt> FusedIterator for DeltaDecoder<'_, T> {}
