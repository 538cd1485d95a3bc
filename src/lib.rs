//! # gapindex
//!
//! An in-memory inverted index with a strict two-phase build/query protocol.
//!
//! ## Scope (deliberate)
//!
//! - This crate is **index-only**: it never stores document content, only
//!   term -> document-id postings.
//! - Building happens once: an [`IndexBuilder`] is fed documents in order and
//!   then frozen into an [`InvertedIndex`]. There is no way back.
//! - Numeric ids are stored gap-encoded ([`CompressedPostings`]); arbitrary
//!   hashable ids use a plain set ([`SetPostings`]). The choice is the type
//!   parameter of the index and never changes at runtime.
//!
//! ## Non-goals
//!
//! - Ranked retrieval (BM25 / TF-IDF)
//! - Phrase, proximity, OR / NOT queries
//! - On-disk persistence
//!
//! ## Example
//!
//! ```
//! use gapindex::{IndexConfig, NumericIndex};
//!
//! let docs = [vec!["cat", "dog"], vec!["dog", "bird"], vec!["cat", "bird"]];
//! let index = NumericIndex::<u32>::build(&docs, None, IndexConfig::default()).unwrap();
//!
//! assert_eq!(index.query("cat"), vec![0, 2]);
//! assert_eq!(index.query_and("cat", "dog"), vec![0]);
//! assert_eq!(index.token_count(), 6);
//! ```
//!
//! Related crates:
//! - `gapindex::codec`: gap/varint codecs for postings payloads (in this repo).

pub mod config;
mod index;
pub mod postings;
pub mod validate;

pub use gapindex_codec as codec;

pub use codec::GapInt;
pub use config::{GrowthPolicy, IndexConfig};
pub use index::{IndexBuilder, InvertedIndex};
pub use postings::{CompressedPostings, Postings, SetPostings};
pub use validate::{NumericSource, RawIdentifier};

/// Index over numeric ids, stored gap-encoded at width `T`.
pub type NumericIndex<T = u32> = InvertedIndex<CompressedPostings<T>>;

/// Index over arbitrary hashable ids.
pub type KeyedIndex<K = String> = InvertedIndex<SetPostings<K>>;

/// Errors returned by `gapindex`.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// The number of identifiers differs from the number of documents.
    #[error("{identifiers} identifiers supplied for {documents} documents")]
    SizeMismatch {
        /// Identifiers supplied.
        identifiers: usize,
        /// Documents supplied.
        documents: usize,
    },
    /// An identifier occurs more than once.
    #[error("duplicate document identifier: {0}")]
    DuplicateIdentifier(String),
    /// An identifier cannot be represented exactly by the numeric id type.
    #[error("identifier {value} is not representable as the id type (coerced: {coerced:?})")]
    NonNumericIdentifier {
        /// The offending value as supplied.
        value: String,
        /// What the value became after coercion, if it was numeric at all.
        coerced: Option<String>,
    },
    /// Non-numeric postings cannot synthesize ids; the caller must supply them.
    #[error("identifiers are required when ids are not numeric")]
    IdentifiersRequired,
    /// A numeric id arrived below the previously appended one.
    #[error("id {next} appended after {previous}; numeric ids must be ascending")]
    InvalidAppendOrder {
        /// Most recently appended id.
        previous: i128,
        /// Rejected id.
        next: i128,
    },
    /// The configuration cannot be used.
    #[error("invalid configuration: {0}")]
    InvalidConfig(&'static str),
    /// A gap stream failed to decode.
    #[error(transparent)]
    Codec(#[from] codec::Error),
}
