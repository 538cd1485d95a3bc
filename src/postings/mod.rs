//! Postings lists: the document ids associated with one term.
//!
//! Two representations share the [`Postings`] contract:
//! - [`SetPostings`]: any hashable id, no ordering requirement on insert
//! - [`CompressedPostings`]: fixed-width integer ids appended in ascending
//!   order and stored as gaps

mod compressed;
mod set;

use std::fmt::Debug;
use std::hash::Hash;

pub use compressed::CompressedPostings;
pub use set::SetPostings;

use crate::{Error, GrowthPolicy};

/// Capability contract shared by every postings representation.
///
/// The index is generic over this trait, so the representation is fixed for
/// the lifetime of an index.
pub trait Postings: Sized {
    /// Document id stored in the list.
    type Id: Clone + Eq + Hash + Ord + Debug;

    /// Ascending iterator over the stored ids.
    type Iter<'a>: Iterator<Item = Self::Id>
    where
        Self: 'a;

    /// A new list holding only `first`.
    fn seeded(first: Self::Id, growth: &GrowthPolicy) -> Self;

    /// Append `id` (duplicates are skipped as the representation allows).
    fn add(&mut self, id: Self::Id) -> Result<(), Error>;

    /// Membership test.
    fn contains(&self, id: &Self::Id) -> bool;

    /// Number of distinct ids.
    fn len(&self) -> usize;

    /// Whether the list is empty.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Ids in ascending order. Each call starts a fresh pass.
    fn iter(&self) -> Self::Iter<'_>;

    /// Release spare storage once building is over.
    fn finalize(&mut self) {}

    /// Ids `0..count` for callers that supply none.
    fn synthesize_ids(_count: usize) -> Result<Vec<Self::Id>, Error> {
        Err(Error::IdentifiersRequired)
    }

    /// Reject `next` as the id of the next document, given the previous one.
    ///
    /// Runs before any list is touched for that document, so a rejected
    /// document leaves the builder unchanged.
    fn check_document_order(_previous: Option<&Self::Id>, _next: &Self::Id) -> Result<(), Error> {
        Ok(())
    }
}
