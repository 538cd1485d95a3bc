use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};

use crate::postings::{CompressedPostings, Postings};
use crate::validate::{self, NumericSource};
use crate::{Error, GapInt, IndexConfig};

/// An index under construction.
///
/// Documents are added one at a time with their id passed explicitly; terms
/// are created lazily only here. [`IndexBuilder::finish`] consumes the builder,
/// so nothing can be added to a frozen [`InvertedIndex`].
///
/// A rejected document leaves the builder exactly as it was.
#[derive(Debug)]
pub struct IndexBuilder<P: Postings> {
    postings: HashMap<String, P>,
    seen: HashSet<P::Id>,
    last_doc: Option<P::Id>,
    config: IndexConfig,
}

impl<P: Postings> IndexBuilder<P> {
    /// Start a build with a validated configuration.
    pub fn new(config: IndexConfig) -> Result<Self, Error> {
        config.validate()?;
        Ok(Self {
            postings: HashMap::new(),
            seen: HashSet::new(),
            last_doc: None,
            config,
        })
    }

    /// Configuration in effect.
    pub fn config(&self) -> &IndexConfig {
        &self.config
    }

    /// Documents accepted so far.
    pub fn num_docs(&self) -> usize {
        self.seen.len()
    }

    /// Index one document's tokens under `doc_id`.
    ///
    /// Excluded tokens are skipped before any postings list is looked up.
    /// Fails with [`Error::DuplicateIdentifier`] for a repeated id, and for
    /// numeric postings with [`Error::InvalidAppendOrder`] when `doc_id` is not
    /// above the previous document's id.
    pub fn add_document<S: AsRef<str>>(
        &mut self,
        doc_id: P::Id,
        tokens: &[S],
    ) -> Result<(), Error> {
        if self.seen.contains(&doc_id) {
            return Err(Error::DuplicateIdentifier(format!("{doc_id:?}")));
        }
        P::check_document_order(self.last_doc.as_ref(), &doc_id)?;

        tracing::trace!(doc_id = ?doc_id, tokens = tokens.len(), "indexing document");
        for token in tokens {
            let term = token.as_ref();
            if self.config.is_excluded(term) {
                continue;
            }
            // Clone the term only on first sight.
            match self.postings.get_mut(term) {
                Some(list) => list.add(doc_id.clone())?,
                None => {
                    let list = P::seeded(doc_id.clone(), &self.config.growth);
                    self.postings.insert(term.to_owned(), list);
                }
            }
        }

        self.seen.insert(doc_id.clone());
        self.last_doc = Some(doc_id);
        Ok(())
    }

    /// Finalize every postings list and freeze the index.
    pub fn finish(self) -> InvertedIndex<P> {
        let mut postings = self.postings;
        for list in postings.values_mut() {
            list.finalize();
        }
        let index = InvertedIndex {
            postings,
            num_docs: self.seen.len(),
        };
        tracing::debug!(
            documents = index.num_docs,
            terms = index.num_terms(),
            postings = index.token_count(),
            "inverted index frozen"
        );
        index
    }
}

/// A frozen inverted index: term -> postings list.
///
/// Every method takes `&self`; looking up an unknown term returns an empty
/// result and never creates it. The index can be shared across threads when
/// its ids can.
#[derive(Debug, Clone)]
pub struct InvertedIndex<P> {
    postings: HashMap<String, P>,
    num_docs: usize,
}

impl<P: Postings> InvertedIndex<P> {
    /// Build and freeze an index over `documents`.
    ///
    /// `identifiers[i]` names `documents[i]`. Without identifiers, numeric
    /// postings number documents `0..n`; other postings fail with
    /// [`Error::IdentifiersRequired`]. All identifier checks run before any
    /// postings list is created, and no partial index is ever returned.
    pub fn build<D, S>(
        documents: &[D],
        identifiers: Option<&[P::Id]>,
        config: IndexConfig,
    ) -> Result<Self, Error>
    where
        D: AsRef<[S]>,
        S: AsRef<str>,
    {
        let ids = match identifiers {
            Some(ids) => validate::check_identifiers(ids, documents.len())?,
            None => P::synthesize_ids(documents.len())?,
        };
        Self::build_with_ids(documents, ids, config)
    }

    fn build_with_ids<D, S>(
        documents: &[D],
        ids: Vec<P::Id>,
        config: IndexConfig,
    ) -> Result<Self, Error>
    where
        D: AsRef<[S]>,
        S: AsRef<str>,
    {
        tracing::debug!(
            documents = documents.len(),
            excluded = config.excluded_terms.len(),
            "building inverted index"
        );
        let mut builder = IndexBuilder::<P>::new(config)?;
        for (doc, id) in documents.iter().zip(ids) {
            builder.add_document(id, doc.as_ref())?;
        }
        Ok(builder.finish())
    }

    /// Postings list for `term`.
    pub fn postings(&self, term: &str) -> Option<&P> {
        self.postings.get(term)
    }

    /// Ids of documents containing `term`, ascending. Empty if unknown.
    pub fn query(&self, term: &str) -> Vec<P::Id> {
        self.postings
            .get(term)
            .map(|list| list.iter().collect())
            .unwrap_or_default()
    }

    /// Ids of documents containing both terms, ascending.
    pub fn query_and(&self, term1: &str, term2: &str) -> Vec<P::Id> {
        let (Some(a), Some(b)) = (self.postings.get(term1), self.postings.get(term2)) else {
            return Vec::new();
        };
        let a: Vec<P::Id> = a.iter().collect();
        let b: Vec<P::Id> = b.iter().collect();
        intersect_sorted(&a, &b)
    }

    /// Number of documents containing `term`.
    pub fn doc_freq(&self, term: &str) -> usize {
        self.postings.get(term).map_or(0, P::len)
    }

    /// Whether `term` was indexed.
    pub fn contains_term(&self, term: &str) -> bool {
        self.postings.contains_key(term)
    }

    /// Indexed terms in ascending order.
    pub fn terms(&self) -> Vec<&str> {
        let mut out: Vec<&str> = self.postings.keys().map(String::as_str).collect();
        out.sort_unstable();
        out
    }

    /// Number of distinct terms.
    pub fn num_terms(&self) -> usize {
        self.postings.len()
    }

    /// Number of indexed documents (including ones with no indexed tokens).
    pub fn num_docs(&self) -> usize {
        self.num_docs
    }

    /// Total (term, document) pairs: the sum of all postings sizes.
    pub fn token_count(&self) -> usize {
        self.postings.values().map(P::len).sum()
    }

    /// The `n` terms with the most documents, most frequent first.
    ///
    /// Ties are broken by ascending term, so the result is deterministic.
    pub fn n_most_frequent(&self, n: usize) -> Vec<&str> {
        if n == 0 {
            return Vec::new();
        }
        let mut ranked: Vec<(&str, usize)> = self
            .postings
            .iter()
            .map(|(term, list)| (term.as_str(), list.len()))
            .collect();
        if n < ranked.len() {
            ranked.select_nth_unstable_by(n - 1, by_rank);
            ranked.truncate(n);
        }
        ranked.sort_unstable_by(by_rank);
        ranked.into_iter().map(|(term, _)| term).collect()
    }
}

impl<T: GapInt> InvertedIndex<CompressedPostings<T>> {
    /// Like [`InvertedIndex::build`], but coerces raw identifiers (integers of
    /// any width, integral floats, decimal strings) into `T` first.
    pub fn build_coerced<D, S, R>(
        documents: &[D],
        identifiers: &[R],
        config: IndexConfig,
    ) -> Result<Self, Error>
    where
        D: AsRef<[S]>,
        S: AsRef<str>,
        R: NumericSource + std::fmt::Debug,
    {
        let ids = validate::coerce_identifiers::<T, R>(identifiers, documents.len())?;
        Self::build_with_ids(documents, ids, config)
    }
}

fn by_rank(a: &(&str, usize), b: &(&str, usize)) -> Ordering {
    b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0))
}

fn intersect_sorted<T: Ord + Clone>(a: &[T], b: &[T]) -> Vec<T> {
    let mut out = Vec::new();
    let mut i = 0usize;
    let mut j = 0usize;
    while i < a.len() && j < b.len() {
        match a[i].cmp(&b[j]) {
            Ordering::Equal => {
                out.push(a[i].clone());
                i += 1;
                j += 1;
            }
            Ordering::Less => i += 1,
            Ordering::Greater => j += 1,
        }
    }
    out
}
