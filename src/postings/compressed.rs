use std::cmp::Ordering;

use super::Postings;
use crate::codec::{self, varint, DeltaDecoder, GapInt};
use crate::{Error, GrowthPolicy};

/// Ascending numeric postings stored as gaps.
///
/// The first stored value is absolute; every later one is the difference to
/// its predecessor. The buffer keeps explicit `len <= capacity` bookkeeping and
/// grows by [`GrowthPolicy::expansion_rate`] when full.
///
/// Appends must arrive in ascending order. Re-adding the most recently added id
/// is a no-op; an id below it fails with [`Error::InvalidAppendOrder`]. This
/// only collapses *consecutive* duplicates, which is all the index needs since
/// it appends one document at a time.
#[derive(Debug, Clone, PartialEq)]
pub struct CompressedPostings<T> {
    gaps: Vec<T>,
    capacity: usize,
    last: Option<T>,
    growth: GrowthPolicy,
}

impl<T: GapInt> Default for CompressedPostings<T> {
    fn default() -> Self {
        Self::with_growth(GrowthPolicy::default())
    }
}

impl<T: GapInt> CompressedPostings<T> {
    /// Empty list with the default growth policy.
    pub fn new() -> Self {
        Self::default()
    }

    /// Empty list with a logical capacity of `growth.initial_capacity` ids.
    ///
    /// Nothing is allocated until the first append.
    pub fn with_growth(growth: GrowthPolicy) -> Self {
        Self {
            gaps: Vec::new(),
            capacity: growth.initial_capacity,
            last: None,
            growth,
        }
    }

    /// Build from an ascending batch.
    ///
    /// Batches larger than the initial capacity are gap-encoded in one pass
    /// and sized exactly; smaller ones go through [`CompressedPostings::add`].
    /// Consecutive duplicates collapse either way.
    pub fn from_sorted(ids: &[T], growth: GrowthPolicy) -> Result<Self, Error> {
        if ids.len() <= growth.initial_capacity {
            let mut list = Self::with_growth(growth);
            for &id in ids {
                list.add(id)?;
            }
            return Ok(list);
        }

        let mut distinct = ids.to_vec();
        distinct.dedup();
        let gaps = codec::gaps_from_sorted_ids(&distinct).map_err(|e| match e {
            codec::Error::NotStrictlyIncreasing { prev, next, .. } => Error::InvalidAppendOrder {
                previous: prev,
                next,
            },
            other => Error::Codec(other),
        })?;
        Ok(Self {
            capacity: gaps.len(),
            last: distinct.last().copied(),
            gaps,
            growth,
        })
    }

    /// Append the next id in ascending order.
    pub fn add(&mut self, id: T) -> Result<(), Error> {
        if let Some(last) = self.last {
            match id.cmp(&last) {
                Ordering::Equal => return Ok(()),
                Ordering::Less => {
                    return Err(Error::InvalidAppendOrder {
                        previous: last.to_i128(),
                        next: id.to_i128(),
                    })
                }
                Ordering::Greater => {}
            }
        }
        self.push(id);
        Ok(())
    }

    // Caller guarantees `id` is above `self.last`.
    fn push(&mut self, id: T) {
        if self.gaps.len() == self.capacity {
            self.grow();
        }
        if self.gaps.len() == self.gaps.capacity() {
            self.reserve();
        }
        let gap = match self.last {
            None => id,
            Some(prev) => id.wrapping_gap(prev),
        };
        self.gaps.push(gap);
        self.last = Some(id);
    }

    fn grow(&mut self) {
        let target = self.growth.next_capacity(self.capacity);
        tracing::trace!(from = self.capacity, to = target, "growing postings buffer");
        self.capacity = target;
    }

    // Back the logical capacity with memory when the allocator allows it;
    // otherwise leave it to `Vec::push`.
    fn reserve(&mut self) {
        let wanted = self.capacity - self.gaps.len();
        if self.gaps.try_reserve_exact(wanted).is_err() {
            tracing::debug!(
                capacity = self.capacity,
                "postings capacity not reservable, growing on demand"
            );
        }
    }

    /// Shrink the buffer to exactly `len` ids.
    pub fn finalize(&mut self) {
        self.gaps.shrink_to_fit();
        self.capacity = self.gaps.len();
    }

    /// Lazily decode the stored ids in ascending order.
    pub fn decompress(&self) -> DeltaDecoder<'_, T> {
        codec::decode_iter(&self.gaps)
    }

    /// Membership test; stops at the first id not below `id`.
    pub fn contains(&self, id: T) -> bool {
        match self.last {
            Some(last) if id <= last => {}
            _ => return false,
        }
        for value in self.decompress() {
            if value >= id {
                return value == id;
            }
        }
        false
    }

    /// Number of stored ids.
    pub fn len(&self) -> usize {
        self.gaps.len()
    }

    /// Whether nothing has been added.
    pub fn is_empty(&self) -> bool {
        self.gaps.is_empty()
    }

    /// Logical capacity of the buffer.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Smallest id.
    pub fn first(&self) -> Option<T> {
        self.gaps.first().copied()
    }

    /// Largest (most recently added) id.
    pub fn last(&self) -> Option<T> {
        self.last
    }

    /// The raw gap stream.
    pub fn gaps(&self) -> &[T] {
        &self.gaps
    }

    /// Growth policy used when the buffer fills up.
    pub fn growth(&self) -> &GrowthPolicy {
        &self.growth
    }

    /// Gap stream as consecutive LEB128 varints.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.gaps.len());
        varint::encode_gaps(&self.gaps, &mut out);
        out
    }

    /// Inverse of [`CompressedPostings::to_bytes`]. The result is exactly sized.
    pub fn from_bytes(bytes: &[u8], growth: GrowthPolicy) -> Result<Self, Error> {
        let gaps = varint::decode_gaps::<T>(bytes)?;
        let ids = codec::ids_from_gaps(&gaps)?;
        Ok(Self {
            capacity: gaps.len(),
            last: ids.last().copied(),
            gaps,
            growth,
        })
    }
}

impl<T: GapInt> Postings for CompressedPostings<T> {
    type Id = T;
    type Iter<'a> = DeltaDecoder<'a, T> where Self: 'a;

    fn seeded(first: T, growth: &GrowthPolicy) -> Self {
        let mut list = Self::with_growth(*growth);
        list.push(first);
        list
    }

    fn add(&mut self, id: T) -> Result<(), Error> {
        CompressedPostings::add(self, id)
    }

    fn contains(&self, id: &T) -> bool {
        CompressedPostings::contains(self, *id)
    }

    fn len(&self) -> usize {
        self.gaps.len()
    }

    fn iter(&self) -> Self::Iter<'_> {
        self.decompress()
    }

    fn finalize(&mut self) {
        CompressedPostings::finalize(self)
    }

    fn synthesize_ids(count: usize) -> Result<Vec<T>, Error> {
        if let Some(max) = count.checked_sub(1) {
            let wide = max as i128;
            let narrowed = T::from_i128_lossy(wide);
            if narrowed.to_i128() != wide {
                return Err(Error::NonNumericIdentifier {
                    value: wide.to_string(),
                    coerced: Some(narrowed.to_string()),
                });
            }
        }
        Ok((0..count).map(|i| T::from_i128_lossy(i as i128)).collect())
    }

    fn check_document_order(previous: Option<&T>, next: &T) -> Result<(), Error> {
        match previous {
            Some(prev) if next <= prev => Err(Error::InvalidAppendOrder {
                previous: prev.to_i128(),
                next: next.to_i128(),
            }),
            _ => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn small(initial_capacity: usize) -> GrowthPolicy {
        GrowthPolicy {
            initial_capacity,
            expansion_rate: 2.0,
        }
    }

    #[test]
    fn stores_first_absolute_then_gaps() {
        let list = CompressedPostings::from_sorted(&[3u32, 7, 8, 20], small(10)).unwrap();
        assert_eq!(list.gaps(), &[3, 4, 1, 12]);
        assert_eq!(list.decompress().collect::<Vec<_>>(), vec![3, 7, 8, 20]);
        assert_eq!(list.first(), Some(3));
        assert_eq!(list.last(), Some(20));
    }

    #[test]
    fn out_of_order_append_is_rejected() {
        let mut list = CompressedPostings::<u32>::new();
        list.add(5).unwrap();
        assert_eq!(
            list.add(3),
            Err(Error::InvalidAppendOrder {
                previous: 5,
                next: 3
            })
        );
        assert_eq!(list.decompress().collect::<Vec<_>>(), vec![5]);
    }

    #[test]
    fn only_consecutive_duplicates_collapse() {
        let mut list = CompressedPostings::<u32>::new();
        list.add(1).unwrap();
        list.add(1).unwrap();
        list.add(2).unwrap();
        assert_eq!(list.len(), 2);
        // 1 is no longer the most recent value, so it is not treated as a duplicate.
        assert!(matches!(list.add(1), Err(Error::InvalidAppendOrder { .. })));
        assert_eq!(list.len(), 2);
    }

    #[test]
    fn grows_geometrically_then_finalizes_exactly() {
        let mut list = CompressedPostings::<u64>::with_growth(small(2));
        assert_eq!(list.capacity(), 2);
        list.add(1).unwrap();
        list.add(2).unwrap();
        assert_eq!(list.capacity(), 2);
        list.add(3).unwrap();
        assert_eq!(list.capacity(), 4);
        list.add(4).unwrap();
        list.add(5).unwrap();
        assert_eq!(list.capacity(), 8);

        list.finalize();
        assert_eq!(list.capacity(), 5);
        assert_eq!(list.decompress().collect::<Vec<_>>(), vec![1, 2, 3, 4, 5]);
    }

    #[test]
    fn zero_initial_capacity_still_grows() {
        let mut list = CompressedPostings::<u32>::with_growth(small(0));
        list.add(10).unwrap();
        list.add(11).unwrap();
        assert_eq!(list.len(), 2);
        assert!(list.capacity() >= 2);
    }

    #[test]
    fn huge_logical_capacity_does_not_allocate_up_front() {
        let mut list = CompressedPostings::<u32>::with_growth(small(usize::MAX));
        assert_eq!(list.capacity(), usize::MAX);
        list.add(4).unwrap();
        list.add(9).unwrap();
        assert_eq!(list.decompress().collect::<Vec<_>>(), vec![4, 9]);

        let aggressive = GrowthPolicy {
            initial_capacity: 1,
            expansion_rate: 1e300,
        };
        let mut list = CompressedPostings::<u32>::with_growth(aggressive);
        for id in 0..5 {
            list.add(id).unwrap();
        }
        assert_eq!(list.capacity(), usize::MAX);
        list.finalize();
        assert_eq!(list.capacity(), 5);
    }

    #[test]
    fn large_batch_is_sized_exactly() {
        let ids: Vec<u32> = (0..50).map(|i| i * 3).collect();
        let list = CompressedPostings::from_sorted(&ids, small(10)).unwrap();
        assert_eq!(list.capacity(), 50);
        assert_eq!(list.decompress().collect::<Vec<_>>(), ids);
    }

    #[test]
    fn batch_paths_agree_on_duplicates_and_errors() {
        let ids = [1u32, 1, 2, 3, 3, 4];
        let small_path = CompressedPostings::from_sorted(&ids, small(10)).unwrap();
        let batch_path = CompressedPostings::from_sorted(&ids, small(2)).unwrap();
        assert_eq!(
            small_path.decompress().collect::<Vec<_>>(),
            batch_path.decompress().collect::<Vec<_>>()
        );

        for growth in [small(10), small(2)] {
            assert_eq!(
                CompressedPostings::from_sorted(&[1u32, 5, 3], growth).unwrap_err(),
                Error::InvalidAppendOrder {
                    previous: 5,
                    next: 3
                }
            );
        }
    }

    #[test]
    fn contains_stops_early() {
        let list = CompressedPostings::from_sorted(&[2i64, 4, 8], small(4)).unwrap();
        assert!(list.contains(4));
        assert!(!list.contains(5));
        assert!(!list.contains(9));
        assert!(!list.contains(-1));
        assert!(!CompressedPostings::<i64>::new().contains(0));
    }

    #[test]
    fn signed_ids_span_zero() {
        let ids = [i32::MIN, -1, 0, i32::MAX];
        let list = CompressedPostings::from_sorted(&ids, small(1)).unwrap();
        assert_eq!(list.decompress().collect::<Vec<_>>(), ids.to_vec());
    }

    #[test]
    fn bytes_roundtrip_and_reject_garbage() {
        let list = CompressedPostings::from_sorted(&[5u32, 300, 301], small(10)).unwrap();
        let bytes = list.to_bytes();
        assert_eq!(bytes, vec![0x05, 0xA7, 0x02, 0x01]);
        let back = CompressedPostings::<u32>::from_bytes(&bytes, small(10)).unwrap();
        assert_eq!(back.decompress().collect::<Vec<_>>(), vec![5, 300, 301]);
        assert_eq!(back.capacity(), 3);

        assert!(matches!(
            CompressedPostings::<u32>::from_bytes(&[0x05, 0x00], small(10)),
            Err(Error::Codec(codec::Error::NotStrictlyIncreasing { .. }))
        ));
        assert!(matches!(
            CompressedPostings::<u32>::from_bytes(&[0x80], small(10)),
            Err(Error::Codec(codec::Error::InvalidVarint { offset: 0 }))
        ));
    }

    #[test]
    fn synthesized_ids_must_fit_the_width() {
        let ids = <CompressedPostings<u16> as Postings>::synthesize_ids(3).unwrap();
        assert_eq!(ids, vec![0, 1, 2]);
        assert!(<CompressedPostings<u16> as Postings>::synthesize_ids(0)
            .unwrap()
            .is_empty());
        assert!(matches!(
            <CompressedPostings<u16> as Postings>::synthesize_ids(70_000),
            Err(Error::NonNumericIdentifier { .. })
        ));
    }

    proptest! {
        #[test]
        fn decompress_inverts_compress(
            mut ids in prop::collection::vec(0u32..1_000_000, 0..300),
            initial in 0usize..32,
        ) {
            ids.sort_unstable();
            ids.dedup();
            let list = CompressedPostings::from_sorted(&ids, small(initial)).unwrap();
            prop_assert_eq!(list.decompress().collect::<Vec<_>>(), ids);
        }

        #[test]
        fn len_never_exceeds_capacity(
            steps in prop::collection::vec(0u32..5, 0..200),
            initial in 0usize..8,
            rate in 1.1f64..4.0,
        ) {
            let growth = GrowthPolicy { initial_capacity: initial, expansion_rate: rate };
            let mut list = CompressedPostings::<u32>::with_growth(growth);
            let mut next = 0u32;
            for step in steps {
                next += step;
                list.add(next).unwrap();
                prop_assert!(list.len() <= list.capacity());
            }
            let before: Vec<u32> = list.decompress().collect();
            list.finalize();
            prop_assert_eq!(list.capacity(), list.len());
            prop_assert_eq!(list.decompress().collect::<Vec<_>>(), before);
        }
    }
}
