//! Fixed-width integer abstraction for gap-encoded ids.

use std::fmt;
use std::hash::Hash;

/// A fixed-width integer that can be stored as a gap stream.
///
/// Gaps are computed with wrapping arithmetic in `Self`. For a strictly
/// increasing pair `prev < next` the true difference lies in `1..2^BITS`, so
/// the wrapped bit pattern is exact and `prev.wrapping_advance(gap)` restores
/// `next` for both signed and unsigned widths. A signed gap may therefore
/// *look* negative when printed; use [`GapInt::to_wire`] for its magnitude.
pub trait GapInt: Copy + Ord + Hash + fmt::Debug + fmt::Display + Send + Sync + 'static {
    /// Zero.
    const ZERO: Self;

    /// `self - prev`, wrapping at the type width.
    fn wrapping_gap(self, prev: Self) -> Self;

    /// `self + gap`, wrapping at the type width.
    fn wrapping_advance(self, gap: Self) -> Self;

    /// Exact widening conversion.
    fn to_i128(self) -> i128;

    /// Truncating (`as`) conversion. Callers detect loss by round-tripping
    /// through [`GapInt::to_i128`].
    fn from_i128_lossy(value: i128) -> Self;

    /// Bit pattern zero-extended to `u64` (the unsigned magnitude of a gap).
    fn to_wire(self) -> u64;

    /// Inverse of [`GapInt::to_wire`]; `None` if `value` is wider than `Self`.
    fn from_wire(value: u64) -> Option<Self>;
}

macro_rules! impl_gap_int {
    ($($t:ty => $bits:ty),* $(,)?) => {$(
        impl GapInt for $t {
            const ZERO: Self = 0;

            #[inline]
            fn wrapping_gap(self, prev: Self) -> Self {
                self.wrapping_sub(prev)
            }

            #[inline]
            fn wrapping_advance(self, gap: Self) -> Self {
                self.wrapping_add(gap)
            }

            #[inline]
            fn to_i128(self) -> i128 {
                self as i128
            }

            #[inline]
            fn from_i128_lossy(value: i128) -> Self {
                value as $t
            }

            #[inline]
            fn to_wire(self) -> u64 {
                self as $bits as u64
            }

            #[inline]
            fn from_wire(value: u64) -> Option<Self> {
                <$bits>::try_from(value).ok().map(|bits| bits as $t)
            }
        }
    )*};
}

impl_gap_int!(u16 => u16, u32 => u32, u64 => u64, i32 => u32, i64 => u64);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn signed_gap_spanning_zero_is_exact() {
        let prev = i32::MIN;
        let next = i32::MAX;
        let gap = next.wrapping_gap(prev);
        assert_eq!(gap.to_wire(), u32::MAX as u64);
        assert_eq!(prev.wrapping_advance(gap), next);
    }

    #[test]
    fn from_wire_rejects_wider_values() {
        assert_eq!(u16::from_wire(70_000), None);
        assert_eq!(u16::from_wire(65_535), Some(u16::MAX));
        assert_eq!(i32::from_wire(u32::MAX as u64), Some(-1));
        assert_eq!(i32::from_wire(u32::MAX as u64 + 1), None);
    }

    #[test]
    fn lossy_conversion_is_detectable_by_round_trip() {
        let wide: i128 = u32::MAX as i128 + 1;
        let narrowed = u32::from_i128_lossy(wide);
        assert_eq!(narrowed, 0);
        assert_ne!(narrowed.to_i128(), wide);
        assert_eq!(i64::from_i128_lossy(-5).to_i128(), -5);
    }
}
