//! Identifier validation, run before any postings exist.

use std::collections::HashSet;
use std::fmt::Debug;
use std::hash::Hash;

use crate::{Error, GapInt};

/// A raw identifier that may denote an exact integer.
///
/// Implemented for every primitive integer, for `f32`/`f64` values with no
/// fractional part, and for decimal strings (surrounding whitespace ignored).
pub trait NumericSource {
    /// The exact integer this value denotes, if any.
    fn exact_integer(&self) -> Option<i128>;

    /// The value as given, before any reading. Two raw identifiers are
    /// duplicates when these compare equal.
    fn raw(&self) -> RawIdentifier<'_>;
}

/// Hashable form of a raw identifier, compared before coercion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RawIdentifier<'a> {
    /// An integer, by bit pattern.
    Integer(u128),
    /// A float, by bit pattern (`-0.0` folded into `0.0`).
    Float(u64),
    /// Text, untrimmed.
    Text(&'a str),
}

macro_rules! impl_numeric_source_int {
    ($($t:ty),*) => {$(
        impl NumericSource for $t {
            fn exact_integer(&self) -> Option<i128> {
                i128::try_from(*self).ok()
            }

            fn raw(&self) -> RawIdentifier<'_> {
                RawIdentifier::Integer(*self as u128)
            }
        }
    )*};
}

impl_numeric_source_int!(i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize);

macro_rules! impl_numeric_source_float {
    ($($t:ty),*) => {$(
        impl NumericSource for $t {
            fn exact_integer(&self) -> Option<i128> {
                let v = f64::from(*self);
                // 2^127 is exactly representable; i128 covers [-2^127, 2^127)
                let bound = 2f64.powi(127);
                if v.is_finite() && v.fract() == 0.0 && v >= -bound && v < bound {
                    Some(v as i128)
                } else {
                    None
                }
            }

            fn raw(&self) -> RawIdentifier<'_> {
                let v = f64::from(*self);
                RawIdentifier::Float(if v == 0.0 { 0 } else { v.to_bits() })
            }
        }
    )*};
}

impl_numeric_source_float!(f32, f64);

impl NumericSource for str {
    fn exact_integer(&self) -> Option<i128> {
        self.trim().parse().ok()
    }

    fn raw(&self) -> RawIdentifier<'_> {
        RawIdentifier::Text(self)
    }
}

impl NumericSource for String {
    fn exact_integer(&self) -> Option<i128> {
        self.as_str().exact_integer()
    }

    fn raw(&self) -> RawIdentifier<'_> {
        RawIdentifier::Text(self)
    }
}

impl<T: NumericSource + ?Sized> NumericSource for &T {
    fn exact_integer(&self) -> Option<i128> {
        (**self).exact_integer()
    }

    fn raw(&self) -> RawIdentifier<'_> {
        (**self).raw()
    }
}

/// Check that `ids` pairs one-to-one with `documents` documents.
///
/// Returns the ids in order.
pub fn check_identifiers<K>(ids: &[K], documents: usize) -> Result<Vec<K>, Error>
where
    K: Clone + Eq + Hash + Debug,
{
    check_len(ids.len(), documents)?;
    if let Some(dup) = first_duplicate(ids) {
        tracing::debug!(identifier = ?dup, "duplicate identifier");
        return Err(Error::DuplicateIdentifier(format!("{dup:?}")));
    }
    Ok(ids.to_vec())
}

/// Coerce raw identifiers into the fixed-width id type `T`.
///
/// Checks run in order: count mismatch, repeated raw values, any value that
/// is not an exact integer or does not survive a round trip through `T`, and
/// finally values that coincide after coercion (`"01"` and `"1"`).
pub fn coerce_identifiers<T, R>(raw: &[R], documents: usize) -> Result<Vec<T>, Error>
where
    T: GapInt,
    R: NumericSource + Debug,
{
    check_len(raw.len(), documents)?;
    let keys: Vec<RawIdentifier<'_>> = raw.iter().map(NumericSource::raw).collect();
    if let Some(pos) = first_duplicate_index(&keys) {
        let dup = &raw[pos];
        tracing::debug!(identifier = ?dup, "duplicate identifier");
        return Err(Error::DuplicateIdentifier(format!("{dup:?}")));
    }
    let mut out = Vec::with_capacity(raw.len());
    for value in raw {
        let Some(wide) = value.exact_integer() else {
            tracing::debug!(identifier = ?value, "identifier is not an integer");
            return Err(Error::NonNumericIdentifier {
                value: format!("{value:?}"),
                coerced: None,
            });
        };
        let narrowed = T::from_i128_lossy(wide);
        if narrowed.to_i128() != wide {
            tracing::debug!(
                identifier = ?value,
                coerced = %narrowed,
                "identifier does not fit the id type"
            );
            return Err(Error::NonNumericIdentifier {
                value: format!("{value:?}"),
                coerced: Some(narrowed.to_string()),
            });
        }
        out.push(narrowed);
    }
    if let Some(dup) = first_duplicate(&out) {
        tracing::debug!(identifier = %dup, "duplicate identifier after coercion");
        return Err(Error::DuplicateIdentifier(dup.to_string()));
    }
    Ok(out)
}

fn check_len(identifiers: usize, documents: usize) -> Result<(), Error> {
    if identifiers != documents {
        tracing::debug!(identifiers, documents, "identifier count mismatch");
        return Err(Error::SizeMismatch {
            identifiers,
            documents,
        });
    }
    Ok(())
}

fn first_duplicate<K: Eq + Hash>(ids: &[K]) -> Option<&K> {
    first_duplicate_index(ids).map(|pos| &ids[pos])
}

fn first_duplicate_index<K: Eq + Hash>(ids: &[K]) -> Option<usize> {
    let mut seen: HashSet<&K> = HashSet::with_capacity(ids.len());
    ids.iter().position(|id| !seen.insert(id))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn size_mismatch() {
        assert_eq!(
            check_identifiers(&[1u32, 2], 3),
            Err(Error::SizeMismatch {
                identifiers: 2,
                documents: 3
            })
        );
        assert_eq!(
            coerce_identifiers::<u32, _>(&["1"], 0),
            Err(Error::SizeMismatch {
                identifiers: 1,
                documents: 0
            })
        );
    }

    #[test]
    fn duplicate_is_reported() {
        assert_eq!(
            check_identifiers(&[4u32, 7, 4], 3),
            Err(Error::DuplicateIdentifier("4".into()))
        );
        let err = check_identifiers(&["a".to_string(), "a".to_string()], 2).unwrap_err();
        assert!(matches!(err, Error::DuplicateIdentifier(_)));
    }

    #[test]
    fn valid_ids_keep_their_order() {
        assert_eq!(check_identifiers(&[9u32, 3, 5], 3).unwrap(), vec![9, 3, 5]);
        assert!(check_identifiers::<u32>(&[], 0).unwrap().is_empty());
    }

    #[test]
    fn strings_and_floats_coerce() {
        let ids: Vec<u32> = coerce_identifiers(&[" 10", "11", "12 "], 3).unwrap();
        assert_eq!(ids, vec![10, 11, 12]);
        let ids: Vec<i32> = coerce_identifiers(&[-1.0f64, 2.0], 2).unwrap();
        assert_eq!(ids, vec![-1, 2]);
    }

    #[test]
    fn non_integers_are_rejected_without_coerced_form() {
        assert_eq!(
            coerce_identifiers::<u32, _>(&["12", "abc"], 2),
            Err(Error::NonNumericIdentifier {
                value: "\"abc\"".into(),
                coerced: None
            })
        );
        assert!(matches!(
            coerce_identifiers::<u32, _>(&[1.5f64], 1),
            Err(Error::NonNumericIdentifier { coerced: None, .. })
        ));
        assert!(matches!(
            coerce_identifiers::<u32, _>(&[f64::NAN], 1),
            Err(Error::NonNumericIdentifier { coerced: None, .. })
        ));
    }

    #[test]
    fn out_of_range_reports_coerced_value() {
        assert_eq!(
            coerce_identifiers::<u32, _>(&[4_294_967_296i64], 1),
            Err(Error::NonNumericIdentifier {
                value: "4294967296".into(),
                coerced: Some("0".into())
            })
        );
        assert_eq!(
            coerce_identifiers::<u32, _>(&[-1i64], 1),
            Err(Error::NonNumericIdentifier {
                value: "-1".into(),
                coerced: Some("4294967295".into())
            })
        );
        assert!(coerce_identifiers::<i32, _>(&[-1i64], 1).is_ok());
    }

    #[test]
    fn raw_duplicates_are_reported_before_non_integers() {
        assert_eq!(
            coerce_identifiers::<u32, _>(&["abc", "abc"], 2),
            Err(Error::DuplicateIdentifier("\"abc\"".into()))
        );
        assert_eq!(
            coerce_identifiers::<u32, _>(&["x", "7", "7"], 3),
            Err(Error::DuplicateIdentifier("\"7\"".into()))
        );
        assert_eq!(
            coerce_identifiers::<u32, _>(&[2.5f64, 2.5], 2),
            Err(Error::DuplicateIdentifier("2.5".into()))
        );
        assert_eq!(
            coerce_identifiers::<u32, _>(&[0.0f64, -0.0], 2),
            Err(Error::DuplicateIdentifier("-0.0".into()))
        );
        assert!(matches!(
            coerce_identifiers::<u32, _>(&[3u64, 3], 1),
            Err(Error::SizeMismatch { .. })
        ));
    }

    #[test]
    fn coercion_collisions_are_duplicates() {
        assert_eq!(
            coerce_identifiers::<u32, _>(&["01", "1"], 2),
            Err(Error::DuplicateIdentifier("1".into()))
        );
    }
}
