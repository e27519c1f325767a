//! JSON helpers over `serde-json-core`.
//!
//! The APIs this crate reads return arrays longer than it cares about (several recent
//! readings, a multi-day forecast). [`Leading`] keeps the first `N` elements and skips the
//! rest, so the records can be parsed without a buffer sized for the whole array. When what
//! to keep depends on a runtime value, [`from_slice_seed`] drives a `DeserializeSeed` instead.

use core::fmt;
use core::marker::PhantomData;
use core::ops::Deref;

use heapless::Vec;
use serde::Deserialize;
use serde::de::{self, DeserializeSeed, Deserializer, IgnoredAny, SeqAccess, Visitor};

/// The first `N` elements of a JSON array; later elements are parsed and discarded.
#[derive(Clone, Debug, PartialEq)]
pub struct Leading<T, const N: usize>(Vec<T, N>);

impl<T, const N: usize> Deref for Leading<T, N> {
    type Target = [T];

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl<'de, T, const N: usize> Deserialize<'de> for Leading<T, N>
where
    T: Deserialize<'de>,
{
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct LeadingVisitor<T, const N: usize>(PhantomData<T>);

        impl<'de, T, const N: usize> Visitor<'de> for LeadingVisitor<T, N>
        where
            T: Deserialize<'de>,
        {
            type Value = Leading<T, N>;

            fn expecting(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(formatter, "an array")
            }

            fn visit_seq<A>(self, mut seq: A) -> Result<Self::Value, A::Error>
            where
                A: SeqAccess<'de>,
            {
                let mut kept = Vec::new();
                while !kept.is_full() {
                    match seq.next_element()? {
                        Some(element) => {
                            if kept.push(element).is_err() {
                                return Err(de::Error::invalid_length(N + 1, &self));
                            }
                        }
                        None => return Ok(Leading(kept)),
                    }
                }
                while seq.next_element::<IgnoredAny>()?.is_some() {}
                Ok(Leading(kept))
            }
        }

        deserializer.deserialize_seq(LeadingVisitor(PhantomData))
    }
}

/// Parse `body` as a single JSON value of type `T`. Only whitespace may follow it.
///
/// # Errors
///
/// Returns the `serde-json-core` error if `body` is not valid JSON of the expected shape.
pub fn from_slice<'a, T>(body: &'a [u8]) -> serde_json_core::de::Result<T>
where
    T: Deserialize<'a>,
{
    serde_json_core::from_slice(body).map(|(value, _consumed)| value)
}

/// Like [`from_slice`], but the value is produced by `seed`.
///
/// # Errors
///
/// Returns the `serde-json-core` error if `body` is not valid JSON of the shape `seed` expects.
pub fn from_slice_seed<'a, S>(body: &'a [u8], seed: S) -> serde_json_core::de::Result<S::Value>
where
    S: DeserializeSeed<'a>,
{
    let mut deserializer = serde_json_core::de::Deserializer::new(body, None);
    let value = seed.deserialize(&mut deserializer)?;
    deserializer.end()?;
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keeps_only_leading_elements() {
        let kept: Leading<u8, 2> = from_slice(b"[1, 2, 3, 4]").unwrap();
        assert_eq!(&*kept, &[1, 2]);

        let short: Leading<u8, 2> = from_slice(b"[7]").unwrap();
        assert_eq!(&*short, &[7]);

        let empty: Leading<u8, 2> = from_slice(b"[]").unwrap();
        assert!(empty.is_empty());
    }

    #[test]
    fn skips_nested_values_after_the_leading_ones() {
        let kept: Leading<u8, 1> = from_slice(br#"[5, {"a": [1, 2]}, "x"]"#).unwrap();
        assert_eq!(&*kept, &[5]);
    }

    struct Nth(usize);

    impl<'de> DeserializeSeed<'de> for Nth {
        type Value = Option<u8>;

        fn deserialize<D: Deserializer<'de>>(self, deserializer: D) -> Result<Self::Value, D::Error> {
            let kept: Leading<u8, 16> = Leading::deserialize(deserializer)?;
            Ok(kept.get(self.0).copied())
        }
    }

    #[test]
    fn seed_picks_by_runtime_value() {
        assert_eq!(from_slice_seed(b"[4, 5, 6] ", Nth(2)).unwrap(), Some(6));
        assert_eq!(from_slice_seed(b"[4]", Nth(2)).unwrap(), None);
        assert!(from_slice_seed(b"[4] x", Nth(0)).is_err());
    }

    #[test]
    fn rejects_non_arrays() {
        assert!(from_slice::<Leading<u8, 2>>(b"{}").is_err());
        assert!(from_slice::<Leading<u8, 2>>(b"[1, ").is_err());
    }
}
