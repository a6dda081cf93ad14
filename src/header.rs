//! HTTP header types
//!
//! [`Headers`] is the multimap carried by a request. Lookups are
//! case-insensitive, the spelling a name was first given is what iteration
//! yields, and both distinct names and the values under one name keep their
//! insertion order.

use std::fmt;

use indexmap::IndexMap;

pub use http::header::{HeaderMap, HeaderName, HeaderValue, InvalidHeaderName, InvalidHeaderValue};
pub use http::header::{AUTHORIZATION, CONTENT_LENGTH, CONTENT_TYPE};

/// An ordered, case-insensitive header multimap.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct Headers {
    entries: IndexMap<HeaderName, Entry>,
}

#[derive(Clone, PartialEq, Eq)]
struct Entry {
    original: String,
    values: Vec<HeaderValue>,
}

impl Headers {
    /// Create an empty map.
    pub fn new() -> Headers {
        Headers::default()
    }

    /// Number of distinct header names.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if there are no headers.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns true if at least one value is stored for `name`.
    pub fn contains_key(&self, name: &str) -> bool {
        self.lookup(name).is_some()
    }

    /// Replace all values stored under `name` with the single `value`.
    ///
    /// A name that already exists keeps its position and its original
    /// spelling.
    pub fn replace_with<K, V>(&mut self, name: K, value: V) -> crate::Result<()>
    where
        K: AsRef<str>,
        V: TryInto<HeaderValue>,
        V::Error: Into<http::Error>,
    {
        let value = value.try_into().map_err(value_error)?;
        self.insert_value(name.as_ref(), value, true)
    }

    /// Append `value` to the values stored under `name`.
    pub fn add<K, V>(&mut self, name: K, value: V) -> crate::Result<()>
    where
        K: AsRef<str>,
        V: TryInto<HeaderValue>,
        V::Error: Into<http::Error>,
    {
        let value = value.try_into().map_err(value_error)?;
        self.insert_value(name.as_ref(), value, false)
    }

    pub(crate) fn insert_value(
        &mut self,
        name: &str,
        value: HeaderValue,
        replace: bool,
    ) -> crate::Result<()> {
        let key = HeaderName::from_bytes(name.as_bytes()).map_err(crate::error::builder)?;
        match self.entries.get_mut(&key) {
            Some(entry) => {
                if replace {
                    entry.values.clear();
                }
                entry.values.push(value);
            }
            None => {
                self.entries.insert(
                    key,
                    Entry {
                        original: name.to_owned(),
                        values: vec![value],
                    },
                );
            }
        }
        Ok(())
    }

    /// The first value stored for `name`.
    pub fn first_value(&self, name: &str) -> Option<&HeaderValue> {
        self.lookup(name).and_then(|entry| entry.values.first())
    }

    /// All values stored for `name`, in insertion order.
    pub fn get_all(&self, name: &str) -> &[HeaderValue] {
        match self.lookup(name) {
            Some(entry) => &entry.values,
            None => &[],
        }
    }

    /// All values for `name` joined by `separator`.
    ///
    /// Values that aren't visible ASCII are skipped.
    pub fn joined_value(&self, name: &str, separator: &str) -> Option<String> {
        let entry = self.lookup(name)?;
        let joined = entry
            .values
            .iter()
            .filter_map(|value| value.to_str().ok())
            .collect::<Vec<_>>()
            .join(separator);
        Some(joined)
    }

    /// Remove every value for `name`, returning them.
    pub fn remove(&mut self, name: &str) -> Vec<HeaderValue> {
        let key = match HeaderName::from_bytes(name.as_bytes()) {
            Ok(key) => key,
            Err(_) => return Vec::new(),
        };
        self.entries
            .shift_remove(&key)
            .map(|entry| entry.values)
            .unwrap_or_default()
    }

    /// Iterate over `(name, values)` using each name's original spelling.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[HeaderValue])> {
        self.entries
            .values()
            .map(|entry| (entry.original.as_str(), entry.values.as_slice()))
    }

    /// Convert into an `http::HeaderMap`, for handing to a transport.
    pub fn to_header_map(&self) -> HeaderMap {
        let mut map = HeaderMap::with_capacity(self.entries.len());
        for (name, entry) in &self.entries {
            for value in &entry.values {
                map.append(name.clone(), value.clone());
            }
        }
        map
    }

    fn lookup(&self, name: &str) -> Option<&Entry> {
        let key = HeaderName::from_bytes(name.as_bytes()).ok()?;
        self.entries.get(&key)
    }
}

fn value_error<E: Into<http::Error>>(err: E) -> crate::Error {
    let err: http::Error = err.into();
    crate::error::builder(err)
}

impl From<HeaderMap> for Headers {
    fn from(map: HeaderMap) -> Headers {
        let mut headers = Headers::new();
        for (name, value) in map.iter() {
            headers
                .entries
                .entry(name.clone())
                .or_insert_with(|| Entry {
                    original: name.as_str().to_owned(),
                    values: Vec::new(),
                })
                .values
                .push(value.clone());
        }
        headers
    }
}

impl fmt::Debug for Headers {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_map()
            .entries(self.entries.values().map(|e| (&e.original, &e.values)))
            .finish()
    }
}

/// A trait to try to convert some type into an optional `HeaderValue`.
///
/// This trait is "sealed", such that only types within reqbuild can
/// implement it. `None` stands for a missing value, which the builder
/// stores as an empty string.
pub trait IntoHeaderValue: sealed::Sealed {}

impl<T: sealed::Sealed> IntoHeaderValue for T {}

pub(crate) mod sealed {
    use super::HeaderValue;

    pub trait Sealed {
        fn into_header_value(self) -> Result<Option<HeaderValue>, http::Error>;
    }

    impl Sealed for HeaderValue {
        fn into_header_value(self) -> Result<Option<HeaderValue>, http::Error> {
            Ok(Some(self))
        }
    }

    impl<'a> Sealed for &'a str {
        fn into_header_value(self) -> Result<Option<HeaderValue>, http::Error> {
            Ok(Some(HeaderValue::from_str(self)?))
        }
    }

    impl Sealed for String {
        fn into_header_value(self) -> Result<Option<HeaderValue>, http::Error> {
            Ok(Some(HeaderValue::try_from(self)?))
        }
    }

    impl<'a> Sealed for &'a String {
        fn into_header_value(self) -> Result<Option<HeaderValue>, http::Error> {
            self.as_str().into_header_value()
        }
    }

    impl<T: Sealed> Sealed for Option<T> {
        fn into_header_value(self) -> Result<Option<HeaderValue>, http::Error> {
            match self {
                Some(value) => value.into_header_value(),
                None => Ok(None),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_is_case_insensitive() {
        let mut headers = Headers::new();
        headers.add("X-Custom", "a").unwrap();
        headers.add("x-custom", "b").unwrap();

        assert_eq!(headers.len(), 1);
        assert_eq!(headers.get_all("X-CUSTOM"), &["a", "b"]);
        assert_eq!(headers.first_value("x-Custom").unwrap(), "a");
    }

    #[test]
    fn iteration_keeps_first_spelling_and_order() {
        let mut headers = Headers::new();
        headers.add("Content-Type", "text/plain").unwrap();
        headers.add("X-B", "1").unwrap();
        headers.add("content-type", "ignored-spelling").unwrap();

        let names: Vec<&str> = headers.iter().map(|(name, _)| name).collect();
        assert_eq!(names, vec!["Content-Type", "X-B"]);
    }

    #[test]
    fn replace_with_drops_previous_values() {
        let mut headers = Headers::new();
        headers.add("Accept", "a").unwrap();
        headers.add("Accept", "b").unwrap();
        headers.replace_with("ACCEPT", "c").unwrap();

        assert_eq!(headers.get_all("accept"), &["c"]);
    }

    #[test]
    fn joined_value_uses_separator() {
        let mut headers = Headers::new();
        headers.add("Accept", "text/html").unwrap();
        headers.add("Accept", "application/json").unwrap();

        assert_eq!(
            headers.joined_value("accept", ", ").as_deref(),
            Some("text/html, application/json")
        );
        assert_eq!(headers.joined_value("missing", ", "), None);
    }

    #[test]
    fn invalid_name_is_rejected() {
        let mut headers = Headers::new();
        let err = headers.add("bad name", "v").unwrap_err();
        assert!(err.is_builder());
        assert!(headers.is_empty());
    }

    #[test]
    fn remove_and_round_trip_to_header_map() {
        let mut headers = Headers::new();
        headers.add("A", "1").unwrap();
        headers.add("B", "2").unwrap();
        headers.add("B", "3").unwrap();

        assert_eq!(headers.remove("a"), vec![HeaderValue::from_static("1")]);

        let map = headers.to_header_map();
        assert_eq!(map.get_all("b").iter().count(), 2);

        let back = Headers::from(map);
        assert_eq!(back.get_all("B"), &["2", "3"]);
        assert_eq!(back.iter().next().map(|(name, _)| name), Some("b"));
    }
}
