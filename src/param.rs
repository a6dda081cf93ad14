//! Name/value pairs used for query strings and urlencoded forms.

use std::fmt;

use serde::Serialize;

/// A single name/value pair.
///
/// The value is optional: a query string such as `?debug` carries a bare
/// flag with no `=`. Several params may share a name; their order is kept.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Param {
    name: String,
    value: Option<String>,
}

impl Param {
    /// Create a pair with a value.
    pub fn new<N, V>(name: N, value: V) -> Param
    where
        N: Into<String>,
        V: Into<String>,
    {
        Param {
            name: name.into(),
            value: Some(value.into()),
        }
    }

    /// Create a bare flag, without a value.
    pub fn flag<N: Into<String>>(name: N) -> Param {
        Param {
            name: name.into(),
            value: None,
        }
    }

    /// The name of this pair.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The value of this pair, if any.
    pub fn value(&self) -> Option<&str> {
        self.value.as_deref()
    }
}

impl<N, V> From<(N, Option<V>)> for Param
where
    N: Into<String>,
    V: Into<String>,
{
    fn from((name, value): (N, Option<V>)) -> Param {
        Param {
            name: name.into(),
            value: value.map(Into::into),
        }
    }
}

impl fmt::Display for Param {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self.value {
            Some(ref value) => write!(f, "{}={}", self.name, value),
            None => f.write_str(&self.name),
        }
    }
}

/// Split a raw query string into params.
///
/// Pairs are split on `&`, then on the first `=`. A pair with no `=`, or
/// with `=` as its first character, becomes a valueless param holding the
/// whole segment. Nothing is percent-decoded. Trailing empty segments are
/// dropped.
pub(crate) fn parse_query(query: &str) -> Vec<Param> {
    let mut segments: Vec<&str> = query.split('&').collect();
    while let Some(&"") = segments.last() {
        segments.pop();
    }

    segments
        .into_iter()
        .map(|segment| match segment.find('=') {
            Some(pos) if pos > 0 => Param::new(&segment[..pos], &segment[pos + 1..]),
            _ => Param::flag(segment),
        })
        .collect()
}

/// Flatten a `name -> values` map into params, in map iteration order.
pub(crate) fn from_map<I, K, VS, V>(map: I) -> Vec<Param>
where
    I: IntoIterator<Item = (K, VS)>,
    K: Into<String>,
    VS: IntoIterator<Item = V>,
    V: Into<String>,
{
    let mut params = Vec::new();
    for (name, values) in map {
        let name = name.into();
        for value in values {
            params.push(Param::new(name.clone(), value));
        }
    }
    params
}

/// Serialize any urlencodable value into params.
pub(crate) fn serialize<T: Serialize + ?Sized>(value: &T) -> crate::Result<Vec<Param>> {
    let encoded = serde_urlencoded::to_string(value).map_err(crate::error::builder)?;
    Ok(url::form_urlencoded::parse(encoded.as_bytes())
        .map(|(name, value)| Param::new(name, value))
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    #[test]
    fn parse_query_pairs_and_flags() {
        let params = parse_query("a=1&b");
        assert_eq!(params, vec![Param::new("a", "1"), Param::flag("b")]);
    }

    #[test]
    fn parse_query_leading_equals_is_a_flag() {
        let params = parse_query("=x&k=v=w");
        assert_eq!(params, vec![Param::flag("=x"), Param::new("k", "v=w")]);
    }

    #[test]
    fn parse_query_keeps_encoding_and_empty_values() {
        let params = parse_query("q=a%20b&empty=");
        assert_eq!(params, vec![Param::new("q", "a%20b"), Param::new("empty", "")]);
    }

    #[test]
    fn parse_query_drops_trailing_empty_segments() {
        assert_eq!(parse_query("a=1&&"), vec![Param::new("a", "1")]);
        assert_eq!(parse_query("a=1&&b=2").len(), 3);
    }

    #[test]
    fn from_map_flattens_in_key_order() {
        let mut map = BTreeMap::new();
        map.insert("b", vec!["2"]);
        map.insert("a", vec!["1", "11"]);

        let params = from_map(map);
        assert_eq!(
            params,
            vec![Param::new("a", "1"), Param::new("a", "11"), Param::new("b", "2")]
        );
    }

    #[test]
    fn serialize_tuples() {
        let params = serialize(&[("lang", "rust"), ("q", "a b")]).unwrap();
        assert_eq!(params, vec![Param::new("lang", "rust"), Param::new("q", "a b")]);
    }

    #[test]
    fn display() {
        assert_eq!(Param::new("a", "1").to_string(), "a=1");
        assert_eq!(Param::flag("b").to_string(), "b");
    }
}
