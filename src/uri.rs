//! URI finalization
//!
//! When a request is built, the query params staged on the builder are merged
//! into the URL by a [`UriEncoder`]. The URL's own query always comes first,
//! followed by the staged params in the order they were added:
//!
//! ```
//! use reqbuild::uri::{UriEncoder, UriEncoding};
//! use reqbuild::{Param, Url};
//!
//! let url = Url::parse("http://x/?z=9").unwrap();
//! let staged = [Param::new("a", "1"), Param::flag("b")];
//! let url = UriEncoding::Fixing.encode(url, &staged);
//! assert_eq!(url.query(), Some("z=9&a=1&b"));
//! ```

use std::fmt;

use once_cell::sync::Lazy;
use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};

use crate::param::Param;
use crate::Url;

/// The origin used when a request is built without a URL.
pub static DEFAULT_URL: Lazy<Url> =
    Lazy::new(|| Url::parse("http://localhost").expect("default url is valid"));

const SUPPORTED_SCHEMES: &[&str] = &["http", "https", "ws", "wss"];

/// Everything but RFC 3986 unreserved characters.
const QUERY_ELEMENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~');

/// Merges staged query params into a URL.
pub trait UriEncoder: Send + Sync {
    /// Produce the final URL from `url` and the staged `params`.
    fn encode(&self, url: Url, params: &[Param]) -> Url;
}

/// The built-in encoders.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum UriEncoding {
    /// Percent-encode staged names and values.
    #[default]
    Fixing,
    /// Append staged names and values as given.
    Raw,
}

impl UriEncoding {
    /// Pick the encoding matching a "disable URL encoding" switch.
    pub fn from_disabled(disable_url_encoding: bool) -> UriEncoding {
        if disable_url_encoding {
            UriEncoding::Raw
        } else {
            UriEncoding::Fixing
        }
    }

    fn append_param(self, query: &mut String, param: &Param) {
        if !query.is_empty() {
            query.push('&');
        }
        match self {
            UriEncoding::Fixing => {
                query.extend(utf8_percent_encode(param.name(), QUERY_ELEMENT));
                if let Some(value) = param.value() {
                    query.push('=');
                    query.extend(utf8_percent_encode(value, QUERY_ELEMENT));
                }
            }
            UriEncoding::Raw => {
                query.push_str(param.name());
                if let Some(value) = param.value() {
                    query.push('=');
                    query.push_str(value);
                }
            }
        }
    }
}

impl UriEncoder for UriEncoding {
    fn encode(&self, mut url: Url, params: &[Param]) -> Url {
        // `Url` has already normalized its own path and query while parsing,
        // so only the staged params still need any work.
        if params.is_empty() {
            if let Some("") = url.query() {
                url.set_query(None);
            }
            return url;
        }

        let mut query = url.query().unwrap_or_default().to_owned();
        for param in params {
            self.append_param(&mut query, param);
        }
        url.set_query(Some(&query));
        url
    }
}

impl fmt::Display for UriEncoding {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            UriEncoding::Fixing => f.write_str("fixing"),
            UriEncoding::Raw => f.write_str("raw"),
        }
    }
}

/// Fail unless `url` uses a scheme a transport can speak.
pub(crate) fn validate_supported_scheme(url: &Url) -> crate::Result<()> {
    if SUPPORTED_SCHEMES.contains(&url.scheme()) {
        Ok(())
    } else {
        Err(crate::error::url_bad_scheme(url.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn url(s: &str) -> Url {
        Url::parse(s).unwrap()
    }

    #[test]
    fn url_query_comes_before_staged_params() {
        let encoded = UriEncoding::Fixing.encode(
            url("http://x/?z=9"),
            &[Param::new("a", "1"), Param::new("b", "2")],
        );
        assert_eq!(encoded.as_str(), "http://x/?z=9&a=1&b=2");
    }

    #[test]
    fn fixing_percent_encodes_staged_params() {
        let encoded = UriEncoding::Fixing.encode(
            url("http://x/path"),
            &[Param::new("q", "a b&c"), Param::new("ü", "~ok-._")],
        );
        assert_eq!(encoded.query(), Some("q=a%20b%26c&%C3%BC=~ok-._"));
    }

    #[test]
    fn raw_appends_verbatim() {
        let encoded = UriEncoding::Raw.encode(url("http://x/"), &[Param::new("q", "a,b")]);
        assert_eq!(encoded.query(), Some("q=a,b"));
    }

    #[test]
    fn flags_are_written_without_equals() {
        let encoded = UriEncoding::Fixing.encode(url("http://x/"), &[Param::flag("debug")]);
        assert_eq!(encoded.query(), Some("debug"));
    }

    #[test]
    fn no_params_keeps_url() {
        let encoded = UriEncoding::Fixing.encode(url("http://x/a?b=c"), &[]);
        assert_eq!(encoded.as_str(), "http://x/a?b=c");

        let encoded = UriEncoding::Fixing.encode(url("http://x/a?"), &[]);
        assert_eq!(encoded.as_str(), "http://x/a");
    }

    #[test]
    fn supported_schemes() {
        for s in &["http://a/", "https://a/", "ws://a/", "wss://a/"] {
            assert!(validate_supported_scheme(&url(s)).is_ok(), "{}", s);
        }
        let err = validate_supported_scheme(&url("ftp://a/")).unwrap_err();
        assert!(err.is_scheme());
        assert_eq!(err.url().map(Url::as_str), Some("ftp://a/"));
    }

    #[test]
    fn from_disabled() {
        assert_eq!(UriEncoding::from_disabled(true), UriEncoding::Raw);
        assert_eq!(UriEncoding::from_disabled(false), UriEncoding::Fixing);
    }

    #[test]
    fn default_url() {
        assert_eq!(DEFAULT_URL.as_str(), "http://localhost/");
    }
}
