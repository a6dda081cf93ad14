//! Connection pool partitioning
//!
//! A transport keeps idle connections grouped by a key. Requests that share
//! a key may reuse each other's connections. The key is computed by the
//! [`ConnectionPoolPartitioning`] attached to the request.

use std::fmt;

use crate::proxy::ProxyServer;
use crate::Url;

/// The key a connection pool groups connections under.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PartitionKey(String);

impl PartitionKey {
    /// Build a key from any string.
    pub fn new<T: Into<String>>(key: T) -> PartitionKey {
        PartitionKey(key.into())
    }

    /// View the key as a string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PartitionKey {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Decides which pool partition a request's connection belongs to.
pub trait ConnectionPoolPartitioning: Send + Sync {
    /// The key for a request to `url`, optionally routed through `proxy`.
    fn partition_key(&self, url: &Url, proxy: Option<&ProxyServer>) -> PartitionKey;
}

/// One partition per target origin, or per proxy when one is used.
///
/// This is the default.
#[derive(Clone, Copy, Debug, Default)]
pub struct PerHostPartitioning;

impl ConnectionPoolPartitioning for PerHostPartitioning {
    fn partition_key(&self, url: &Url, proxy: Option<&ProxyServer>) -> PartitionKey {
        match proxy {
            Some(proxy) => PartitionKey(proxy.url()),
            None => PartitionKey(base_url(url)),
        }
    }
}

impl<F> ConnectionPoolPartitioning for F
where
    F: Fn(&Url, Option<&ProxyServer>) -> PartitionKey + Send + Sync,
{
    fn partition_key(&self, url: &Url, proxy: Option<&ProxyServer>) -> PartitionKey {
        (self)(url, proxy)
    }
}

/// `scheme://host:port`, with the scheme's default port filled in.
pub(crate) fn base_url(url: &Url) -> String {
    let host = url.host_str().unwrap_or("");
    match url.port_or_known_default() {
        Some(port) => format!("{}://{}:{}", url.scheme(), host, port),
        None => format!("{}://{}", url.scheme(), host),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn per_host_uses_origin_with_default_port() {
        let url = Url::parse("https://example.com/a/b?c=d").unwrap();
        let key = PerHostPartitioning.partition_key(&url, None);
        assert_eq!(key.as_str(), "https://example.com:443");
    }

    #[test]
    fn per_host_with_explicit_port() {
        let url = Url::parse("http://example.com:8080/").unwrap();
        let key = PerHostPartitioning.partition_key(&url, None);
        assert_eq!(key.to_string(), "http://example.com:8080");
    }

    #[test]
    fn per_host_prefers_proxy() {
        let url = Url::parse("http://example.com/").unwrap();
        let proxy = ProxyServer::http("proxy.local", 3128);
        let key = PerHostPartitioning.partition_key(&url, Some(&proxy));
        assert_eq!(key.as_str(), "http://proxy.local:3128");
    }

    #[test]
    fn closures_partition() {
        let single = |_: &Url, _: Option<&ProxyServer>| PartitionKey::new("all");
        let url = Url::parse("http://a/").unwrap();
        assert_eq!(single.partition_key(&url, None).as_str(), "all");
    }
}
