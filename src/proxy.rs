use std::fmt;

use crate::realm::Realm;

/// The proxy a request should be routed through.
///
/// This is only a description: connecting to the proxy, tunnelling and
/// proxy authentication are up to the transport. A `ProxyServer` has a
/// couple pieces to it:
///
/// - where the proxy lives (host, port and the port used for secured
///   targets)
/// - which target hosts bypass it
///
/// ```
/// use reqbuild::ProxyServer;
///
/// let proxy = ProxyServer::http("proxy.internal", 3128)
///     .non_proxy_host("*.corp.example")
///     .non_proxy_host("localhost");
///
/// assert!(proxy.is_ignored_for_host("build.corp.example"));
/// assert!(!proxy.is_ignored_for_host("crates.io"));
/// assert_eq!(proxy.url(), "http://proxy.internal:3128");
/// ```
#[derive(Clone)]
pub struct ProxyServer {
    scheme: ProxyScheme,
    host: String,
    port: u16,
    secured_port: u16,
    realm: Option<Realm>,
    non_proxy_hosts: Vec<String>,
}

/// How the transport talks to the proxy.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ProxyScheme {
    /// Plain HTTP to the proxy.
    Http,
    /// TLS to the proxy.
    Https,
}

impl ProxyServer {
    /// Proxy reached over plain HTTP. Secured targets use the same port.
    pub fn http<H: Into<String>>(host: H, port: u16) -> ProxyServer {
        ProxyServer::new(ProxyScheme::Http, host, port)
    }

    /// Proxy reached over TLS.
    pub fn https<H: Into<String>>(host: H, port: u16) -> ProxyServer {
        ProxyServer::new(ProxyScheme::Https, host, port)
    }

    fn new<H: Into<String>>(scheme: ProxyScheme, host: H, port: u16) -> ProxyServer {
        ProxyServer {
            scheme,
            host: host.into(),
            port,
            secured_port: port,
            realm: None,
            non_proxy_hosts: Vec::new(),
        }
    }

    /// Use a different port when the target is secured.
    pub fn with_secured_port(mut self, port: u16) -> ProxyServer {
        self.secured_port = port;
        self
    }

    /// Credentials for the proxy.
    pub fn with_realm(mut self, realm: Realm) -> ProxyServer {
        self.realm = Some(realm);
        self
    }

    /// Bypass the proxy for a host.
    ///
    /// Patterns are exact host names, or a suffix written as `*.example.com`
    /// or `.example.com`.
    pub fn non_proxy_host<T: Into<String>>(mut self, pattern: T) -> ProxyServer {
        self.non_proxy_hosts.push(pattern.into());
        self
    }

    /// The proxy scheme.
    pub fn scheme(&self) -> ProxyScheme {
        self.scheme
    }

    /// The proxy host.
    pub fn host(&self) -> &str {
        &self.host
    }

    /// The proxy port.
    pub fn port(&self) -> u16 {
        self.port
    }

    /// The proxy port used for secured targets.
    pub fn secured_port(&self) -> u16 {
        self.secured_port
    }

    /// The proxy credentials.
    pub fn realm(&self) -> Option<&Realm> {
        self.realm.as_ref()
    }

    /// The bypass patterns.
    pub fn non_proxy_hosts(&self) -> &[String] {
        &self.non_proxy_hosts
    }

    /// The proxy's own URL, `scheme://host:port`.
    pub fn url(&self) -> String {
        let scheme = match self.scheme {
            ProxyScheme::Http => "http",
            ProxyScheme::Https => "https",
        };
        format!("{}://{}:{}", scheme, self.host, self.port)
    }

    /// Returns true if requests to `host` should not use this proxy.
    pub fn is_ignored_for_host(&self, host: &str) -> bool {
        let host = host.to_ascii_lowercase();
        self.non_proxy_hosts
            .iter()
            .any(|pattern| matches_host(&pattern.to_ascii_lowercase(), &host))
    }
}

fn matches_host(pattern: &str, host: &str) -> bool {
    if let Some(suffix) = pattern.strip_prefix('*') {
        host.ends_with(suffix)
    } else if pattern.starts_with('.') {
        host.ends_with(pattern) || host == &pattern[1..]
    } else {
        host == pattern
    }
}

impl fmt::Debug for ProxyServer {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("ProxyServer")
            .field("url", &self.url())
            .field("secured_port", &self.secured_port)
            .field("non_proxy_hosts", &self.non_proxy_hosts)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exact_and_wildcard_bypass() {
        let proxy = ProxyServer::http("p", 8080)
            .non_proxy_host("LocalHost")
            .non_proxy_host("*.example.com");

        assert!(proxy.is_ignored_for_host("localhost"));
        assert!(proxy.is_ignored_for_host("api.example.com"));
        assert!(!proxy.is_ignored_for_host("example.com"));
        assert!(!proxy.is_ignored_for_host("example.org"));
    }

    #[test]
    fn dot_suffix_matches_domain_itself() {
        let proxy = ProxyServer::http("p", 8080).non_proxy_host(".rust-lang.org");
        assert!(proxy.is_ignored_for_host("rust-lang.org"));
        assert!(proxy.is_ignored_for_host("www.rust-lang.org"));
        assert!(!proxy.is_ignored_for_host("notrust-lang.org"));
    }

    #[test]
    fn secured_port_defaults_to_port() {
        let proxy = ProxyServer::https("p", 443);
        assert_eq!(proxy.secured_port(), 443);
        assert_eq!(proxy.with_secured_port(8443).secured_port(), 8443);
    }

    #[test]
    fn proxy_credentials() {
        let proxy = ProxyServer::http("p", 3128);
        assert!(proxy.realm().is_none());

        let proxy = proxy.with_realm(Realm::basic("user", "pass"));
        assert_eq!(proxy.realm().map(Realm::principal), Some("user"));
    }

    #[test]
    fn url() {
        assert_eq!(ProxyServer::https("secure.prox", 4545).url(), "https://secure.prox:4545");
    }
}
