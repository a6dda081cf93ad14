use hyper_util::client::legacy::connect::dns::Name as HyperName;

use std::collections::HashMap;
use std::fmt;
use std::future::Future;
use std::net::SocketAddr;
use std::pin::Pin;
use std::str::FromStr;
use std::sync::Arc;

use crate::error::BoxError;

/// Alias for an `Iterator` trait object over `SocketAddr`.
pub type Addrs = Box<dyn Iterator<Item = SocketAddr> + Send>;

/// Alias for the `Future` type returned by a DNS resolver.
pub type Resolving = Pin<Box<dyn Future<Output = Result<Addrs, BoxError>> + Send>>;

/// Trait for customizing DNS resolution.
///
/// A resolver is attached to a request with
/// [`RequestBuilder::set_name_resolver`](crate::RequestBuilder::set_name_resolver)
/// and called by the transport when it opens a connection.
pub trait Resolve: Send + Sync {
    /// Performs DNS resolution on a `Name`.
    /// The return type is a future containing an iterator of `SocketAddr`.
    ///
    /// Explicitly specified port in the URL will override any port in the
    /// resolved `SocketAddr`s. Otherwise, port `0` will be replaced by the
    /// conventional port for the given scheme (e.g. 80 for http).
    fn resolve(&self, name: Name) -> Resolving;
}

/// A name that must be resolved to addresses.
#[derive(Debug)]
pub struct Name(pub(super) HyperName);

/// A more general trait implemented for types implementing `Resolve`.
///
/// Unnameable, only exported to aid seeing what implements this.
pub trait IntoResolve {
    #[doc(hidden)]
    fn into_resolve(self) -> Arc<dyn Resolve>;
}

impl Name {
    /// View the name as a string.
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl FromStr for Name {
    type Err = sealed::InvalidNameError;

    fn from_str(host: &str) -> Result<Self, Self::Err> {
        HyperName::from_str(host)
            .map(Name)
            .map_err(|_| sealed::InvalidNameError { _ext: () })
    }
}

/// Answers from a fixed table first, and asks another resolver for
/// everything else.
///
/// ```
/// use std::collections::HashMap;
/// use std::net::SocketAddr;
/// use reqbuild::dns::{GaiResolver, OverridesResolver};
///
/// let mut table = HashMap::new();
/// table.insert("api.test".to_owned(), vec![SocketAddr::from(([127, 0, 0, 1], 8080))]);
/// let resolver = OverridesResolver::new(GaiResolver::new(), table);
/// # drop(resolver);
/// ```
pub struct OverridesResolver {
    dns_resolver: Arc<dyn Resolve>,
    overrides: Arc<HashMap<String, Vec<SocketAddr>>>,
}

impl OverridesResolver {
    /// Wrap `dns_resolver` with a table of fixed answers.
    pub fn new<R: IntoResolve>(
        dns_resolver: R,
        overrides: HashMap<String, Vec<SocketAddr>>,
    ) -> Self {
        OverridesResolver {
            dns_resolver: dns_resolver.into_resolve(),
            overrides: Arc::new(overrides),
        }
    }
}

impl Resolve for OverridesResolver {
    fn resolve(&self, name: Name) -> Resolving {
        match self.overrides.get(name.as_str()) {
            Some(dest) => {
                let addrs: Addrs = Box::new(dest.clone().into_iter());
                Box::pin(std::future::ready(Ok(addrs)))
            }
            None => self.dns_resolver.resolve(name),
        }
    }
}

impl fmt::Debug for OverridesResolver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OverridesResolver")
            .field("overrides", &self.overrides)
            .finish()
    }
}

impl IntoResolve for Arc<dyn Resolve> {
    fn into_resolve(self) -> Arc<dyn Resolve> {
        self
    }
}

impl<R> IntoResolve for Arc<R>
where
    R: Resolve + 'static,
{
    fn into_resolve(self) -> Arc<dyn Resolve> {
        self
    }
}

impl<R> IntoResolve for R
where
    R: Resolve + 'static,
{
    fn into_resolve(self) -> Arc<dyn Resolve> {
        Arc::new(self)
    }
}

mod sealed {
    use std::fmt;

    #[derive(Debug)]
    pub struct InvalidNameError {
        pub(super) _ext: (),
    }

    impl fmt::Display for InvalidNameError {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str("invalid DNS name")
        }
    }

    impl std::error::Error for InvalidNameError {}
}
