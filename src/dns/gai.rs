use futures_util::future::FutureExt;
use hyper_util::client::legacy::connect::dns::GaiResolver as HyperGaiResolver;
use log::trace;
use tower_service::Service;

use crate::dns::{Addrs, Name, Resolve, Resolving};
use crate::error::BoxError;

/// The default name resolver of every [`Request`](crate::Request).
///
/// Names are looked up with the system's `getaddrinfo`, run on Tokio's
/// blocking pool, so resolving needs a Tokio runtime. Replace it per request
/// with [`RequestBuilder::set_name_resolver`](crate::RequestBuilder::set_name_resolver),
/// or wrap it in an [`OverridesResolver`](crate::dns::OverridesResolver) to
/// pin some hosts.
///
/// ```
/// # async fn run() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
/// use std::str::FromStr;
/// use reqbuild::dns::Name;
///
/// let request = reqbuild::RequestBuilder::default().build()?;
/// let name = Name::from_str(request.url().host_str().unwrap_or("localhost"))?;
/// for addr in request.name_resolver().resolve(name).await? {
///     assert!(addr.ip().is_loopback());
/// }
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct GaiResolver(HyperGaiResolver);

impl GaiResolver {
    /// Construct a new [`GaiResolver`].
    pub fn new() -> Self {
        Self(HyperGaiResolver::new())
    }
}

impl Default for GaiResolver {
    fn default() -> Self {
        GaiResolver::new()
    }
}

impl Resolve for GaiResolver {
    fn resolve(&self, name: Name) -> Resolving {
        trace!("getaddrinfo lookup for {:?}", name.as_str());
        let mut this = self.0.clone();
        Box::pin(this.call(name.0).map(|result| {
            result
                .map(|addrs| -> Addrs { Box::new(addrs) })
                .map_err(|err| -> BoxError { Box::new(err) })
        }))
    }
}
