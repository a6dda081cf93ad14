//! DNS resolution
//!
//! A request only records *which* resolver the transport should use; nothing
//! is resolved while building. The default is [`GaiResolver`].

pub use gai::GaiResolver;
pub use resolve::{Addrs, IntoResolve, Name, OverridesResolver, Resolve, Resolving};

mod gai;
mod resolve;
