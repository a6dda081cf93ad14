#![deny(missing_docs)]
#![cfg_attr(docsrs, feature(doc_cfg))]

//! # reqbuild
//!
//! The `reqbuild` crate describes HTTP requests before anything is sent.
//!
//! A [`RequestBuilder`] collects a method, a URL, headers, cookies and a
//! body, then [`build`](RequestBuilder::build)s an immutable [`Request`]
//! that a transport can execute. The builder also carries the per-request
//! options a transport needs:
//!
//! - Query params merged into the URL with a pluggable [`UriEncoder`]
//! - Plain bodies, streams, urlencoded forms, multipart
//! - Proxy, authentication realm, redirect and timeout overrides
//! - Request signing
//! - Connection pool partitioning and DNS resolution strategies
//!
//! Nothing in this crate opens a connection.
//!
//! ## Building a request
//!
//! ```
//! use reqbuild::{Method, RequestBuilder};
//!
//! # fn run() -> Result<(), reqbuild::Error> {
//! let request = RequestBuilder::new(Method::GET)
//!     .set_url("https://www.rust-lang.org/search?q=crates")
//!     .add_query_param("page", Some("2"))
//!     .add_header("Accept", "text/html")
//!     .build()?;
//!
//! assert_eq!(request.url().query(), Some("q=crates&page=2"));
//! # Ok(())
//! # }
//! ```
//!
//! The builder is not consumed by `build`. It can be changed and built
//! again, and [`RequestBuilder::from_prototype`] starts a new builder from
//! an existing request.
//!
//! ## Bodies
//!
//! A request carries one kind of payload at a time. Setting bytes, text, a
//! buffer or a stream replaces form params and multipart parts, and adding
//! form params or parts replaces the others in turn:
//!
//! ```
//! use reqbuild::{Method, RequestBuilder};
//!
//! # fn run() -> Result<(), reqbuild::Error> {
//! let request = RequestBuilder::new(Method::POST)
//!     .set_url("http://httpbin.org/post")
//!     .set_body_text("discarded")
//!     .add_form_param("lang", Some("rust"))
//!     .build()?;
//!
//! assert!(request.body().as_text().is_none());
//! assert_eq!(request.form_params().len(), 1);
//! # Ok(())
//! # }
//! ```
//!
//! ## Optional Features
//!
//! - **json**: Provides serialization of JSON bodies with
//!   [`RequestBuilder::json`].

pub use http::Method;
pub use url::Url;

pub use self::body::{Body, BodyGenerator, Stream};
pub use self::charset::Charset;
pub use self::cookie::{Cookie, Cookies};
pub use self::error::{Error, Result};
pub use self::header::{Headers, IntoHeaderValue};
pub use self::into_url::IntoUrl;
pub use self::multipart::Part;
pub use self::param::Param;
pub use self::pool::{ConnectionPoolPartitioning, PartitionKey, PerHostPartitioning};
pub use self::proxy::{ProxyScheme, ProxyServer};
pub use self::realm::{AuthScheme, Realm};
pub use self::request::{Request, RequestBuilder};
pub use self::signature::SignatureCalculator;
pub use self::uri::{UriEncoder, UriEncoding};

mod body;
mod charset;
mod cookie;
pub mod dns;
mod error;
pub mod header;
mod into_url;
pub mod multipart;
mod param;
pub mod pool;
mod proxy;
mod realm;
mod request;
pub mod signature;
pub mod uri;
mod util;
