use std::fmt;
use std::io::Read;
use std::net::IpAddr;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use http::Request as HttpRequest;
use log::{debug, trace, warn};
use once_cell::sync::OnceCell;
use serde::Serialize;

use crate::body::{Body, BodyGenerator, Stream};
use crate::charset::Charset;
use crate::cookie::{Cookie, Cookies};
use crate::dns::{GaiResolver, IntoResolve, Resolve};
use crate::header::{HeaderMap, HeaderValue, Headers, IntoHeaderValue, AUTHORIZATION, CONTENT_TYPE};
use crate::into_url::IntoUrl;
use crate::multipart::Part;
use crate::param::{self, Param};
use crate::pool::{ConnectionPoolPartitioning, PartitionKey, PerHostPartitioning};
use crate::proxy::ProxyServer;
use crate::realm::Realm;
use crate::signature::SignatureCalculator;
use crate::uri::{self, UriEncoder, UriEncoding, DEFAULT_URL};
use crate::{util, Method, Url};

/// A finished request description.
///
/// A `Request` is produced by [`RequestBuilder::build`] and never changes
/// afterwards. It is meant to be handed to a transport, which reads the
/// accessors below to decide what to send and how.
#[derive(Clone)]
pub struct Request {
    url: Url,
    inner: Inner,
    query_params: OnceCell<Vec<Param>>,
}

/// A builder to construct the properties of a `Request`.
///
/// Every setter takes `&mut self` and returns it, so calls chain. Setters
/// that receive bad input (an invalid URL or header) remember the error, and
/// [`build`](RequestBuilder::build) keeps returning it until the same setter
/// succeeds.
///
/// ```
/// use reqbuild::{Method, RequestBuilder};
///
/// # fn run() -> Result<(), reqbuild::Error> {
/// let request = RequestBuilder::new(Method::POST)
///     .set_url("http://example.com/upload")
///     .add_header("X-Trace", "abc")
///     .set_body_text("hello")
///     .build()?;
///
/// assert_eq!(request.body().as_text(), Some("hello"));
/// assert_eq!(request.headers().first_value("x-trace").unwrap(), "abc");
/// # Ok(())
/// # }
/// ```
pub struct RequestBuilder {
    url: Option<Url>,
    inner: Inner,
    query_params: Option<Vec<Param>>,
    uri_encoder: Arc<dyn UriEncoder>,
    signature_calculator: Option<Arc<dyn SignatureCalculator>>,
    errors: Vec<(Setter, crate::Error)>,
}

// The setter an error was recorded by.
#[derive(Clone, Debug, PartialEq, Eq)]
enum Setter {
    Url,
    Header(String),
    Query,
    Body,
}

impl Setter {
    fn header(name: &str) -> Setter {
        Setter::Header(name.to_ascii_lowercase())
    }
}

// Everything a builder and a request share. Cloning copies the collections
// and shares the payloads.
#[derive(Clone)]
struct Inner {
    method: Method,
    address: Option<IpAddr>,
    local_address: Option<IpAddr>,
    headers: Headers,
    cookies: Cookies,
    body: Body,
    body_generator: Option<Arc<dyn BodyGenerator>>,
    file: Option<PathBuf>,
    virtual_host: Option<String>,
    content_length: Option<u64>,
    proxy_server: Option<ProxyServer>,
    realm: Option<Realm>,
    follow_redirect: Option<bool>,
    request_timeout: Option<Duration>,
    range_offset: u64,
    body_charset: Option<Charset>,
    connection_pool_partitioning: Arc<dyn ConnectionPoolPartitioning>,
    name_resolver: Arc<dyn Resolve>,
}

impl Inner {
    fn new(method: Method) -> Inner {
        Inner {
            method,
            address: None,
            local_address: None,
            headers: Headers::new(),
            cookies: Cookies::new(),
            body: Body::None,
            body_generator: None,
            file: None,
            virtual_host: None,
            content_length: None,
            proxy_server: None,
            realm: None,
            follow_redirect: None,
            request_timeout: None,
            range_offset: 0,
            body_charset: None,
            connection_pool_partitioning: Arc::new(PerHostPartitioning),
            name_resolver: Arc::new(GaiResolver::new()),
        }
    }
}

impl Request {
    /// Constructs a new request with no headers and no body.
    #[inline]
    pub fn new(method: Method, url: Url) -> Self {
        Request {
            url,
            inner: Inner::new(method),
            query_params: OnceCell::new(),
        }
    }

    /// Get the method.
    #[inline]
    pub fn method(&self) -> &Method {
        &self.inner.method
    }

    /// Get the url, with all query params merged in.
    #[inline]
    pub fn url(&self) -> &Url {
        &self.url
    }

    /// The address to connect to, bypassing name resolution.
    #[inline]
    pub fn inet_address(&self) -> Option<IpAddr> {
        self.inner.address
    }

    /// The local address to bind the connection to.
    #[inline]
    pub fn local_address(&self) -> Option<IpAddr> {
        self.inner.local_address
    }

    /// Get the headers.
    #[inline]
    pub fn headers(&self) -> &Headers {
        &self.inner.headers
    }

    /// Get the cookies.
    #[inline]
    pub fn cookies(&self) -> &Cookies {
        &self.inner.cookies
    }

    /// Get the body.
    #[inline]
    pub fn body(&self) -> &Body {
        &self.inner.body
    }

    /// The body generator, if one was set.
    #[inline]
    pub fn body_generator(&self) -> Option<&Arc<dyn BodyGenerator>> {
        self.inner.body_generator.as_ref()
    }

    /// The file to upload, if one was set.
    #[inline]
    pub fn file(&self) -> Option<&Path> {
        self.inner.file.as_deref()
    }

    /// The form params, empty unless the body is a form.
    #[inline]
    pub fn form_params(&self) -> &[Param] {
        self.inner.body.form_params()
    }

    /// The multipart parts, empty unless the body is multipart.
    #[inline]
    pub fn parts(&self) -> &[Part] {
        self.inner.body.parts()
    }

    /// The `Host` to send instead of the one in the URL.
    #[inline]
    pub fn virtual_host(&self) -> Option<&str> {
        self.inner.virtual_host.as_deref()
    }

    /// The body length, or `None` when it isn't known.
    #[inline]
    pub fn content_length(&self) -> Option<u64> {
        self.inner.content_length
    }

    /// Get the proxy.
    #[inline]
    pub fn proxy_server(&self) -> Option<&ProxyServer> {
        self.inner.proxy_server.as_ref()
    }

    /// Get the authentication realm.
    #[inline]
    pub fn realm(&self) -> Option<&Realm> {
        self.inner.realm.as_ref()
    }

    /// Whether redirects should be followed. `None` defers to the client.
    #[inline]
    pub fn follow_redirect(&self) -> Option<bool> {
        self.inner.follow_redirect
    }

    /// Get the timeout. `None` defers to the client.
    #[inline]
    pub fn request_timeout(&self) -> Option<Duration> {
        self.inner.request_timeout
    }

    /// The byte offset to resume a download from.
    #[inline]
    pub fn range_offset(&self) -> u64 {
        self.inner.range_offset
    }

    /// The charset used to encode text and form bodies.
    #[inline]
    pub fn body_charset(&self) -> Option<Charset> {
        self.inner.body_charset
    }

    /// Get the connection pool partitioning.
    #[inline]
    pub fn connection_pool_partitioning(&self) -> &Arc<dyn ConnectionPoolPartitioning> {
        &self.inner.connection_pool_partitioning
    }

    /// The pool partition this request's connection belongs to.
    pub fn partition_key(&self) -> PartitionKey {
        self.inner
            .connection_pool_partitioning
            .partition_key(&self.url, self.inner.proxy_server.as_ref())
    }

    /// Get the name resolver.
    #[inline]
    pub fn name_resolver(&self) -> &Arc<dyn Resolve> {
        &self.inner.name_resolver
    }

    /// The params of the final URL's query string.
    ///
    /// Parsed from the URL the first time this is called. Values are left
    /// percent-encoded.
    pub fn query_params(&self) -> &[Param] {
        self.query_params
            .get_or_init(|| self.url.query().map(param::parse_query).unwrap_or_default())
    }
}

impl RequestBuilder {
    /// A builder for `method` that percent-encodes staged query params.
    pub fn new(method: Method) -> RequestBuilder {
        RequestBuilder::with_encoder(method, UriEncoding::Fixing)
    }

    /// A builder for `method` that appends staged query params as given.
    pub fn disable_url_encoding(method: Method) -> RequestBuilder {
        RequestBuilder::with_encoder(method, UriEncoding::Raw)
    }

    /// A builder for `method` that merges query params with `encoder`.
    pub fn with_encoder<E>(method: Method, encoder: E) -> RequestBuilder
    where
        E: UriEncoder + 'static,
    {
        RequestBuilder::from_parts(None, Inner::new(method), Arc::new(encoder))
    }

    /// A builder starting from every property of `prototype`.
    ///
    /// Headers, cookies, form params and parts are copied, so changing the
    /// builder never touches the prototype. Body payloads are shared.
    pub fn from_prototype(prototype: &Request) -> RequestBuilder {
        RequestBuilder::from_prototype_with_encoder(prototype, UriEncoding::Fixing)
    }

    /// Like [`from_prototype`](RequestBuilder::from_prototype), with a
    /// custom encoder.
    pub fn from_prototype_with_encoder<E>(prototype: &Request, encoder: E) -> RequestBuilder
    where
        E: UriEncoder + 'static,
    {
        RequestBuilder::from_parts(
            Some(prototype.url.clone()),
            prototype.inner.clone(),
            Arc::new(encoder),
        )
    }

    fn from_parts(url: Option<Url>, inner: Inner, uri_encoder: Arc<dyn UriEncoder>) -> RequestBuilder {
        RequestBuilder {
            url,
            inner,
            query_params: None,
            uri_encoder,
            signature_calculator: None,
            errors: Vec::new(),
        }
    }

    // A success clears what `setter` recorded before.
    fn record(&mut self, setter: Setter, result: crate::Result<()>) {
        self.errors.retain(|(recorded, _)| *recorded != setter);
        if let Err(err) = result {
            self.errors.push((setter, err));
        }
    }

    // For appending setters: a success leaves an earlier failure in place.
    fn record_err(&mut self, setter: Setter, result: crate::Result<()>) {
        if let Err(err) = result {
            if !self.errors.iter().any(|(recorded, _)| *recorded == setter) {
                self.errors.push((setter, err));
            }
        }
    }

    fn clear_errors(&mut self, matches: impl Fn(&Setter) -> bool) {
        self.errors.retain(|(recorded, _)| !matches(recorded));
    }

    fn first_error(&self) -> Option<crate::Error> {
        self.errors.first().map(|(_, err)| err.clone())
    }

    /// Set the target URL.
    ///
    /// Parse errors are reported by `build` until a valid URL is set. The
    /// scheme is checked there too.
    pub fn set_url<U: IntoUrl>(&mut self, url: U) -> &mut RequestBuilder {
        let result = match url.into_url() {
            Ok(url) => {
                self.url = Some(url);
                Ok(())
            }
            Err(err) => Err(err),
        };
        self.record(Setter::Url, result);
        self
    }

    /// Set the target URL from an already parsed value.
    pub fn set_uri(&mut self, url: Url) -> &mut RequestBuilder {
        self.url = Some(url);
        self.record(Setter::Url, Ok(()));
        self
    }

    /// Connect to `address` instead of resolving the URL's host.
    pub fn set_inet_address<A: Into<Option<IpAddr>>>(&mut self, address: A) -> &mut RequestBuilder {
        self.inner.address = address.into();
        self
    }

    /// Bind the connection to a local address.
    pub fn set_local_inet_address<A: Into<Option<IpAddr>>>(
        &mut self,
        address: A,
    ) -> &mut RequestBuilder {
        self.inner.local_address = address.into();
        self
    }

    /// Send `host` as the `Host` instead of the URL's host.
    pub fn set_virtual_host<H: Into<String>>(&mut self, host: H) -> &mut RequestBuilder {
        self.inner.virtual_host = Some(host.into());
        self
    }

    /// Replace all values of a header with one value.
    ///
    /// Passing `None` removes the header.
    pub fn set_header<K, V>(&mut self, name: K, value: V) -> &mut RequestBuilder
    where
        K: AsRef<str>,
        V: IntoHeaderValue,
    {
        let result = match value.into_header_value() {
            Ok(Some(value)) => self.inner.headers.insert_value(name.as_ref(), value, true),
            Ok(None) => {
                self.inner.headers.remove(name.as_ref());
                Ok(())
            }
            Err(err) => Err(crate::error::builder(err)),
        };
        self.record(Setter::header(name.as_ref()), result);
        self
    }

    /// Append a value to a header.
    ///
    /// Passing `None` appends an empty value.
    pub fn add_header<K, V>(&mut self, name: K, value: V) -> &mut RequestBuilder
    where
        K: AsRef<str>,
        V: IntoHeaderValue,
    {
        let result = match value.into_header_value() {
            Ok(Some(value)) => self.inner.headers.insert_value(name.as_ref(), value, false),
            Ok(None) => {
                warn!("value for header {:?} was None, set to \"\"", name.as_ref());
                self.inner
                    .headers
                    .insert_value(name.as_ref(), HeaderValue::from_static(""), false)
            }
            Err(err) => Err(crate::error::builder(err)),
        };
        self.record_err(Setter::header(name.as_ref()), result);
        self
    }

    /// Replace every header. `None` clears them.
    ///
    /// Errors recorded by earlier header setters are dropped.
    pub fn set_headers<H: Into<Option<Headers>>>(&mut self, headers: H) -> &mut RequestBuilder {
        self.inner.headers = headers.into().unwrap_or_default();
        self.clear_errors(|setter| matches!(setter, Setter::Header(_)));
        self
    }

    /// Replace every header with the contents of an `http::HeaderMap`.
    pub fn set_headers_map(&mut self, headers: HeaderMap) -> &mut RequestBuilder {
        self.inner.headers = Headers::from(headers);
        self.clear_errors(|setter| matches!(setter, Setter::Header(_)));
        self
    }

    /// Declare the body length.
    ///
    /// When unset, `build` falls back to the `Content-Length` header.
    pub fn set_content_length(&mut self, length: u32) -> &mut RequestBuilder {
        self.inner.content_length = Some(u64::from(length));
        self
    }

    /// Replace every cookie.
    pub fn set_cookies<I>(&mut self, cookies: I) -> &mut RequestBuilder
    where
        I: IntoIterator<Item = Cookie>,
    {
        self.inner.cookies = cookies.into_iter().collect();
        self
    }

    /// Append a cookie, even if one with the same name exists.
    pub fn add_cookie(&mut self, cookie: Cookie) -> &mut RequestBuilder {
        self.inner.cookies.add(cookie);
        self
    }

    /// Replace the first cookie with the same name, or append.
    pub fn add_or_replace_cookie(&mut self, cookie: Cookie) -> &mut RequestBuilder {
        self.inner.cookies.add_or_replace(cookie);
        self
    }

    /// Remove every cookie.
    pub fn reset_cookies(&mut self) -> &mut RequestBuilder {
        self.inner.cookies.clear();
        self
    }

    /// Drop the staged query params and the URL's own query.
    pub fn reset_query(&mut self) -> &mut RequestBuilder {
        self.query_params = None;
        self.record(Setter::Query, Ok(()));
        if let Some(ref mut url) = self.url {
            url.set_query(None);
        }
        self
    }

    /// Drop the form params.
    pub fn reset_form_params(&mut self) -> &mut RequestBuilder {
        if let Body::Form(_) = self.inner.body {
            self.inner.body = Body::None;
        }
        self.record(Setter::Body, Ok(()));
        self
    }

    /// Drop bytes, composite, text, buffer and stream bodies, the body
    /// generator and the declared length.
    pub fn reset_non_multipart_data(&mut self) -> &mut RequestBuilder {
        if self.inner.body.is_non_multipart_data() {
            self.inner.body = Body::None;
        }
        self.inner.body_generator = None;
        self.inner.content_length = None;
        self.record(Setter::Body, Ok(()));
        self
    }

    /// Drop the multipart parts.
    pub fn reset_multipart_data(&mut self) -> &mut RequestBuilder {
        if let Body::Multipart(_) = self.inner.body {
            self.inner.body = Body::None;
        }
        self.record(Setter::Body, Ok(()));
        self
    }

    fn reset_body(&mut self) {
        self.reset_form_params();
        self.reset_non_multipart_data();
        self.reset_multipart_data();
    }

    /// Set the request body, discarding any other payload.
    pub fn set_body<T: Into<Body>>(&mut self, body: T) -> &mut RequestBuilder {
        self.reset_body();
        self.inner.body = body.into();
        self
    }

    /// Upload the file at `path`.
    ///
    /// Only the file is set. Other payloads stay as they are and it is up
    /// to the transport to decide which one wins.
    pub fn set_body_file<P: Into<PathBuf>>(&mut self, path: P) -> &mut RequestBuilder {
        self.inner.file = Some(path.into());
        self
    }

    /// Send a single chunk of bytes.
    pub fn set_body_bytes<B: Into<Bytes>>(&mut self, bytes: B) -> &mut RequestBuilder {
        self.reset_body();
        self.inner.body = Body::Bytes(bytes.into());
        self
    }

    /// Send several chunks back to back.
    pub fn set_body_composite<I, B>(&mut self, chunks: I) -> &mut RequestBuilder
    where
        I: IntoIterator<Item = B>,
        B: Into<Bytes>,
    {
        self.reset_body();
        self.inner.body = Body::Composite(chunks.into_iter().map(Into::into).collect());
        self
    }

    /// Send a string. It is encoded with the body charset.
    pub fn set_body_text<S: Into<String>>(&mut self, text: S) -> &mut RequestBuilder {
        self.reset_body();
        self.inner.body = Body::Text(text.into());
        self
    }

    /// Send a byte buffer.
    pub fn set_body_buffer<B: Into<Bytes>>(&mut self, buf: B) -> &mut RequestBuilder {
        self.reset_body();
        self.inner.body = Body::Buffer(buf.into());
        self
    }

    /// Send whatever `reader` yields.
    ///
    /// The length of a stream is never taken from the `Content-Length`
    /// header.
    pub fn set_body_stream<R>(&mut self, reader: R) -> &mut RequestBuilder
    where
        R: Read + Send + 'static,
    {
        self.reset_body();
        self.inner.body = Body::Stream(Stream::new(reader));
        self
    }

    /// Produce the body on demand with `generator`.
    ///
    /// Only the generator is set. Other payloads stay as they are and it is
    /// up to the transport to decide which one wins.
    pub fn set_body_generator<G>(&mut self, generator: G) -> &mut RequestBuilder
    where
        G: BodyGenerator + 'static,
    {
        self.inner.body_generator = Some(Arc::new(generator));
        self
    }

    /// Stage a query param, merged into the URL by `build`.
    ///
    /// A `None` value produces a bare `name` with no `=`.
    pub fn add_query_param<N, V>(&mut self, name: N, value: Option<V>) -> &mut RequestBuilder
    where
        N: Into<String>,
        V: Into<String>,
    {
        self.query_params
            .get_or_insert_with(Vec::new)
            .push(Param::from((name, value)));
        self
    }

    /// Stage several query params.
    pub fn add_query_params<I>(&mut self, params: I) -> &mut RequestBuilder
    where
        I: IntoIterator<Item = Param>,
    {
        self.query_params
            .get_or_insert_with(Vec::new)
            .extend(params);
        self
    }

    /// Replace the staged query params.
    ///
    /// The URL's own query is dropped too, so `params` becomes the whole
    /// query string. An error from an earlier [`query`](RequestBuilder::query)
    /// is dropped with it.
    pub fn set_query_params<I>(&mut self, params: I) -> &mut RequestBuilder
    where
        I: IntoIterator<Item = Param>,
    {
        if let Some(ref mut url) = self.url {
            if url.query().is_some() {
                url.set_query(None);
            }
        }
        self.query_params = Some(params.into_iter().collect());
        self.record(Setter::Query, Ok(()));
        self
    }

    /// Replace the staged query params with the entries of a map.
    ///
    /// Each value under a name becomes its own param.
    pub fn set_query_params_map<I, K, VS, V>(&mut self, map: I) -> &mut RequestBuilder
    where
        I: IntoIterator<Item = (K, VS)>,
        K: Into<String>,
        VS: IntoIterator<Item = V>,
        V: Into<String>,
    {
        self.set_query_params(param::from_map(map))
    }

    /// Stage the url encoded serialization of `query`.
    ///
    /// ```
    /// # use reqbuild::{Method, RequestBuilder};
    /// # fn run() -> Result<(), reqbuild::Error> {
    /// let request = RequestBuilder::new(Method::GET)
    ///     .set_url("http://httpbin.org/get")
    ///     .query(&[("lang", "rust")])
    ///     .build()?;
    /// assert_eq!(request.url().query(), Some("lang=rust"));
    /// # Ok(())
    /// # }
    /// ```
    ///
    /// # Errors
    /// `build` fails if the value cannot be serialized into a query string,
    /// until the staged params are reset or replaced.
    pub fn query<T: Serialize + ?Sized>(&mut self, query: &T) -> &mut RequestBuilder {
        match param::serialize(query) {
            Ok(params) => {
                self.add_query_params(params);
            }
            Err(err) => self.record_err(Setter::Query, Err(err)),
        }
        self
    }

    /// Append a form param, discarding any non-form payload.
    pub fn add_form_param<N, V>(&mut self, name: N, value: Option<V>) -> &mut RequestBuilder
    where
        N: Into<String>,
        V: Into<String>,
    {
        self.reset_non_multipart_data();
        self.reset_multipart_data();
        let param = Param::from((name, value));
        match self.inner.body {
            Body::Form(ref mut params) => params.push(param),
            _ => self.inner.body = Body::Form(vec![param]),
        }
        self
    }

    /// Replace the form params, discarding any non-form payload.
    pub fn set_form_params<I>(&mut self, params: I) -> &mut RequestBuilder
    where
        I: IntoIterator<Item = Param>,
    {
        self.reset_non_multipart_data();
        self.reset_multipart_data();
        self.inner.body = Body::Form(params.into_iter().collect());
        self
    }

    /// Replace the form params with the entries of a map.
    pub fn set_form_params_map<I, K, VS, V>(&mut self, map: I) -> &mut RequestBuilder
    where
        I: IntoIterator<Item = (K, VS)>,
        K: Into<String>,
        VS: IntoIterator<Item = V>,
        V: Into<String>,
    {
        self.set_form_params(param::from_map(map))
    }

    /// Send a form body.
    ///
    /// Sets the form params to the url encoded serialization of the passed
    /// value, and also sets the
    /// `Content-Type: application/x-www-form-urlencoded` header.
    ///
    /// # Errors
    ///
    /// `build` fails if the passed value cannot be serialized into url
    /// encoded format, until another body replaces it.
    pub fn form<T: Serialize + ?Sized>(&mut self, form: &T) -> &mut RequestBuilder {
        match param::serialize(form) {
            Ok(params) => {
                self.set_form_params(params);
                let result = self.inner.headers.insert_value(
                    CONTENT_TYPE.as_str(),
                    HeaderValue::from_static("application/x-www-form-urlencoded"),
                    true,
                );
                self.record(Setter::header(CONTENT_TYPE.as_str()), result);
            }
            Err(err) => self.record(Setter::Body, Err(err)),
        }
        self
    }

    /// Send a JSON body.
    ///
    /// Sets the body to the JSON serialization of the passed value, and
    /// also sets the `Content-Type: application/json` header.
    ///
    /// # Optional
    ///
    /// This requires the optional `json` feature enabled.
    ///
    /// # Errors
    ///
    /// Serialization can fail if `T`'s implementation of `Serialize` decides to
    /// fail, or if `T` contains a map with non-string keys.
    #[cfg(feature = "json")]
    #[cfg_attr(docsrs, doc(cfg(feature = "json")))]
    pub fn json<T: Serialize + ?Sized>(&mut self, json: &T) -> &mut RequestBuilder {
        match serde_json::to_vec(json) {
            Ok(body) => {
                self.set_body_bytes(body);
                let result = self.inner.headers.insert_value(
                    CONTENT_TYPE.as_str(),
                    HeaderValue::from_static("application/json"),
                    true,
                );
                self.record(Setter::header(CONTENT_TYPE.as_str()), result);
            }
            Err(err) => self.record(Setter::Body, Err(crate::error::builder(err))),
        }
        self
    }

    /// Append a multipart part, discarding any non-multipart payload.
    pub fn add_body_part(&mut self, part: Part) -> &mut RequestBuilder {
        self.reset_form_params();
        self.reset_non_multipart_data();
        match self.inner.body {
            Body::Multipart(ref mut parts) => parts.push(part),
            _ => self.inner.body = Body::Multipart(vec![part]),
        }
        self
    }

    /// Enable HTTP basic authentication.
    pub fn basic_auth<U, P>(&mut self, username: U, password: Option<P>) -> &mut RequestBuilder
    where
        U: fmt::Display,
        P: fmt::Display,
    {
        let header_value = util::basic_auth(username, password);
        let result = self
            .inner
            .headers
            .insert_value(AUTHORIZATION.as_str(), header_value, true);
        self.record(Setter::header(AUTHORIZATION.as_str()), result);
        self
    }

    /// Enable HTTP bearer authentication.
    pub fn bearer_auth<T: fmt::Display>(&mut self, token: T) -> &mut RequestBuilder {
        let result = match HeaderValue::try_from(format!("Bearer {}", token)) {
            Ok(mut header_value) => {
                header_value.set_sensitive(true);
                self.inner
                    .headers
                    .insert_value(AUTHORIZATION.as_str(), header_value, true)
            }
            Err(err) => Err(crate::error::builder(err)),
        };
        self.record(Setter::header(AUTHORIZATION.as_str()), result);
        self
    }

    /// Route the request through a proxy. `None` connects directly.
    pub fn set_proxy_server<P: Into<Option<ProxyServer>>>(&mut self, proxy: P) -> &mut RequestBuilder {
        self.inner.proxy_server = proxy.into();
        self
    }

    /// Authenticate with `realm`. `None` removes it.
    pub fn set_realm<R: Into<Option<Realm>>>(&mut self, realm: R) -> &mut RequestBuilder {
        self.inner.realm = realm.into();
        self
    }

    /// Override the client's redirect policy for this request.
    pub fn set_follow_redirect(&mut self, follow_redirect: bool) -> &mut RequestBuilder {
        self.inner.follow_redirect = Some(follow_redirect);
        self
    }

    /// Override the client's timeout for this request.
    pub fn set_request_timeout(&mut self, timeout: Duration) -> &mut RequestBuilder {
        self.inner.request_timeout = Some(timeout);
        self
    }

    /// Resume a download from `offset`.
    pub fn set_range_offset(&mut self, offset: u64) -> &mut RequestBuilder {
        self.inner.range_offset = offset;
        self
    }

    /// Change the method.
    pub fn set_method(&mut self, method: Method) -> &mut RequestBuilder {
        self.inner.method = method;
        self
    }

    /// Encode text and form bodies with `charset`.
    ///
    /// Without this, `build` reads the charset from `Content-Type`. Accepts
    /// a [`Charset`] or an `encoding_rs` encoding.
    pub fn set_body_charset<C: Into<Charset>>(&mut self, charset: C) -> &mut RequestBuilder {
        self.inner.body_charset = Some(charset.into());
        self
    }

    /// Group pooled connections with `partitioning`.
    pub fn set_connection_pool_partitioning<P>(&mut self, partitioning: P) -> &mut RequestBuilder
    where
        P: ConnectionPoolPartitioning + 'static,
    {
        self.inner.connection_pool_partitioning = Arc::new(partitioning);
        self
    }

    /// Resolve the target host with `resolver`.
    pub fn set_name_resolver<R: IntoResolve>(&mut self, resolver: R) -> &mut RequestBuilder {
        self.inner.name_resolver = resolver.into_resolve();
        self
    }

    /// Sign every request built from now on.
    ///
    /// The calculator is given the request as it would be built without a
    /// signature, and may then change this builder. Its changes stay on the
    /// builder, so building twice signs twice.
    pub fn set_signature_calculator<S>(&mut self, calculator: S) -> &mut RequestBuilder
    where
        S: SignatureCalculator + 'static,
    {
        self.signature_calculator = Some(Arc::new(calculator));
        self
    }

    /// Build a `Request`.
    ///
    /// The builder keeps its state and can build again.
    ///
    /// # Errors
    ///
    /// Fails if a setter received an invalid URL or header, or if the URL
    /// scheme is not `http`, `https`, `ws` or `wss`. A recorded error is
    /// returned by every build until the setter that recorded it succeeds,
    /// or the part it was setting is reset or replaced.
    pub fn build(&mut self) -> crate::Result<Request> {
        if let Some(err) = self.first_error() {
            return Err(err);
        }
        self.execute_signature_calculator()?;
        if let Some(err) = self.first_error() {
            return Err(err);
        }

        let url = self.compute_final_url()?;
        let mut inner = self.inner.clone();
        inner.body_charset = self.compute_body_charset();
        inner.content_length = self.compute_content_length();

        Ok(Request {
            url,
            inner,
            query_params: OnceCell::new(),
        })
    }

    fn execute_signature_calculator(&mut self) -> crate::Result<()> {
        let calculator = match self.signature_calculator {
            Some(ref calculator) => calculator.clone(),
            None => return Ok(()),
        };

        let mut unsigned = RequestBuilder {
            url: self.url.clone(),
            inner: self.inner.clone(),
            query_params: self.query_params.clone(),
            uri_encoder: self.uri_encoder.clone(),
            signature_calculator: None,
            errors: Vec::new(),
        };
        let unsigned = unsigned.build()?;
        trace!("signing {} {}", unsigned.method(), unsigned.url());
        calculator.calculate_and_add_signature(&unsigned, self);
        Ok(())
    }

    fn compute_final_url(&self) -> crate::Result<Url> {
        let url = match self.url {
            Some(ref url) => {
                uri::validate_supported_scheme(url)?;
                url.clone()
            }
            None => {
                debug!("no url was set, using {}", *DEFAULT_URL);
                (*DEFAULT_URL).clone()
            }
        };
        let staged = self.query_params.as_deref().unwrap_or(&[]);
        Ok(self.uri_encoder.encode(url, staged))
    }

    fn compute_body_charset(&self) -> Option<Charset> {
        if self.inner.body_charset.is_some() {
            return self.inner.body_charset;
        }
        let content_type = self
            .inner
            .headers
            .first_value(CONTENT_TYPE.as_str())?
            .to_str()
            .ok()?;
        let charset = util::parse_charset(content_type);
        if charset.is_none() {
            trace!("no charset in content-type {:?}", content_type);
        }
        charset
    }

    fn compute_content_length(&self) -> Option<u64> {
        if self.inner.content_length.is_some() || self.inner.body.is_stream() {
            return self.inner.content_length;
        }
        let value = self.inner.headers.first_value("Content-Length")?;
        let length = value.to_str().ok().and_then(|s| s.parse::<u64>().ok());
        if length.is_none() {
            trace!("ignoring unparsable content-length {:?}", value);
        }
        length
    }
}

impl Default for RequestBuilder {
    fn default() -> RequestBuilder {
        RequestBuilder::new(Method::GET)
    }
}

impl fmt::Debug for Request {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        fmt_request_fields(&mut f.debug_struct("Request"), &self.inner, &self.url).finish()
    }
}

impl fmt::Debug for RequestBuilder {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        fmt_request_fields(&mut f.debug_struct("RequestBuilder"), &self.inner, &self.url)
            .field("query_params", &self.query_params)
            .finish()
    }
}

fn fmt_request_fields<'a, 'b>(
    f: &'a mut fmt::DebugStruct<'a, 'b>,
    inner: &Inner,
    url: &dyn fmt::Debug,
) -> &'a mut fmt::DebugStruct<'a, 'b> {
    f.field("method", &inner.method)
        .field("url", url)
        .field("headers", &inner.headers)
}

/// One line, tab separated: the URL, the method, `headers:` and then each
/// header as `name:values` with repeated values joined by `", "`. Form
/// params follow `formParams:` the same way. A param without a value has
/// nothing after its colon, as it has no `=` in an urlencoded body.
impl fmt::Display for Request {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}\t{}\theaders:", self.url, self.inner.method)?;
        for (name, values) in self.inner.headers.iter() {
            let joined = values
                .iter()
                .filter_map(|value| value.to_str().ok())
                .collect::<Vec<_>>()
                .join(", ");
            write!(f, "\t{}:{}", name, joined)?;
        }

        let form_params = self.inner.body.form_params();
        if !form_params.is_empty() {
            f.write_str("\tformParams:")?;
            for param in form_params {
                write!(f, "\t{}:{}", param.name(), param.value().unwrap_or(""))?;
            }
        }
        Ok(())
    }
}

impl<T> TryFrom<HttpRequest<T>> for Request
where
    T: Into<Bytes>,
{
    type Error = crate::Error;

    fn try_from(req: HttpRequest<T>) -> crate::Result<Self> {
        let (parts, body) = req.into_parts();
        let http::request::Parts {
            method,
            uri,
            headers,
            ..
        } = parts;
        let url = Url::parse(&uri.to_string()).map_err(crate::error::builder)?;

        let mut builder = RequestBuilder::new(method);
        builder.set_uri(url).set_headers_map(headers);
        let body = body.into();
        if !body.is_empty() {
            builder.set_body_bytes(body);
        }
        builder.build()
    }
}
