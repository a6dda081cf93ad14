//! Authentication realms
//!
//! A [`Realm`] records who to authenticate as and how. The challenge and
//! response exchange itself belongs to the transport.

use std::fmt;

use encoding_rs::UTF_8;

use crate::header::HeaderValue;
use crate::Charset;

/// Authentication schemes a realm can request.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AuthScheme {
    /// RFC 7617 basic authentication.
    Basic,
    /// RFC 7616 digest authentication.
    Digest,
    /// NTLM.
    Ntlm,
    /// SPNEGO (negotiate).
    Spnego,
    /// Kerberos.
    Kerberos,
}

/// Credentials and options for authenticating a request.
#[derive(Clone)]
pub struct Realm {
    scheme: AuthScheme,
    principal: String,
    password: String,
    realm_name: Option<String>,
    charset: Charset,
    use_preemptive_auth: bool,
    nt_lm_domain: Option<String>,
    nt_lm_host: Option<String>,
}

impl Realm {
    /// Create a realm for `scheme` with the given credentials.
    pub fn new<P, W>(scheme: AuthScheme, principal: P, password: W) -> Realm
    where
        P: Into<String>,
        W: Into<String>,
    {
        Realm {
            scheme,
            principal: principal.into(),
            password: password.into(),
            realm_name: None,
            charset: Charset::from(UTF_8),
            use_preemptive_auth: false,
            nt_lm_domain: None,
            nt_lm_host: None,
        }
    }

    /// A basic realm, which authenticates preemptively.
    pub fn basic<P, W>(principal: P, password: W) -> Realm
    where
        P: Into<String>,
        W: Into<String>,
    {
        Realm::new(AuthScheme::Basic, principal, password).use_preemptive_auth(true)
    }

    /// A digest realm.
    pub fn digest<P, W>(principal: P, password: W) -> Realm
    where
        P: Into<String>,
        W: Into<String>,
    {
        Realm::new(AuthScheme::Digest, principal, password)
    }

    /// An NTLM realm.
    pub fn ntlm<P, W>(principal: P, password: W) -> Realm
    where
        P: Into<String>,
        W: Into<String>,
    {
        Realm::new(AuthScheme::Ntlm, principal, password)
    }

    /// Set the protection space name announced by the server.
    pub fn with_realm_name<T: Into<String>>(mut self, name: T) -> Realm {
        self.realm_name = Some(name.into());
        self
    }

    /// Set the charset credentials are encoded with. Defaults to UTF-8.
    pub fn with_charset<C: Into<Charset>>(mut self, charset: C) -> Realm {
        self.charset = charset.into();
        self
    }

    /// Send credentials without waiting for a challenge.
    pub fn use_preemptive_auth(mut self, enabled: bool) -> Realm {
        self.use_preemptive_auth = enabled;
        self
    }

    /// Set the NTLM domain and host.
    pub fn nt_lm<D, H>(mut self, domain: D, host: H) -> Realm
    where
        D: Into<String>,
        H: Into<String>,
    {
        self.nt_lm_domain = Some(domain.into());
        self.nt_lm_host = Some(host.into());
        self
    }

    /// The scheme.
    pub fn scheme(&self) -> AuthScheme {
        self.scheme
    }

    /// The user to authenticate as.
    pub fn principal(&self) -> &str {
        &self.principal
    }

    /// The password.
    pub fn password(&self) -> &str {
        &self.password
    }

    /// The protection space name, if known.
    pub fn realm_name(&self) -> Option<&str> {
        self.realm_name.as_deref()
    }

    /// The credential charset.
    pub fn charset(&self) -> Charset {
        self.charset
    }

    /// Whether credentials are sent without waiting for a challenge.
    pub fn is_preemptive(&self) -> bool {
        self.use_preemptive_auth
    }

    /// The NTLM domain, if set.
    pub fn nt_lm_domain(&self) -> Option<&str> {
        self.nt_lm_domain.as_deref()
    }

    /// The NTLM host, if set.
    pub fn nt_lm_host(&self) -> Option<&str> {
        self.nt_lm_host.as_deref()
    }

    /// The `Authorization` value for basic authentication, encoded with this
    /// realm's charset. `None` for any other scheme.
    pub fn basic_header(&self) -> Option<HeaderValue> {
        if self.scheme != AuthScheme::Basic {
            return None;
        }
        Some(crate::util::basic_auth_with_charset(
            &self.principal,
            Some(&self.password),
            self.charset,
        ))
    }
}

impl fmt::Debug for Realm {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("Realm")
            .field("scheme", &self.scheme)
            .field("principal", &self.principal)
            .field("realm_name", &self.realm_name)
            .field("preemptive", &self.use_preemptive_auth)
            .finish()
    }
}
