//! Request signing
//!
//! A [`SignatureCalculator`] sees the request as it would be sent without a
//! signature, and then adds whatever the signature needs (a header, extra
//! query params) to the builder before the URL and body metadata are
//! finalized.
//!
//! ```
//! use reqbuild::{Request, RequestBuilder};
//!
//! # fn run() -> Result<(), reqbuild::Error> {
//! let sign = |unsigned: &Request, builder: &mut RequestBuilder| {
//!     let digest = unsigned.url().as_str().len().to_string();
//!     builder.add_query_param("sig", Some(digest));
//! };
//!
//! let request = RequestBuilder::default()
//!     .set_url("https://api.example/items?page=2")
//!     .set_signature_calculator(sign)
//!     .build()?;
//! assert_eq!(request.url().query(), Some("page=2&sig=32"));
//! # Ok(())
//! # }
//! ```

use crate::request::{Request, RequestBuilder};

/// Computes a signature and adds it to the request being built.
pub trait SignatureCalculator: Send + Sync {
    /// Inspect `unsigned` and mutate `builder` to carry the signature.
    fn calculate_and_add_signature(&self, unsigned: &Request, builder: &mut RequestBuilder);
}

impl<F> SignatureCalculator for F
where
    F: Fn(&Request, &mut RequestBuilder) + Send + Sync,
{
    fn calculate_and_add_signature(&self, unsigned: &Request, builder: &mut RequestBuilder) {
        (self)(unsigned, builder)
    }
}
