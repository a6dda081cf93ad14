mod support;
use support::*;

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use reqbuild::{Method, Request, RequestBuilder, SignatureCalculator};

struct HeaderSigner {
    calls: Arc<AtomicUsize>,
}

impl SignatureCalculator for HeaderSigner {
    fn calculate_and_add_signature(&self, unsigned: &Request, builder: &mut RequestBuilder) {
        self.calls.fetch_add(1, Ordering::SeqCst);
        assert!(!unsigned.headers().contains_key("x-sig"));

        let signature = format!("{}:{}", unsigned.method(), unsigned.url());
        builder.set_header("X-Sig", signature);
    }
}

#[test]
fn signature_sees_unsigned_request() {
    let calls = Arc::new(AtomicUsize::new(0));
    let request = builder(Method::GET, "http://api.example/items")
        .add_query_param("page", Some("2"))
        .set_signature_calculator(HeaderSigner {
            calls: calls.clone(),
        })
        .build()
        .unwrap();

    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert_eq!(
        request.headers().first_value("x-sig").unwrap(),
        "GET:http://api.example/items?page=2"
    );
}

#[test]
fn signature_params_are_merged_after_staged_ones() {
    let request = builder(Method::GET, "http://api.example/items?z=9")
        .add_query_param("a", Some("1"))
        .set_signature_calculator(|unsigned: &Request, builder: &mut RequestBuilder| {
            let digest = unsigned.query_params().len().to_string();
            builder.add_query_param("sig", Some(digest));
        })
        .build()
        .unwrap();

    assert_eq!(request.url().query(), Some("z=9&a=1&sig=2"));
}

#[test]
fn signature_uses_the_builders_encoding() {
    let mut builder = RequestBuilder::disable_url_encoding(Method::GET);
    builder
        .set_url("http://api.example/")
        .add_query_param("raw", Some("%41"))
        .set_signature_calculator(|unsigned: &Request, builder: &mut RequestBuilder| {
            builder.set_header("X-Signed-Query", unsigned.url().query().unwrap_or(""));
        });

    let request = builder.build().unwrap();
    assert_eq!(
        request.headers().first_value("x-signed-query").unwrap(),
        "raw=%41"
    );
}

#[test]
fn signature_is_skipped_when_unsigned_build_fails() {
    let calls = Arc::new(AtomicUsize::new(0));
    let err = builder(Method::GET, "gopher://old.example/")
        .set_signature_calculator(HeaderSigner {
            calls: calls.clone(),
        })
        .build()
        .unwrap_err();

    assert!(err.is_scheme());
    assert_eq!(calls.load(Ordering::SeqCst), 0);
}
