#![allow(dead_code)]

use std::io::Read;

use reqbuild::{Body, Method, RequestBuilder};

pub fn builder(method: Method, url: &str) -> RequestBuilder {
    let _ = env_logger::try_init();

    let mut builder = RequestBuilder::new(method);
    builder.set_url(url);
    builder
}

/// Everything the body would write, for the kinds that are plain data.
pub fn body_text(body: &Body) -> String {
    match body {
        Body::Bytes(bytes) | Body::Buffer(bytes) => String::from_utf8_lossy(bytes).into_owned(),
        Body::Composite(chunks) => chunks
            .iter()
            .map(|chunk| String::from_utf8_lossy(chunk).into_owned())
            .collect(),
        Body::Text(text) => text.clone(),
        Body::Stream(stream) => {
            let mut s = String::new();
            stream
                .clone()
                .read_to_string(&mut s)
                .expect("stream body readable");
            s
        }
        other => panic!("not a data body: {:?}", other),
    }
}
