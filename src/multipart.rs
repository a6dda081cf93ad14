//! multipart/form-data
//!
//! Parts are collected by the builder and encoded by the transport; this
//! module only describes them.
//!
//! ```
//! use reqbuild::multipart::Part;
//! use reqbuild::RequestBuilder;
//!
//! # fn run() -> Result<(), reqbuild::Error> {
//! let avatar = Part::bytes("avatar", vec![0x89, 0x50, 0x4e, 0x47])
//!     .with_file_name("me.png")
//!     .mime_str("image/png")?;
//!
//! let request = RequestBuilder::new(reqbuild::Method::POST)
//!     .set_url("https://example.com/profile")
//!     .add_body_part(Part::text("name", "ferris"))
//!     .add_body_part(avatar)
//!     .build()?;
//! assert_eq!(request.body().parts().len(), 2);
//! # Ok(())
//! # }
//! ```

use std::borrow::Cow;
use std::fmt;
use std::path::{Path, PathBuf};

use bytes::Bytes;
use mime::Mime;

use crate::Charset;

/// A field in a multipart form.
#[derive(Clone)]
pub struct Part {
    name: Cow<'static, str>,
    value: Value,
    mime: Option<Mime>,
    charset: Option<Charset>,
    file_name: Option<Cow<'static, str>>,
    content_id: Option<String>,
}

/// What a part carries.
#[derive(Clone)]
pub enum Value {
    /// Text content.
    Text(Cow<'static, str>),
    /// Raw bytes.
    Bytes(Bytes),
    /// Content read from a file by the transport.
    File(PathBuf),
}

impl Part {
    fn new(name: Cow<'static, str>, value: Value) -> Part {
        Part {
            name,
            value,
            mime: None,
            charset: None,
            file_name: None,
            content_id: None,
        }
    }

    /// Makes a text parameter.
    pub fn text<N, T>(name: N, value: T) -> Part
    where
        N: Into<Cow<'static, str>>,
        T: Into<Cow<'static, str>>,
    {
        Part::new(name.into(), Value::Text(value.into()))
    }

    /// Makes a new parameter from arbitrary bytes.
    pub fn bytes<N, T>(name: N, value: T) -> Part
    where
        N: Into<Cow<'static, str>>,
        T: Into<Bytes>,
    {
        Part::new(name.into(), Value::Bytes(value.into()))
    }

    /// Makes a parameter whose content is read from `path` when the request
    /// is written. The file name defaults to the last path component.
    pub fn file<N, P>(name: N, path: P) -> Part
    where
        N: Into<Cow<'static, str>>,
        P: AsRef<Path>,
    {
        let path = path.as_ref().to_path_buf();
        let file_name = path
            .file_name()
            .map(|name| Cow::Owned(name.to_string_lossy().into_owned()));
        let mut part = Part::new(name.into(), Value::File(path));
        part.file_name = file_name;
        part
    }

    /// Tries to set the mime of this part.
    pub fn mime_str(mut self, mime: &str) -> crate::Result<Part> {
        self.mime = Some(mime.parse().map_err(crate::error::builder)?);
        Ok(self)
    }

    /// Set the charset used for text content.
    pub fn with_charset<C: Into<Charset>>(mut self, charset: C) -> Part {
        self.charset = Some(charset.into());
        self
    }

    /// Set the filename, separate from the actual file path.
    pub fn with_file_name<T: Into<Cow<'static, str>>>(mut self, filename: T) -> Part {
        self.file_name = Some(filename.into());
        self
    }

    /// Set the `Content-ID` of this part.
    pub fn with_content_id<T: Into<String>>(mut self, id: T) -> Part {
        self.content_id = Some(id.into());
        self
    }

    /// The form field name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The content.
    pub fn value(&self) -> &Value {
        &self.value
    }

    /// The mime type, if set.
    pub fn mime(&self) -> Option<&Mime> {
        self.mime.as_ref()
    }

    /// The charset, if set.
    pub fn charset(&self) -> Option<Charset> {
        self.charset
    }

    /// The file name sent in `Content-Disposition`, if any.
    pub fn file_name(&self) -> Option<&str> {
        self.file_name.as_deref()
    }

    /// The `Content-ID`, if set.
    pub fn content_id(&self) -> Option<&str> {
        self.content_id.as_deref()
    }
}

impl fmt::Debug for Part {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let mut dbg = f.debug_struct("Part");
        dbg.field("name", &self.name);
        match self.value {
            Value::Text(ref t) => dbg.field("text", &t.len()),
            Value::Bytes(ref b) => dbg.field("bytes", &b.len()),
            Value::File(ref p) => dbg.field("file", p),
        };
        dbg.field("mime", &self.mime)
            .field("file_name", &self.file_name)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_part_defaults_file_name() {
        let part = Part::file("upload", "/tmp/reports/q3.csv");
        assert_eq!(part.file_name(), Some("q3.csv"));
        match part.value() {
            Value::File(path) => assert_eq!(path, Path::new("/tmp/reports/q3.csv")),
            _ => panic!("expected a file part"),
        }
    }

    #[test]
    fn mime_str_rejects_garbage() {
        let err = Part::text("a", "b").mime_str("not a mime").unwrap_err();
        assert!(err.is_builder());
    }

    #[test]
    fn builders_chain() {
        let part = Part::text("field", "value")
            .with_charset(Charset::ISO_8859_1)
            .with_content_id("<abc@example>")
            .mime_str("text/plain")
            .unwrap();
        assert_eq!(part.name(), "field");
        assert_eq!(part.mime().map(|m| m.essence_str()), Some("text/plain"));
        assert_eq!(part.charset().map(|c| c.name()), Some("ISO-8859-1"));
        assert_eq!(part.content_id(), Some("<abc@example>"));
        assert_eq!(part.file_name(), None);
    }
}
