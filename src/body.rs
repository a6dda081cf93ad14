use std::fmt;
use std::io::{self, Read};
use std::sync::{Arc, Mutex};

use bytes::Bytes;

use crate::multipart::Part;
use crate::param::Param;

/// The payload of a request.
///
/// Only one of these representations is active at a time. Builder setters
/// replace the whole value, which is what keeps bytes, text, form params and
/// multipart parts from ever being sent together.
///
/// A [`BodyGenerator`] and a file are tracked next to the `Body` instead of
/// inside it; see [`RequestBuilder::set_body_generator`].
///
/// [`RequestBuilder::set_body_generator`]: crate::RequestBuilder::set_body_generator
#[derive(Clone, Default)]
pub enum Body {
    /// No payload.
    #[default]
    None,
    /// A single chunk of bytes.
    Bytes(Bytes),
    /// Several chunks sent back to back.
    Composite(Vec<Bytes>),
    /// A string, encoded with the request's body charset by the transport.
    Text(String),
    /// A byte buffer.
    Buffer(Bytes),
    /// A reader of unknown length; forces chunked transfer.
    Stream(Stream),
    /// `application/x-www-form-urlencoded` params.
    Form(Vec<Param>),
    /// `multipart/form-data` parts.
    Multipart(Vec<Part>),
}

impl Body {
    /// Returns true if no payload is set.
    pub fn is_none(&self) -> bool {
        matches!(self, Body::None)
    }

    /// Returns true for the stream variant.
    pub fn is_stream(&self) -> bool {
        matches!(self, Body::Stream(_))
    }

    /// Returns the bytes, if this is a `Bytes` body.
    pub fn as_bytes(&self) -> Option<&Bytes> {
        match self {
            Body::Bytes(bytes) => Some(bytes),
            _ => None,
        }
    }

    /// Returns the chunks, if this is a `Composite` body.
    pub fn as_composite(&self) -> Option<&[Bytes]> {
        match self {
            Body::Composite(chunks) => Some(chunks),
            _ => None,
        }
    }

    /// Returns the text, if this is a `Text` body.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Body::Text(text) => Some(text),
            _ => None,
        }
    }

    /// Returns the buffer, if this is a `Buffer` body.
    pub fn as_buffer(&self) -> Option<&Bytes> {
        match self {
            Body::Buffer(buf) => Some(buf),
            _ => None,
        }
    }

    /// Returns the stream handle, if this is a `Stream` body.
    pub fn as_stream(&self) -> Option<&Stream> {
        match self {
            Body::Stream(stream) => Some(stream),
            _ => None,
        }
    }

    /// The form params, or an empty slice for any other body.
    pub fn form_params(&self) -> &[Param] {
        match self {
            Body::Form(params) => params,
            _ => &[],
        }
    }

    /// The multipart parts, or an empty slice for any other body.
    pub fn parts(&self) -> &[Part] {
        match self {
            Body::Multipart(parts) => parts,
            _ => &[],
        }
    }

    /// Returns true for the bytes, composite, text, buffer and stream
    /// variants.
    pub(crate) fn is_non_multipart_data(&self) -> bool {
        matches!(
            self,
            Body::Bytes(_) | Body::Composite(_) | Body::Text(_) | Body::Buffer(_) | Body::Stream(_)
        )
    }

    /// The length in bytes, when it is known without reading anything.
    pub fn content_length(&self) -> Option<u64> {
        match self {
            Body::None => Some(0),
            Body::Bytes(bytes) | Body::Buffer(bytes) => Some(bytes.len() as u64),
            Body::Composite(chunks) => Some(chunks.iter().map(|c| c.len() as u64).sum()),
            Body::Text(_) | Body::Stream(_) | Body::Form(_) | Body::Multipart(_) => None,
        }
    }
}

impl From<Bytes> for Body {
    #[inline]
    fn from(bytes: Bytes) -> Body {
        Body::Bytes(bytes)
    }
}

impl From<Vec<u8>> for Body {
    #[inline]
    fn from(vec: Vec<u8>) -> Body {
        Body::Bytes(vec.into())
    }
}

impl From<&'static [u8]> for Body {
    #[inline]
    fn from(s: &'static [u8]) -> Body {
        Body::Bytes(Bytes::from_static(s))
    }
}

impl From<String> for Body {
    #[inline]
    fn from(s: String) -> Body {
        Body::Text(s)
    }
}

impl From<&'static str> for Body {
    #[inline]
    fn from(s: &'static str) -> Body {
        Body::Text(s.to_owned())
    }
}

impl fmt::Debug for Body {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Body::None => f.write_str("None"),
            Body::Bytes(b) => f.debug_tuple("Bytes").field(&b.len()).finish(),
            Body::Composite(c) => f.debug_tuple("Composite").field(&c.len()).finish(),
            Body::Text(t) => f.debug_tuple("Text").field(&t.len()).finish(),
            Body::Buffer(b) => f.debug_tuple("Buffer").field(&b.len()).finish(),
            Body::Stream(_) => f.debug_tuple("Stream").field(&"_").finish(),
            Body::Form(p) => f.debug_tuple("Form").field(p).finish(),
            Body::Multipart(p) => f.debug_tuple("Multipart").field(p).finish(),
        }
    }
}

/// A shared handle to a reader.
///
/// Cloning the handle does not duplicate the reader: a builder copied from a
/// prototype reads from the same source as the prototype.
#[derive(Clone)]
pub struct Stream {
    reader: Arc<Mutex<Box<dyn Read + Send>>>,
}

impl Stream {
    /// Wrap a reader.
    pub fn new<R: Read + Send + 'static>(reader: R) -> Stream {
        Stream {
            reader: Arc::new(Mutex::new(Box::new(reader))),
        }
    }

    /// Returns true if both handles point at the same reader.
    pub fn ptr_eq(&self, other: &Stream) -> bool {
        Arc::ptr_eq(&self.reader, &other.reader)
    }
}

impl Read for Stream {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let mut reader = self
            .reader
            .lock()
            .map_err(|_| io::Error::new(io::ErrorKind::Other, "body stream lock poisoned"))?;
        reader.read(buf)
    }
}

impl fmt::Debug for Stream {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("Stream").finish()
    }
}

/// Produces a body on demand.
///
/// A generator is consulted by the transport each time the body has to be
/// written, so unlike a [`Stream`] it can be replayed.
pub trait BodyGenerator: Send + Sync {
    /// Create a fresh reader over the body.
    fn create_body(&self) -> Box<dyn Read + Send>;

    /// The length of the bodies this generator creates, if known.
    fn content_length(&self) -> Option<u64> {
        None
    }
}

impl<F, R> BodyGenerator for F
where
    F: Fn() -> R + Send + Sync,
    R: Read + Send + 'static,
{
    fn create_body(&self) -> Box<dyn Read + Send> {
        Box::new((self)())
    }
}

// useful for tests, but not publicly exposed
#[cfg(test)]
pub(crate) fn read_to_string(body: &Body) -> io::Result<String> {
    let mut s = String::new();
    match body {
        Body::Bytes(b) | Body::Buffer(b) => (&b[..]).read_to_string(&mut s)?,
        Body::Composite(chunks) => {
            for chunk in chunks {
                (&chunk[..]).read_to_string(&mut s)?;
            }
            s.len()
        }
        Body::Text(t) => {
            s.push_str(t);
            t.len()
        }
        Body::Stream(stream) => stream.clone().read_to_string(&mut s)?,
        Body::None | Body::Form(_) | Body::Multipart(_) => 0,
    };
    Ok(s)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn content_length_of_fixed_bodies() {
        assert_eq!(Body::None.content_length(), Some(0));
        assert_eq!(Body::from(vec![1u8, 2, 3]).content_length(), Some(3));
        let composite = Body::Composite(vec![Bytes::from_static(b"ab"), Bytes::from_static(b"c")]);
        assert_eq!(composite.content_length(), Some(3));
        assert_eq!(Body::Stream(Stream::new(io::empty())).content_length(), None);
    }

    #[test]
    fn stream_clones_share_the_reader() {
        let stream = Stream::new(&b"hello world"[..]);
        let mut first = stream.clone();
        let mut second = stream.clone();
        assert!(first.ptr_eq(&second));

        let mut buf = [0u8; 6];
        first.read_exact(&mut buf).unwrap();
        let mut rest = String::new();
        second.read_to_string(&mut rest).unwrap();
        assert_eq!(rest, "world");
    }

    #[test]
    fn read_composite() {
        let body = Body::Composite(vec![Bytes::from_static(b"foo"), Bytes::from_static(b"bar")]);
        assert_eq!(read_to_string(&body).unwrap(), "foobar");
    }

    #[test]
    fn closure_generator() {
        let gen = || io::Cursor::new(b"generated".to_vec());
        let mut s = String::new();
        gen.create_body().read_to_string(&mut s).unwrap();
        assert_eq!(s, "generated");
        assert_eq!(BodyGenerator::content_length(&gen), None);
    }
}
