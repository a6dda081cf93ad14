use std::borrow::Cow;
use std::fmt;

use encoding_rs::Encoding;

/// The charset text is encoded with before it is sent.
///
/// Most charsets are an [`encoding_rs::Encoding`]. ISO-8859-1 is kept apart:
/// the encoding registry treats its labels as windows-1252, which assigns
/// printable characters to `0x80..=0x9F` where ISO-8859-1 has the C1
/// controls.
///
/// ```
/// use reqbuild::Charset;
///
/// let latin1 = Charset::for_label("latin1").unwrap();
/// assert_eq!(latin1.name(), "ISO-8859-1");
/// assert_eq!(&latin1.encode("\u{80}").0[..], &[0x80]);
/// ```
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct Charset(Repr);

#[derive(Clone, Copy, PartialEq, Eq)]
enum Repr {
    Latin1,
    Encoding(&'static Encoding),
}

const LATIN1_LABELS: &[&str] = &[
    "iso-8859-1",
    "iso8859-1",
    "iso88591",
    "iso_8859-1",
    "iso_8859-1:1987",
    "latin1",
    "l1",
    "cp819",
    "ibm819",
    "iso-ir-100",
    "csisolatin1",
];

impl Charset {
    /// ISO-8859-1, one byte per code point up to `U+00FF`.
    pub const ISO_8859_1: Charset = Charset(Repr::Latin1);

    /// Look up a charset by any of its labels, ignoring case and
    /// surrounding whitespace.
    pub fn for_label(label: &str) -> Option<Charset> {
        let label = label.trim();
        if LATIN1_LABELS
            .iter()
            .any(|latin1| latin1.eq_ignore_ascii_case(label))
        {
            return Some(Charset::ISO_8859_1);
        }
        Encoding::for_label(label.as_bytes()).map(Charset::from)
    }

    /// The canonical name, such as `UTF-8` or `ISO-8859-1`.
    pub fn name(&self) -> &'static str {
        match self.0 {
            Repr::Latin1 => "ISO-8859-1",
            Repr::Encoding(encoding) => encoding.name(),
        }
    }

    /// The `encoding_rs` encoding behind this charset. `None` for
    /// ISO-8859-1.
    pub fn encoding(&self) -> Option<&'static Encoding> {
        match self.0 {
            Repr::Latin1 => None,
            Repr::Encoding(encoding) => Some(encoding),
        }
    }

    /// Encode `text`.
    ///
    /// The flag is `true` when some characters had no mapping. ISO-8859-1
    /// writes those as `?`, other charsets as numeric character references.
    pub fn encode<'a>(&self, text: &'a str) -> (Cow<'a, [u8]>, bool) {
        match self.0 {
            Repr::Latin1 if encoding_rs::mem::is_str_latin1(text) => {
                (encoding_rs::mem::encode_latin1_lossy(text), false)
            }
            Repr::Latin1 => {
                let bytes = text
                    .chars()
                    .map(|c| u8::try_from(c).unwrap_or(b'?'))
                    .collect();
                (Cow::Owned(bytes), true)
            }
            Repr::Encoding(encoding) => {
                let (bytes, _, unmappable) = encoding.encode(text);
                (bytes, unmappable)
            }
        }
    }
}

impl From<&'static Encoding> for Charset {
    fn from(encoding: &'static Encoding) -> Charset {
        Charset(Repr::Encoding(encoding))
    }
}

impl fmt::Debug for Charset {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_tuple("Charset").field(&self.name()).finish()
    }
}

impl fmt::Display for Charset {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn latin1_labels_are_not_windows_1252() {
        for label in ["ISO-8859-1", "iso_8859-1", " Latin1 ", "l1", "CP819"] {
            let charset = Charset::for_label(label).unwrap();
            assert_eq!(charset, Charset::ISO_8859_1, "{}", label);
            assert_eq!(charset.name(), "ISO-8859-1");
            assert!(charset.encoding().is_none());
        }

        let cp1252 = Charset::for_label("windows-1252").unwrap();
        assert_ne!(cp1252, Charset::ISO_8859_1);
        assert_eq!(cp1252.name(), "windows-1252");
    }

    #[test]
    fn latin1_encodes_c1_controls_as_single_bytes() {
        let (bytes, unmappable) = Charset::ISO_8859_1.encode("\u{80}\u{9f}\u{e9}");
        assert_eq!(&bytes[..], &[0x80, 0x9f, 0xe9]);
        assert!(!unmappable);

        let (bytes, _, _) = encoding_rs::WINDOWS_1252.encode("\u{80}");
        assert_ne!(&bytes[..], &[0x80]);
    }

    #[test]
    fn latin1_replaces_wider_characters() {
        let (bytes, unmappable) = Charset::ISO_8859_1.encode("a\u{20ac}b");
        assert_eq!(&bytes[..], b"a?b");
        assert!(unmappable);
    }

    #[test]
    fn other_labels_use_the_registry() {
        let utf8 = Charset::for_label("utf8").unwrap();
        assert_eq!(utf8, Charset::from(encoding_rs::UTF_8));
        assert_eq!(utf8.encoding(), Some(encoding_rs::UTF_8));
        assert_eq!(&utf8.encode("\u{e9}").0[..], "\u{e9}".as_bytes());
        assert_eq!(utf8.to_string(), "UTF-8");

        assert!(Charset::for_label("not-a-charset").is_none());
    }
}
