use encoding_rs::UTF_8;
use mime::Mime;

use crate::header::HeaderValue;
use crate::Charset;

pub(crate) fn basic_auth<U, P>(username: U, password: Option<P>) -> HeaderValue
where
    U: std::fmt::Display,
    P: std::fmt::Display,
{
    let password = password.map(|p| p.to_string());
    basic_auth_with_charset(&username.to_string(), password.as_deref(), UTF_8.into())
}

pub(crate) fn basic_auth_with_charset(
    username: &str,
    password: Option<&str>,
    charset: Charset,
) -> HeaderValue {
    use base64::prelude::BASE64_STANDARD;
    use base64::write::EncoderWriter;
    use std::io::Write;

    let credentials = format!("{}:{}", username, password.unwrap_or(""));
    let (encoded, _) = charset.encode(&credentials);

    let mut buf = b"Basic ".to_vec();
    {
        let mut encoder = EncoderWriter::new(&mut buf, &BASE64_STANDARD);
        let _ = encoder.write_all(&encoded);
    }
    let mut header = HeaderValue::from_maybe_shared(bytes::Bytes::from(buf))
        .expect("base64 is always valid HeaderValue");
    header.set_sensitive(true);
    header
}

/// Read the charset parameter out of a `Content-Type` value.
///
/// Returns `None` when the value isn't a media type, has no charset, or
/// names a charset nobody knows.
pub(crate) fn parse_charset(content_type: &str) -> Option<Charset> {
    let mime = content_type.parse::<Mime>().ok()?;
    let label = mime.get_param(mime::CHARSET)?;
    Charset::for_label(label.as_str())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn basic_auth_without_password() {
        let header = basic_auth("user", None::<&str>);
        assert_eq!(header, "Basic dXNlcjo=");
        assert!(header.is_sensitive());
    }

    #[test]
    fn basic_auth_in_latin1() {
        let header = basic_auth_with_charset("Jos\u{e9}", Some("pw"), Charset::ISO_8859_1);
        assert_eq!(header, "Basic Sm9z6Tpwdw==");
    }

    #[test]
    fn charset_from_content_type() {
        assert_eq!(
            parse_charset("text/plain; charset=UTF-8"),
            Some(Charset::from(encoding_rs::UTF_8))
        );
        assert_eq!(
            parse_charset("text/plain; charset=\"utf-16le\""),
            Some(Charset::from(encoding_rs::UTF_16LE))
        );
    }

    #[test]
    fn latin1_content_type_keeps_its_charset() {
        let charset = parse_charset("text/plain; charset=ISO-8859-1").unwrap();
        assert_eq!(charset, Charset::ISO_8859_1);
        assert_eq!(&charset.encode("\u{80}").0[..], &[0x80]);
    }

    #[test]
    fn malformed_charset_is_none() {
        assert_eq!(parse_charset("text/plain; charset=not-a-charset"), None);
        assert_eq!(parse_charset("text/plain"), None);
        assert_eq!(parse_charset(";;;"), None);
    }
}
