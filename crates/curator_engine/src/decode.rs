use chardetng::EncodingDetector;
use encoding_rs::Encoding;

/// How far into the document a `<meta charset>` declaration is looked for.
const META_SNIFF_LIMIT: usize = 1024;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedHtml {
    pub html: String,
    pub encoding_label: String,
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum DecodeError {
    #[error("failed to decode bytes with {encoding}: {message}")]
    DecodeFailure { encoding: String, message: String },
}

/// Decode raw bytes into UTF-8 using: BOM -> Content-Type charset -> meta charset -> chardetng.
pub fn decode_html(bytes: &[u8], content_type: Option<&str>) -> Result<DecodedHtml, DecodeError> {
    if let Some((encoding, _)) = Encoding::for_bom(bytes) {
        return decode_with(bytes, encoding);
    }

    if let Some(enc) = content_type
        .and_then(charset_from_content_type)
        .and_then(|label| Encoding::for_label(label.as_bytes()))
    {
        return decode_with(bytes, enc);
    }

    if let Some(enc) = sniff_meta_charset(bytes).and_then(|label| Encoding::for_label(label.as_bytes())) {
        return decode_with(bytes, enc);
    }

    let mut detector = EncodingDetector::new();
    detector.feed(bytes, true);
    let enc = detector.guess(None, true);
    decode_with(bytes, enc)
}

fn charset_from_content_type(content_type: &str) -> Option<String> {
    content_type.split(';').find_map(|part| {
        let (key, value) = part.split_once('=')?;
        key.trim()
            .eq_ignore_ascii_case("charset")
            .then(|| value.trim().trim_matches(['"', '\'']).to_string())
    })
}

/// Finds `charset=` inside the first `<meta` tags of the document head.
fn sniff_meta_charset(bytes: &[u8]) -> Option<String> {
    let head = &bytes[..bytes.len().min(META_SNIFF_LIMIT)];
    let head = String::from_utf8_lossy(head).to_ascii_lowercase();
    let mut rest = head.as_str();
    while let Some(start) = rest.find("<meta") {
        let tag = &rest[start..];
        let tag = &tag[..tag.find('>').unwrap_or(tag.len())];
        if let Some(pos) = tag.find("charset=") {
            let label: String = tag[pos + "charset=".len()..]
                .trim_start_matches(['"', '\''])
                .chars()
                .take_while(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | ':' | '.'))
                .collect();
            if !label.is_empty() {
                return Some(label);
            }
        }
        rest = &rest[start + "<meta".len()..];
    }
    None
}

fn decode_with(bytes: &[u8], enc: &'static Encoding) -> Result<DecodedHtml, DecodeError> {
    let (text, _, had_errors) = enc.decode(bytes);
    if had_errors {
        return Err(DecodeError::DecodeFailure {
            encoding: enc.name().to_string(),
            message: "decoding error".into(),
        });
    }
    Ok(DecodedHtml {
        html: text.into_owned(),
        encoding_label: enc.name().to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::{charset_from_content_type, decode_html, sniff_meta_charset};

    #[test]
    fn header_charset_wins_over_meta() {
        let bytes = b"<html><head><meta charset=\"utf-8\"></head><body>caf\xe9</body></html>";
        let decoded = decode_html(bytes, Some("text/html; charset=ISO-8859-1")).unwrap();
        assert_eq!(decoded.encoding_label, "windows-1252");
        assert!(decoded.html.contains("café"));
    }

    #[test]
    fn meta_charset_used_without_header() {
        let bytes = b"<html><head><meta http-equiv=\"Content-Type\" content=\"text/html; charset=windows-1252\"></head><body>na\xefve</body></html>";
        let decoded = decode_html(bytes, Some("text/html")).unwrap();
        assert_eq!(decoded.encoding_label, "windows-1252");
        assert!(decoded.html.contains("naïve"));
    }

    #[test]
    fn bom_takes_precedence() {
        let mut bytes = vec![0xEF, 0xBB, 0xBF];
        bytes.extend_from_slice("<p>héllo</p>".as_bytes());
        let decoded = decode_html(&bytes, Some("text/html; charset=windows-1252")).unwrap();
        assert_eq!(decoded.encoding_label, "UTF-8");
        assert!(decoded.html.contains("héllo"));
    }

    #[test]
    fn invalid_utf8_is_a_decode_failure() {
        let err = decode_html(b"<p>\xff\xfe\xfd</p>", Some("text/html; charset=utf-8")).unwrap_err();
        assert!(err.to_string().contains("UTF-8"));
    }

    #[test]
    fn charset_parameter_is_case_insensitive_and_unquoted() {
        assert_eq!(
            charset_from_content_type("text/html; Charset=\"utf-8\"").as_deref(),
            Some("utf-8")
        );
        assert_eq!(charset_from_content_type("text/html"), None);
    }

    #[test]
    fn meta_sniffing_ignores_non_meta_tags() {
        assert_eq!(sniff_meta_charset(b"<p>charset=koi8-r</p>"), None);
        assert_eq!(
            sniff_meta_charset(b"<META CHARSET='Shift_JIS'>").as_deref(),
            Some("shift_jis")
        );
    }
}
