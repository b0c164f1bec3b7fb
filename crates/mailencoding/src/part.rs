use crate::headermap::HeaderMap;
use crate::Result;
use chrono::{DateTime, FixedOffset};

/// One node of a MIME message tree: headers plus either body content
/// or child parts. Built and mutated by the caller; the encoder
/// overwrites the transfer-encoding, content-type, disposition and
/// content-id headers (and the boundary, when it generates one) on
/// each encode, and otherwise reads without mutating.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Part {
    pub headers: HeaderMap,
    pub content: Vec<u8>,
    pub content_type: String,
    /// Empty means unset; defaulted to utf-8 for text-eligible parts
    /// with content.
    pub charset: String,
    pub disposition: String,
    pub file_name: String,
    pub file_mod_date: Option<DateTime<FixedOffset>>,
    pub content_id: String,
    /// Must be non-empty before serializing a part with children;
    /// generated if absent.
    pub boundary: String,
    pub children: Vec<Part>,
}

impl Part {
    pub fn new(content_type: &str) -> Self {
        Self {
            content_type: content_type.to_string(),
            ..Self::default()
        }
    }

    /// Whether this part's content type is eligible for text-style
    /// transfer encoding (7bit or quoted-printable). Parts that are
    /// not are forced to base64 by the encoder.
    pub fn is_text_content(&self) -> bool {
        self.content_type.is_empty()
            || self.content_type.starts_with("text/")
            || self.content_type.starts_with("multipart/")
    }

    /// Encode this part and all of its children to `out` using the
    /// process-wide default encoder.
    pub fn encode<W: std::io::Write>(&mut self, out: &mut W) -> Result<()> {
        crate::encoder::default_encoder().encode(self, out)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn text_content_eligibility() {
        assert!(Part::default().is_text_content());
        assert!(Part::new("text/plain").is_text_content());
        assert!(Part::new("text/html").is_text_content());
        assert!(Part::new("multipart/mixed").is_text_content());
        assert!(!Part::new("application/octet-stream").is_text_content());
        assert!(!Part::new("image/png").is_text_content());
    }

    #[test]
    fn encode_uses_default_encoder() {
        let mut part = Part::new("text/plain");
        part.content = b"body".to_vec();
        let mut out = vec![];
        part.encode(&mut out).unwrap();
        k9::assert_equal!(
            String::from_utf8(out).unwrap(),
            "Content-Type: text/plain; charset=utf-8\r\n\r\nbody"
        );
    }
}
