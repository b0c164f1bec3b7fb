use crate::encoder::ClassifierFn;
use crate::encoding::TransferEncoding;
use crate::Result;

pub(crate) static HEX_CHARS: &[u8] = b"0123456789ABCDEF";

/// Encode `text` as a single RFC 2047 "B" encoded-word.
pub fn b_encode(charset: &str, text: &str) -> String {
    format!(
        "=?{charset}?B?{}?=",
        data_encoding::BASE64.encode(text.as_bytes())
    )
}

/// Encode `text` as a single RFC 2047 "Q" encoded-word.
/// Space becomes underscore; '?', '=', '_' and anything outside
/// printable ASCII become =XX hex pairs.
pub fn q_encode(charset: &str, text: &str) -> String {
    let mut encoded = String::with_capacity(text.len());
    for b in text.bytes() {
        if (b.is_ascii_alphanumeric() || b.is_ascii_punctuation())
            && b != b'?'
            && b != b'='
            && b != b'_'
        {
            encoded.push(b as char);
        } else if b == b' ' {
            encoded.push('_');
        } else {
            encoded.push('=');
            encoded.push(HEX_CHARS[(b as usize) >> 4] as char);
            encoded.push(HEX_CHARS[(b as usize) & 0x0f] as char);
        }
    }
    format!("=?{charset}?Q?{encoded}?=")
}

/// Renders a single header value, RFC 2047-encoding it when needed.
/// Implementations never fold; they report the column reached so the
/// caller can make folding decisions.
pub trait HeaderEncoder {
    fn encode(&self, start_column: usize, value: &str) -> Result<(usize, String)>;
}

/// The default header encoder: picks no encoding, "Q" or "B" per
/// value by classifying the value bytes as though they were content
/// that must quote its line breaks.
pub struct SelectiveHeaderEncoder {
    charset: String,
    classify: ClassifierFn,
}

impl SelectiveHeaderEncoder {
    pub fn new(charset: &str, classify: ClassifierFn) -> Self {
        Self {
            charset: charset.to_string(),
            classify,
        }
    }
}

impl HeaderEncoder for SelectiveHeaderEncoder {
    fn encode(&self, start_column: usize, value: &str) -> Result<(usize, String)> {
        let encoded = match (self.classify)(value.as_bytes(), true) {
            TransferEncoding::Base64 => b_encode(&self.charset, value),
            TransferEncoding::QuotedPrintable => q_encode(&self.charset, value),
            TransferEncoding::SevenBit => value.to_string(),
        };
        Ok((start_column + encoded.len(), encoded))
    }
}
