use crate::Result;
use std::io::Write;

/// Percent of non-plain bytes tolerated before content is switched
/// from quoted-printable to base64 encoding.
const B64_PERCENT: usize = 20;

/// Define our own because data_encoding::BASE64_MIME, despite its name,
/// is not RFC2045 compliant: it wraps with a bare LF and will not
/// ignore spaces when decoding
pub(crate) const BASE64_RFC2045: data_encoding::Encoding = data_encoding_macro::new_encoding! {
    symbols: "ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789+/",
    padding: '=',
    ignore: " \r\n\t",
    wrap_width: 76,
    wrap_separator: "\r\n",
};

/// The three transfer encodings the encoder can emit.
/// 7bit is the RFC 2045 default and is never written as a header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransferEncoding {
    SevenBit,
    QuotedPrintable,
    Base64,
}

impl TransferEncoding {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::SevenBit => "7bit",
            Self::QuotedPrintable => "quoted-printable",
            Self::Base64 => "base64",
        }
    }
}

/// Scan content and select the transfer encoding that can represent
/// it. A byte is "plain" if it is printable US-ASCII or a tab; CR and
/// LF also count as plain unless `quote_line_breaks` is set (header
/// values must not contain raw line breaks, bodies may).
///
/// Content whose non-plain count reaches 20% of its length is base64;
/// entirely plain content is 7bit; anything in between is
/// quoted-printable.
pub fn select_transfer_encoding(content: &[u8], quote_line_breaks: bool) -> TransferEncoding {
    if content.is_empty() {
        return TransferEncoding::SevenBit;
    }
    // Non-plain bytes remaining before we give up and use base64
    let threshold = B64_PERCENT * content.len() / 100;
    let mut bincount = 0;
    for &b in content {
        if !(0x20..=0x7e).contains(&b) && b != b'\t' {
            if !quote_line_breaks && (b == b'\r' || b == b'\n') {
                continue;
            }
            bincount += 1;
            if bincount >= threshold {
                // The count only ever grows, so the verdict cannot
                // change by scanning the remainder
                return TransferEncoding::Base64;
            }
        }
    }
    if bincount == 0 {
        return TransferEncoding::SevenBit;
    }
    TransferEncoding::QuotedPrintable
}

/// Write `content` to `out` under the selected transfer encoding.
/// Base64 output is wrapped at 76 columns with every line, including
/// the final one, terminated by CRLF.
pub(crate) fn encode_content<W: Write>(
    out: &mut W,
    content: &[u8],
    encoding: TransferEncoding,
) -> Result<()> {
    match encoding {
        TransferEncoding::Base64 => {
            let mut text = BASE64_RFC2045.encode(content);
            if !text.ends_with("\r\n") {
                text.push_str("\r\n");
            }
            out.write_all(text.as_bytes())?;
        }
        TransferEncoding::QuotedPrintable => {
            out.write_all(&quoted_printable::encode(content))?;
        }
        TransferEncoding::SevenBit => {
            out.write_all(content)?;
        }
    }
    Ok(())
}
