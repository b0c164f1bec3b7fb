use crate::encoding::{encode_content, select_transfer_encoding, TransferEncoding};
use crate::mediatype::format_media_type;
use crate::part::Part;
use crate::rfc2047::{HeaderEncoder, SelectiveHeaderEncoder};
use crate::strings::{fold_header_line, to_ascii, to_id_header};
use crate::Result;
use std::io::{BufWriter, Write};
use std::sync::{Arc, LazyLock};
use tracing::trace;

const HN_CONTENT_DISPOSITION: &str = "Content-Disposition";
const HN_CONTENT_ID: &str = "Content-ID";
const HN_CONTENT_TRANSFER_ENCODING: &str = "Content-Transfer-Encoding";
const HN_CONTENT_TYPE: &str = "Content-Type";

const HP_BOUNDARY: &str = "boundary";
const HP_CHARSET: &str = "charset";
const HP_FILENAME: &str = "filename";
const HP_MOD_DATE: &str = "modification-date";
const HP_NAME: &str = "name";

const UTF8: &str = "utf-8";
const CRNL: &[u8] = b"\r\n";

/// RFC 822 date layout used for the modification-date parameter.
const RFC822_DATE: &str = "%d %b %y %H:%M %z";

/// Selects a transfer encoding for a run of content bytes; the flag
/// requests that CR/LF count as bytes needing encoding.
pub type ClassifierFn = Arc<dyn Fn(&[u8], bool) -> TransferEncoding + Send + Sync>;
/// Decides whether a part is eligible for text-style encoding.
pub type TextPartFn = Arc<dyn Fn(&Part) -> bool + Send + Sync>;
/// Produces a fresh multipart boundary token.
pub type BoundaryGeneratorFn = Arc<dyn Fn() -> String + Send + Sync>;
/// Builds the header encoder used for a given part.
pub type HeaderEncoderFactoryFn =
    Arc<dyn Fn(&Encoder, &Part) -> Result<Box<dyn HeaderEncoder>> + Send + Sync>;

/// Renders a [`Part`] tree into its MIME wire form. Immutable once
/// constructed; a single instance may serve concurrent encodes of
/// independent part trees.
#[derive(Clone)]
pub struct Encoder {
    classifier: ClassifierFn,
    text_part: TextPartFn,
    boundary_generator: BoundaryGeneratorFn,
    header_encoder_factory: HeaderEncoderFactoryFn,
}

impl Default for Encoder {
    fn default() -> Self {
        Self::new()
    }
}

fn generate_boundary() -> String {
    let uuid = uuid::Uuid::new_v4();
    data_encoding::BASE64_NOPAD.encode(uuid.as_bytes())
}

fn new_selective_header_encoder(e: &Encoder, p: &Part) -> Result<Box<dyn HeaderEncoder>> {
    let charset = if p.charset.is_empty() {
        UTF8
    } else {
        p.charset.as_str()
    };
    Ok(Box::new(SelectiveHeaderEncoder::new(
        charset,
        Arc::clone(&e.classifier),
    )))
}

impl Encoder {
    pub fn new() -> Self {
        Self {
            classifier: Arc::new(select_transfer_encoding),
            text_part: Arc::new(Part::is_text_content),
            boundary_generator: Arc::new(generate_boundary),
            header_encoder_factory: Arc::new(new_selective_header_encoder),
        }
    }

    pub fn with_transfer_encoding_classifier(mut self, f: ClassifierFn) -> Self {
        self.classifier = f;
        self
    }

    pub fn with_text_part_predicate(mut self, f: TextPartFn) -> Self {
        self.text_part = f;
        self
    }

    pub fn with_boundary_generator(mut self, f: BoundaryGeneratorFn) -> Self {
        self.boundary_generator = f;
        self
    }

    pub fn with_header_encoder_factory(mut self, f: HeaderEncoderFactoryFn) -> Self {
        self.header_encoder_factory = f;
        self
    }

    /// Determine the content transfer encoding, generate a boundary
    /// string if required, then set the Content-Type (type, charset,
    /// filename, boundary), Content-Disposition and Content-ID
    /// headers.
    fn setup_mime_headers(&self, p: &mut Part) -> TransferEncoding {
        // A transfer-encoding header from a previous encode must not
        // leak into the selection below.
        p.headers.remove_all_named(HN_CONTENT_TRANSFER_ENCODING);

        let mut cte = TransferEncoding::SevenBit;
        if !p.content.is_empty() {
            cte = TransferEncoding::Base64;
            if (self.text_part)(p) {
                cte = (self.classifier)(&p.content, false);
                if p.charset.is_empty() {
                    p.charset = UTF8.to_string();
                }
            }
            trace!(
                content_type = %p.content_type,
                encoding = cte.as_str(),
                "selected transfer encoding"
            );
            // RFC 2045: 7bit is assumed when the CTE header is absent
            if cte != TransferEncoding::SevenBit {
                p.headers.set(HN_CONTENT_TRANSFER_ENCODING, cte.as_str());
            }
        }
        if !p.children.is_empty() && p.boundary.is_empty() {
            p.boundary = (self.boundary_generator)();
            trace!(boundary = %p.boundary, "generated multipart boundary");
        }
        if !p.content_id.is_empty() {
            p.headers.set(HN_CONTENT_ID, to_id_header(&p.content_id));
        }
        if !p.content_type.is_empty() {
            let file_name = to_ascii(&p.file_name);
            let params = [
                (HP_BOUNDARY, p.boundary.as_str()),
                (HP_CHARSET, p.charset.as_str()),
                (HP_NAME, file_name.as_str()),
            ];
            let mt = format_media_type(&p.content_type, &params)
                .unwrap_or_else(|| p.content_type.clone());
            p.headers.set(HN_CONTENT_TYPE, mt);
        }
        if !p.disposition.is_empty() {
            let file_name = to_ascii(&p.file_name);
            let mod_date = p
                .file_mod_date
                .map(|d| d.format(RFC822_DATE).to_string())
                .unwrap_or_default();
            let params = [
                (HP_FILENAME, file_name.as_str()),
                (HP_MOD_DATE, mod_date.as_str()),
            ];
            let mt = format_media_type(&p.disposition, &params)
                .unwrap_or_else(|| p.disposition.clone());
            p.headers.set(HN_CONTENT_DISPOSITION, mt);
        }
        cte
    }

    /// Write `p` and all of its children to `out` in MIME format.
    /// Any failure aborts the whole encode and leaves the sink in a
    /// truncated state that the caller must discard.
    pub fn encode<W: Write>(&self, p: &mut Part, out: &mut W) -> Result<()> {
        let mut b = BufWriter::new(out);
        self.encode_part(p, &mut b)?;
        b.flush()?;
        Ok(())
    }

    fn encode_part<W: Write>(&self, p: &mut Part, b: &mut W) -> Result<()> {
        let cte = self.setup_mime_headers(p);
        self.encode_header(p, b)?;
        if !p.content.is_empty() {
            if !p.headers.is_empty() {
                b.write_all(CRNL)?;
            }
            encode_content(b, &p.content, cte)?;
        }
        if p.children.is_empty() {
            return Ok(());
        }
        let marker = format!("\r\n--{}", p.boundary);
        for c in &mut p.children {
            b.write_all(marker.as_bytes())?;
            b.write_all(CRNL)?;
            self.encode_part(c, b)?;
        }
        b.write_all(marker.as_bytes())?;
        b.write_all(b"--")?;
        b.write_all(CRNL)?;
        Ok(())
    }

    /// Write out the header block: names in sort order, each value
    /// passed through the header encoder and folded to the 76-column
    /// budget.
    fn encode_header<W: Write>(&self, p: &Part, b: &mut W) -> Result<()> {
        let header_encoder = (self.header_encoder_factory)(self, p)?;
        for name in p.headers.sorted_names() {
            for hdr in p.headers.iter_named(name) {
                let (_, encoded) = header_encoder.encode(0, hdr.get_raw_value())?;
                b.write_all(fold_header_line(name, &encoded).as_bytes())?;
                b.write_all(CRNL)?;
            }
        }
        Ok(())
    }
}

static DEFAULT_ENCODER: LazyLock<Encoder> = LazyLock::new(Encoder::new);

/// The shared, immutable encoder with the default strategies.
pub(crate) fn default_encoder() -> &'static Encoder {
    &DEFAULT_ENCODER
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::MailEncodingError;
    use chrono::{FixedOffset, TimeZone};

    fn encode_to_string(p: &mut Part) -> String {
        let mut out = vec![];
        Encoder::new().encode(p, &mut out).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn empty_part_writes_nothing() {
        k9::assert_equal!(encode_to_string(&mut Part::default()), "");
    }

    #[test]
    fn header_only_part() {
        // No content, so no charset defaulting and no blank line
        k9::assert_equal!(
            encode_to_string(&mut Part::new("text/plain")),
            "Content-Type: text/plain\r\n"
        );
    }

    #[test]
    fn content_only_part() {
        let mut p = Part::default();
        p.content = b"No header, only content.".to_vec();
        k9::assert_equal!(encode_to_string(&mut p), "No header, only content.");
    }

    #[test]
    fn plain_text_part() {
        let mut p = Part::new("text/plain");
        p.content = b"This is a test of a plain text part.\r\n\r\nAnother line.\r\n".to_vec();
        k9::assert_equal!(
            encode_to_string(&mut p),
            concat!(
                "Content-Type: text/plain; charset=utf-8\r\n",
                "\r\n",
                "This is a test of a plain text part.\r\n",
                "\r\n",
                "Another line.\r\n"
            )
        );
    }

    #[test]
    fn quoted_printable_part() {
        let mut p = Part::new("text/plain");
        p.content = "Café au lait, s'il vous plaît".as_bytes().to_vec();
        k9::assert_equal!(
            encode_to_string(&mut p),
            concat!(
                "Content-Transfer-Encoding: quoted-printable\r\n",
                "Content-Type: text/plain; charset=utf-8\r\n",
                "\r\n",
                "Caf=C3=A9 au lait, s'il vous pla=C3=AEt"
            )
        );
    }

    #[test]
    fn binary_content_type_forces_base64() {
        let mut p = Part::new("image/gif");
        p.content = b"GIF89a".to_vec();
        k9::assert_equal!(
            encode_to_string(&mut p),
            concat!(
                "Content-Transfer-Encoding: base64\r\n",
                "Content-Type: image/gif\r\n",
                "\r\n",
                "R0lGODlh\r\n"
            )
        );
    }

    #[test]
    fn non_ascii_header_values_become_encoded_words() {
        let mut p = Part::new("text/plain");
        p.headers.set("Subject", "¡Hola, señor!");
        p.content = b"This is a test of a plain text part.\r\n".to_vec();
        k9::assert_equal!(
            encode_to_string(&mut p),
            concat!(
                "Content-Type: text/plain; charset=utf-8\r\n",
                "Subject: =?utf-8?B?wqFIb2xhLCBzZcOxb3Ih?=\r\n",
                "\r\n",
                "This is a test of a plain text part.\r\n"
            )
        );
    }

    #[test]
    fn mixed_case_repeated_headers_write_each_value_once() {
        let mut p = Part::default();
        p.headers.add("x-tag", "one");
        p.headers.add("X-Other", "mid");
        p.headers.add("X-Tag", "two");
        k9::assert_equal!(
            encode_to_string(&mut p),
            concat!(
                "X-Other: mid\r\n",
                "x-tag: one\r\n",
                "x-tag: two\r\n"
            )
        );
    }

    #[test]
    fn stale_transfer_encoding_is_discarded() {
        let mut p = Part::new("text/plain");
        p.headers.set("Content-Transfer-Encoding", "base64");
        p.content = b"just plain text".to_vec();
        let encoded = encode_to_string(&mut p);
        assert!(
            !encoded.contains("Content-Transfer-Encoding"),
            "stale CTE header leaked: {encoded}"
        );
    }

    #[test]
    fn content_id_in_angle_brackets() {
        let mut p = Part::new("image/png");
        p.content_id = "img.1@example".to_string();
        k9::assert_equal!(
            encode_to_string(&mut p),
            concat!(
                "Content-ID: <img.1@example>\r\n",
                "Content-Type: image/png\r\n"
            )
        );
    }

    #[test]
    fn disposition_with_filename_and_date() {
        let mut p = Part::new("application/pdf");
        p.disposition = "attachment".to_string();
        p.file_name = "résumé.pdf".to_string();
        p.file_mod_date = Some(
            FixedOffset::east_opt(0)
                .unwrap()
                .with_ymd_and_hms(2024, 3, 14, 9, 30, 0)
                .unwrap(),
        );
        p.content = b"%PDF".to_vec();
        k9::assert_equal!(
            encode_to_string(&mut p),
            concat!(
                "Content-Disposition: attachment; filename=resume.pdf; modification-date=\"14\r\n",
                " Mar 24 09:30 +0000\"\r\n",
                "Content-Transfer-Encoding: base64\r\n",
                "Content-Type: application/pdf; name=resume.pdf\r\n",
                "\r\n",
                "JVBERg==\r\n"
            )
        );
    }

    #[test]
    fn unformattable_content_type_falls_back_to_bare_value() {
        k9::assert_equal!(
            encode_to_string(&mut Part::new("bogus type")),
            "Content-Type: bogus type\r\n"
        );
    }

    #[test]
    fn multipart_with_children() {
        let mut root = Part::new("multipart/alternative");
        root.boundary = "sample-1234567890-parent".to_string();
        root.content = b"Do you even MIME bro?".to_vec();

        let mut html = Part::new("text/html");
        html.content = b"<div>HTML part</div>".to_vec();
        root.children.push(html);

        let mut plain = Part::new("text/plain");
        plain.content = b"Plain text part".to_vec();
        root.children.push(plain);

        k9::assert_equal!(
            encode_to_string(&mut root),
            concat!(
                "Content-Type: multipart/alternative; boundary=sample-1234567890-parent;\r\n",
                " charset=utf-8\r\n",
                "\r\n",
                "Do you even MIME bro?",
                "\r\n--sample-1234567890-parent\r\n",
                "Content-Type: text/html; charset=utf-8\r\n",
                "\r\n",
                "<div>HTML part</div>",
                "\r\n--sample-1234567890-parent\r\n",
                "Content-Type: text/plain; charset=utf-8\r\n",
                "\r\n",
                "Plain text part",
                "\r\n--sample-1234567890-parent--\r\n"
            )
        );
    }

    #[test]
    fn missing_boundary_is_generated_and_reused() {
        let mut p = Part::new("multipart/mixed");
        p.children.push(Part::new("text/plain"));

        let first = encode_to_string(&mut p);
        assert!(!p.boundary.is_empty());
        assert!(first.contains(&format!("\r\n--{}--\r\n", p.boundary)));

        // A second encode must reuse the boundary already on the part
        let boundary = p.boundary.clone();
        let second = encode_to_string(&mut p);
        k9::assert_equal!(first, second);
        k9::assert_equal!(p.boundary, boundary);
    }

    #[test]
    fn generated_boundaries_are_unique() {
        let mut a = Part::new("multipart/mixed");
        a.children.push(Part::default());
        let mut b = Part::new("multipart/mixed");
        b.children.push(Part::default());
        encode_to_string(&mut a);
        encode_to_string(&mut b);
        assert_ne!(a.boundary, b.boundary);
    }

    #[test]
    fn strategy_overrides() {
        let encoder = Encoder::new()
            .with_boundary_generator(Arc::new(|| "fixed-boundary".to_string()))
            .with_text_part_predicate(Arc::new(|_| false));

        let mut p = Part::new("text/plain");
        p.content = b"forced to base64".to_vec();
        p.children.push(Part::default());

        let mut out = vec![];
        encoder.encode(&mut p, &mut out).unwrap();
        let encoded = String::from_utf8(out).unwrap();

        k9::assert_equal!(p.boundary, "fixed-boundary");
        assert!(encoded.contains("Content-Transfer-Encoding: base64\r\n"));
        assert!(encoded.ends_with("\r\n--fixed-boundary--\r\n"));
    }

    #[test]
    fn failing_header_encoder_aborts_encode() {
        let encoder = Encoder::new().with_header_encoder_factory(Arc::new(|_, _| {
            Err(MailEncodingError::HeaderEncode("nope".to_string()))
        }));
        let mut p = Part::new("text/plain");
        let err = encoder.encode(&mut p, &mut vec![]).unwrap_err();
        assert!(matches!(err, MailEncodingError::HeaderEncode(_)));
    }

    #[test]
    fn sink_failure_propagates() {
        struct FailingSink;
        impl Write for FailingSink {
            fn write(&mut self, _buf: &[u8]) -> std::io::Result<usize> {
                Err(std::io::Error::other("sink closed"))
            }
            fn flush(&mut self) -> std::io::Result<()> {
                Err(std::io::Error::other("sink closed"))
            }
        }

        let mut p = Part::new("text/plain");
        p.content = b"some content".to_vec();
        let err = Encoder::new().encode(&mut p, &mut FailingSink).unwrap_err();
        assert!(matches!(err, MailEncodingError::Write(_)));
    }
}
