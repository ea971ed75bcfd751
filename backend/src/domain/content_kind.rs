//! Content sniffing for stored files.
//!
//! Only the leading bytes are inspected; the type declared at upload time is
//! ignored.

/// Number of leading bytes inspected by [`ContentKind::sniff`].
pub const SNIFF_LEN: usize = 512;

const PDF_SIGNATURE: &[u8] = b"%PDF-";
const PNG_SIGNATURE: &[u8] = b"\x89PNG\r\n\x1a\n";
const JPEG_SIGNATURE: &[u8] = &[0xFF, 0xD8, 0xFF];

// Case-insensitive prefixes that mark HTML or XML documents.
const MARKUP_SIGNATURES: &[&[u8]] = &[
    b"<!DOCTYPE HTML",
    b"<HTML",
    b"<HEAD",
    b"<SCRIPT",
    b"<IFRAME",
    b"<H1",
    b"<DIV",
    b"<FONT",
    b"<TABLE",
    b"<A",
    b"<STYLE",
    b"<TITLE",
    b"<B",
    b"<BODY",
    b"<BR",
    b"<P",
    b"<!--",
    b"<?XML",
    b"<SVG",
];

/// Rendering category of a stored file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentKind {
    /// `%PDF` magic bytes.
    Pdf,
    /// PNG signature.
    Png,
    /// JPEG start-of-image marker.
    Jpeg,
    /// Text without binary control bytes.
    PlainText,
    /// HTML or XML; never rendered.
    Markup,
    /// Binary data of any other kind.
    Unsupported,
}

impl ContentKind {
    /// Classify `bytes` from their first [`SNIFF_LEN`] bytes.
    ///
    /// # Examples
    /// ```
    /// use vault::domain::ContentKind;
    ///
    /// assert_eq!(ContentKind::sniff(b"%PDF-1.7 ..."), ContentKind::Pdf);
    /// assert_eq!(ContentKind::sniff(b"hello"), ContentKind::PlainText);
    /// assert_eq!(ContentKind::sniff(b"<html><body>"), ContentKind::Markup);
    /// ```
    pub fn sniff(bytes: &[u8]) -> Self {
        let head = &bytes[..bytes.len().min(SNIFF_LEN)];
        if head.starts_with(PDF_SIGNATURE) {
            return Self::Pdf;
        }
        if head.starts_with(PNG_SIGNATURE) {
            return Self::Png;
        }
        if head.starts_with(JPEG_SIGNATURE) {
            return Self::Jpeg;
        }
        if is_markup(head) {
            return Self::Markup;
        }
        if head.iter().any(|byte| is_binary(*byte)) {
            return Self::Unsupported;
        }
        Self::PlainText
    }

    /// MIME type used when serving the bytes directly, if they may be served.
    pub fn mime(self) -> Option<&'static str> {
        match self {
            Self::Pdf => Some("application/pdf"),
            Self::Png => Some("image/png"),
            Self::Jpeg => Some("image/jpeg"),
            Self::PlainText => Some("text/plain; charset=utf-8"),
            Self::Markup | Self::Unsupported => None,
        }
    }
}

fn is_binary(byte: u8) -> bool {
    matches!(byte, 0x00..=0x08 | 0x0B | 0x0E..=0x1A | 0x1C..=0x1F)
}

fn is_markup(head: &[u8]) -> bool {
    let start = head
        .iter()
        .position(|byte| !matches!(byte, b'\t' | b'\n' | 0x0C | b'\r' | b' '))
        .unwrap_or(head.len());
    let data = &head[start..];
    MARKUP_SIGNATURES.iter().any(|signature| {
        data.len() > signature.len()
            && data[..signature.len()].eq_ignore_ascii_case(signature)
            && is_tag_terminator(data[signature.len()], signature)
    })
}

fn is_tag_terminator(byte: u8, signature: &[u8]) -> bool {
    // `<!--` needs no terminator; tags end at a space or `>`.
    signature == b"<!--" || byte == b' ' || byte == b'>'
}
