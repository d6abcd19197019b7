//! Content-Transfer-Encoding variants and their line encoders.

use std::fmt;
use std::fmt::Write as _;

use super::chunk::chunk_base64;
use super::error::{ArchiveError, Result};
use super::MAX_LINE_WIDTH;

/// Transfer encoding declared by a part.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransferEncoding {
    SevenBit,
    EightBit,
    Binary,
    QuotedPrintable,
    Base64,
    /// Anything else, kept verbatim for error reporting.
    Other(String),
}

impl TransferEncoding {
    /// Parses a header value; tokens are case-insensitive and a missing
    /// header means 7bit.
    pub fn parse(value: Option<&str>) -> Self {
        let Some(value) = value else {
            return Self::SevenBit;
        };
        match value.trim().to_ascii_lowercase().as_str() {
            "7bit" | "" => Self::SevenBit,
            "8bit" => Self::EightBit,
            "binary" => Self::Binary,
            "quoted-printable" => Self::QuotedPrintable,
            "base64" => Self::Base64,
            _ => Self::Other(value.trim().to_string()),
        }
    }

    /// Renders `raw` as the physical body lines for this encoding,
    /// without terminators. Identity encodings keep the bytes as they are,
    /// whatever their charset.
    pub fn encode_lines(&self, raw: &[u8]) -> Result<Vec<Vec<u8>>> {
        match self {
            Self::Base64 => Ok(into_bytes(chunk_base64(raw))),
            Self::QuotedPrintable => Ok(into_bytes(encode_quoted_printable(raw))),
            Self::SevenBit | Self::EightBit | Self::Binary => Ok(encode_identity(raw)),
            Self::Other(name) => Err(ArchiveError::UnsupportedEncoding(name.clone())),
        }
    }
}

impl fmt::Display for TransferEncoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SevenBit => write!(f, "7bit"),
            Self::EightBit => write!(f, "8bit"),
            Self::Binary => write!(f, "binary"),
            Self::QuotedPrintable => write!(f, "quoted-printable"),
            Self::Base64 => write!(f, "base64"),
            Self::Other(name) => write!(f, "{name}"),
        }
    }
}

fn into_bytes(lines: Vec<String>) -> Vec<Vec<u8>> {
    lines.into_iter().map(String::into_bytes).collect()
}

// Same line rules as `str::lines`: LF or CRLF ends a line and a final
// terminator does not open an empty line.
fn encode_identity(raw: &[u8]) -> Vec<Vec<u8>> {
    if raw.is_empty() {
        return Vec::new();
    }
    let body = raw.strip_suffix(b"\n").unwrap_or(raw);
    body.split(|&byte| byte == b'\n')
        .map(|line| line.strip_suffix(b"\r").unwrap_or(line).to_vec())
        .collect()
}

/// Encodes arbitrary bytes as quoted-printable (RFC 2045). Every byte
/// outside printable ASCII, including CR and LF, is escaped, so the lines
/// carry soft breaks only. A line never starts with `From ` (RFC 2049).
pub fn encode_quoted_printable(raw: &[u8]) -> Vec<String> {
    let mut lines = Vec::new();
    let mut line = String::new();

    for (idx, &byte) in raw.iter().enumerate() {
        let last = idx + 1 == raw.len();
        let mut token = String::with_capacity(3);
        match byte {
            b'!'..=b'<' | b'>'..=b'~' => token.push(byte as char),
            // whitespace at the end of the data must be visible
            b' ' | b'\t' if !last => token.push(byte as char),
            _ => {
                let _ = write!(token, "={byte:02X}");
            }
        }

        // keep room for the trailing '=' soft break
        if line.len() + token.len() > MAX_LINE_WIDTH - 1 {
            line.push('=');
            lines.push(std::mem::take(&mut line));
        }
        if line.is_empty() && raw[idx..].starts_with(b"From ") {
            token = "=46".to_string();
        }
        line.push_str(&token);
    }

    if !line.is_empty() {
        lines.push(line);
    }
    lines
}
