//! Writes parsed messages as mbox entries.
//!
//! Output layout for one message:
//!
//! ```text
//! From <from> <date>
//! <top-level headers>
//!
//! <boundary marker>          one block per part
//! <part headers>
//!
//! <folded text or encoded attachment lines>
//! <boundary marker>--        only when the message declares a boundary
//!
//! ```
//!
//! Every line ends in CRLF, and every entry ends in a blank line so the
//! next envelope starts on a fresh paragraph.

use std::io::Write;

use log::{debug, warn};
use regex::bytes::Regex;

use super::boundary::message_boundary;
use super::encoding::TransferEncoding;
use super::error::{ArchiveError, Result};
use super::fold::{fold_body, fold_lines_quoting};
use super::header::{emit_headers, write_fields};
use super::model::{first_value, ParsedMessage, Part, PartContent};
use super::CRLF;

/// Body lines that would read as an mbox separator once quoted.
const FROM_LINE_PATTERN: &str = "^>*From ";

/// Formats messages into an archive sink.
///
/// Holds no per-message state, so one formatter can serve any number of
/// messages and threads.
#[derive(Debug, Clone)]
pub struct MboxFormatter {
    from_line: Option<Regex>,
}

impl MboxFormatter {
    /// With `escape_from_lines`, body lines matching `^>*From ` get one
    /// extra `>` (mboxrd quoting).
    pub fn new(escape_from_lines: bool) -> std::result::Result<Self, regex::Error> {
        let from_line = if escape_from_lines {
            Some(Regex::new(FROM_LINE_PATTERN)?)
        } else {
            None
        };
        Ok(Self { from_line })
    }

    pub fn format_message<W: Write>(&self, msg: &ParsedMessage, sink: &mut W) -> Result<()> {
        let from = msg.header("From").ok_or(ArchiveError::MissingHeader("From"))?;
        let date = msg.header("Date").ok_or(ArchiveError::MissingHeader("Date"))?;

        write!(sink, "From {from} {date}{CRLF}")?;
        write_fields(&msg.headers, sink)?;
        sink.flush()?;

        let boundary = message_boundary(&msg.headers);
        debug!(
            "formatting message from {} with {} part(s), boundary {:?}",
            from,
            msg.parts.len(),
            boundary
        );

        for part in &msg.parts {
            self.format_part(boundary.as_deref(), part, sink)?;
            sink.flush()?;
        }

        match &boundary {
            Some(marker) => write!(sink, "{marker}--{CRLF}{CRLF}")?,
            // inline bodies already end in a blank line, attachment lines do not
            None if matches!(msg.parts.last(), Some(Part::Attachment(_))) => {
                sink.write_all(CRLF.as_bytes())?
            }
            None => {}
        }
        sink.flush()?;
        Ok(())
    }

    fn format_part<W: Write>(&self, boundary: Option<&str>, part: &Part, sink: &mut W) -> Result<()> {
        let content = part.content();
        // a single-part message has its body right after the top-level block
        if boundary.is_some() || !content.headers.is_empty() {
            emit_headers(boundary.unwrap_or_default(), &content.headers, sink)?;
        }

        match part {
            Part::Inline(content) => {
                let text = std::str::from_utf8(&content.payload)
                    .map_err(|_| ArchiveError::NonUtf8Body)?;
                self.write_text(text, sink)?;
                sink.write_all(CRLF.as_bytes())?;
            }
            Part::Attachment(content) => self.write_attachment(content, sink)?,
        }
        Ok(())
    }

    fn write_text<W: Write>(&self, text: &str, sink: &mut W) -> Result<()> {
        match &self.from_line {
            Some(pattern) => {
                for line in fold_lines_quoting(text, |line| pattern.is_match(line.as_bytes())) {
                    line.write_to(sink)?;
                }
            }
            None => fold_body(text, sink)?,
        }
        Ok(())
    }

    fn write_attachment<W: Write>(&self, content: &PartContent, sink: &mut W) -> Result<()> {
        let encoding = TransferEncoding::parse(content.transfer_encoding.as_deref());
        let lines = encoding.encode_lines(&content.payload).map_err(|err| {
            warn!(
                "cannot re-encode {} attachment ({}): {}",
                content.content_type,
                first_value(&content.headers, "Content-Disposition").unwrap_or("no disposition"),
                err
            );
            err
        })?;

        for line in lines {
            self.write_raw_line(&line, sink)?;
        }
        Ok(())
    }

    fn write_raw_line<W: Write>(&self, line: &[u8], sink: &mut W) -> Result<()> {
        if let Some(pattern) = &self.from_line {
            if pattern.is_match(line) {
                sink.write_all(b">")?;
            }
        }
        sink.write_all(line)?;
        sink.write_all(CRLF.as_bytes())?;
        Ok(())
    }
}
