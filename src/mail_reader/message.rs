use mailparse::{parse_mail, DispositionType, MailHeader, ParsedMail};
use log::{debug, warn};

use crate::mbox::{ArchiveError, HeaderField, ParsedMessage, Part};
use crate::mbox::model::PartContent;
use crate::mbox::Result;

// Headers arrive folded; RFC 5322 unfolding drops the CRLF and keeps the
// whitespace that follows it.
fn unfold_value(raw: &[u8]) -> String {
    let unfolded: String = String::from_utf8_lossy(raw)
        .chars()
        .filter(|c| *c != '\r' && *c != '\n')
        .collect();
    unfolded.trim().to_string()
}

fn collect_headers(headers: &[MailHeader]) -> Vec<HeaderField> {
    headers
        .iter()
        .map(|header| HeaderField::new(header.get_key(), unfold_value(header.get_value_raw())))
        .collect()
}

fn is_attachment(part: &ParsedMail) -> bool {
    if part.get_content_disposition().disposition == DispositionType::Attachment {
        return true;
    }
    // anything that is not text cannot be written back as folded lines
    !part.ctype.mimetype.starts_with("text/")
}

fn transfer_encoding(headers: &[HeaderField]) -> Option<String> {
    headers
        .iter()
        .find(|field| field.is("Content-Transfer-Encoding"))
        .map(|field| field.value.trim().to_string())
}

// Inline text is stored decoded, so a base64 or quoted-printable label
// would no longer describe the written body.
fn relabel_decoded_text(headers: &mut [HeaderField]) {
    for field in headers.iter_mut().filter(|f| f.is("Content-Transfer-Encoding")) {
        let value = field.value.trim();
        if value.eq_ignore_ascii_case("base64") || value.eq_ignore_ascii_case("quoted-printable") {
            field.value = "8bit".to_string();
        }
    }
}

fn convert_part(part: &ParsedMail, parts: &mut Vec<Part>) -> Result<()> {
    if part.ctype.mimetype.starts_with("multipart/") {
        for subpart in &part.subparts {
            convert_part(subpart, parts)?;
        }
        return Ok(());
    }

    let mut headers = collect_headers(&part.headers);

    if is_attachment(part) {
        debug!("attachment part {}", part.ctype.mimetype);
        parts.push(Part::Attachment(PartContent {
            transfer_encoding: transfer_encoding(&headers),
            headers,
            content_type: part.ctype.mimetype.clone(),
            payload: part.get_body_raw()?,
        }));
        return Ok(());
    }

    relabel_decoded_text(&mut headers);
    parts.push(Part::Inline(PartContent {
        transfer_encoding: transfer_encoding(&headers),
        headers,
        content_type: part.ctype.mimetype.clone(),
        payload: part.get_body()?.into_bytes(),
    }));
    Ok(())
}

/// Parses a raw RFC 822 message into the structure the formatter reads.
///
/// Multipart trees are flattened depth-first into leaf parts. A
/// single-part message becomes one part without headers of its own, its
/// content headers staying in the top-level block.
pub fn parse_message(raw: &[u8]) -> Result<ParsedMessage> {
    let parsed_mail = parse_mail(raw)?;
    let mut headers = collect_headers(&parsed_mail.headers);

    let mut parts = Vec::new();
    if parsed_mail.ctype.mimetype.starts_with("multipart/") {
        convert_part(&parsed_mail, &mut parts)?;
        if parts.is_empty() {
            warn!("multipart message without any leaf part");
        }
    } else {
        let content = PartContent {
            headers: Vec::new(),
            content_type: parsed_mail.ctype.mimetype.clone(),
            transfer_encoding: transfer_encoding(&headers),
            payload: Vec::new(),
        };
        let part = if is_attachment(&parsed_mail) {
            Part::Attachment(PartContent {
                payload: parsed_mail.get_body_raw()?,
                ..content
            })
        } else {
            relabel_decoded_text(&mut headers);
            Part::Inline(PartContent {
                transfer_encoding: transfer_encoding(&headers),
                payload: parsed_mail.get_body()?.into_bytes(),
                ..content
            })
        };
        parts.push(part);
    }

    Ok(ParsedMessage { headers, parts })
}

/// Parses the body of an IMAP FETCH response.
pub fn process_message(message: &async_imap::types::Fetch) -> Result<ParsedMessage> {
    let body = message.body().ok_or_else(|| {
        ArchiveError::ParseUnavailable(format!("message {} did not have a body", message.message))
    })?;
    parse_message(body)
}
