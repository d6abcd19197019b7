//! Soft-wrapping of body text.
//!
//! Logical lines longer than [`MAX_LINE_WIDTH`] are cut into 75-character
//! chunks, each ending in a `=` soft break, the same convention
//! quoted-printable uses. Removing the `=` + CRLF markers gives the
//! original line back.

use std::io::{self, Write};

use super::{CRLF, MAX_LINE_WIDTH};

/// Marker closing a physical line that continues on the next one.
pub const SOFT_BREAK: &str = "=";

/// One physical output line of a folded body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FoldedLine {
    pub text: String,
    pub soft_break: bool,
}

impl FoldedLine {
    pub fn write_to<W: Write>(&self, sink: &mut W) -> io::Result<()> {
        sink.write_all(self.text.as_bytes())?;
        if self.soft_break {
            sink.write_all(SOFT_BREAK.as_bytes())?;
        }
        sink.write_all(CRLF.as_bytes())
    }
}

/// Splits `text` into physical lines. Both CRLF and bare LF end a logical
/// line; widths are counted in chars so multi-byte text is never split
/// mid-character.
pub fn fold_lines(text: &str) -> Vec<FoldedLine> {
    fold_lines_quoting(text, |_| false)
}

/// Like [`fold_lines`], but every physical line for which `needs_quote`
/// holds gets a leading `>`. The quote counts toward the line width.
pub fn fold_lines_quoting<F>(text: &str, needs_quote: F) -> Vec<FoldedLine>
where
    F: Fn(&str) -> bool,
{
    let mut folded = Vec::new();
    for line in text.lines() {
        fold_line(line, &needs_quote, &mut folded);
    }
    folded
}

fn fold_line<F>(line: &str, needs_quote: &F, out: &mut Vec<FoldedLine>)
where
    F: Fn(&str) -> bool,
{
    let mut rest = line;
    let mut remaining = rest.chars().count();
    loop {
        let quote = if needs_quote(rest) { ">" } else { "" };
        let width = MAX_LINE_WIDTH - quote.len();
        if remaining <= width {
            out.push(FoldedLine {
                text: format!("{quote}{rest}"),
                soft_break: false,
            });
            return;
        }

        let take = width - SOFT_BREAK.len();
        let split = rest
            .char_indices()
            .nth(take)
            .map_or(rest.len(), |(idx, _)| idx);
        let (chunk, tail) = rest.split_at(split);
        out.push(FoldedLine {
            text: format!("{quote}{chunk}"),
            soft_break: true,
        });
        rest = tail;
        remaining -= take;
    }
}

/// Writes the folded form of `text` to the sink.
pub fn fold_body<W: Write>(text: &str, sink: &mut W) -> io::Result<()> {
    for line in fold_lines(text) {
        line.write_to(sink)?;
    }
    Ok(())
}

/// Reverses [`fold_body`]: soft breaks are removed and the remaining
/// line terminators are kept as CRLF.
#[cfg(test)]
pub fn unfold(folded: &str) -> String {
    folded.replace("=\r\n", "")
}
