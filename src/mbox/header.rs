//! Header block output.

use std::io::{self, Write};

use super::boundary::split_parameters;
use super::model::HeaderField;
use super::CRLF;

/// Writes one field as `key: value`. Each `;` outside a quoted string
/// ends the physical line and the next parameter continues on a
/// tab-indented line.
pub fn write_field<W: Write>(field: &HeaderField, sink: &mut W) -> io::Result<()> {
    let segments = split_parameters(&field.value);
    let last = segments.len() - 1;

    write!(sink, "{}: ", field.key)?;
    for (idx, segment) in segments.into_iter().enumerate() {
        if idx == 0 {
            sink.write_all(segment.as_bytes())?;
        } else {
            write!(sink, "\t{}", segment.trim_start())?;
        }
        if idx < last {
            sink.write_all(b";")?;
        }
        sink.write_all(CRLF.as_bytes())?;
    }
    Ok(())
}

/// Writes every field in order followed by the blank separator line.
pub fn write_fields<W: Write>(fields: &[HeaderField], sink: &mut W) -> io::Result<()> {
    for field in fields {
        write_field(field, sink)?;
    }
    sink.write_all(CRLF.as_bytes())
}

/// Writes a part header block: the boundary marker line, the fields and
/// the blank line. Output is flushed once the block is complete.
pub fn emit_headers<W: Write>(
    boundary_marker: &str,
    fields: &[HeaderField],
    sink: &mut W,
) -> io::Result<()> {
    write!(sink, "{boundary_marker}{CRLF}")?;
    write_fields(fields, sink)?;
    sink.flush()
}
