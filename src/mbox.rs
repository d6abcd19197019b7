//! mbox archival output for parsed MIME messages.
//!
//! A [`ParsedMessage`] goes in, CRLF-terminated mbox text comes out of an
//! [`MboxFormatter`]. The leaf modules do the line- and byte-level work.

pub mod boundary;
pub mod chunk;
pub mod encoding;
pub mod error;
pub mod fold;
pub mod formatter;
pub mod header;
pub mod model;

pub use error::{ArchiveError, Result};
pub use formatter::MboxFormatter;
pub use model::{HeaderField, ParsedMessage, Part};

/// Line terminator used for every line written to an archive.
pub const CRLF: &str = "\r\n";

/// Longest data portion of a body line.
pub const MAX_LINE_WIDTH: usize = 76;
