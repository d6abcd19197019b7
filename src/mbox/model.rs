/// A single `key: value` header line, unfolded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeaderField {
    pub key: String,
    pub value: String,
}

impl HeaderField {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }

    /// Header names compare case-insensitively.
    pub fn is(&self, name: &str) -> bool {
        self.key.eq_ignore_ascii_case(name)
    }
}

/// Body content carried by one MIME part.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PartContent {
    pub headers: Vec<HeaderField>,
    pub content_type: String,
    pub transfer_encoding: Option<String>,
    pub payload: Vec<u8>,
}

/// One MIME part, either shown in place or carried as a file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Part {
    Inline(PartContent),
    Attachment(PartContent),
}

impl Part {
    pub fn content(&self) -> &PartContent {
        match self {
            Part::Inline(content) | Part::Attachment(content) => content,
        }
    }
}

/// A message as handed to the formatter: top-level headers in their
/// original order (duplicates kept) plus the flattened list of parts.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedMessage {
    pub headers: Vec<HeaderField>,
    pub parts: Vec<Part>,
}

impl ParsedMessage {
    /// First value of the named header.
    pub fn header(&self, name: &str) -> Option<&str> {
        first_value(&self.headers, name)
    }
}

pub(crate) fn first_value<'a>(fields: &'a [HeaderField], name: &str) -> Option<&'a str> {
    fields
        .iter()
        .find(|field| field.is(name))
        .map(|field| field.value.as_str())
}
