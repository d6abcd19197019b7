//! Multipart boundary lookup.
//!
//! A `Content-Type` value is read as a media type followed by a
//! `;`-separated parameter list. Parameter names are case-insensitive,
//! values may be quoted or split into RFC 2231 continuations. The lookup
//! goes through `mailparse`, the same parser that located the parts.

use mailparse::parse_content_type;

use super::model::HeaderField;

/// Splits a header value on `;`, ignoring separators inside quoted strings.
/// Used to fold long header lines.
pub fn split_parameters(value: &str) -> Vec<&str> {
    let mut segments = Vec::new();
    let mut in_quotes = false;
    let mut escaped = false;
    let mut start = 0;

    for (idx, ch) in value.char_indices() {
        match ch {
            _ if escaped => escaped = false,
            '\\' if in_quotes => escaped = true,
            '"' => in_quotes = !in_quotes,
            ';' if !in_quotes => {
                segments.push(&value[start..idx]);
                start = idx + 1;
            }
            _ => {}
        }
    }
    segments.push(&value[start..]);
    segments
}

/// Returns `--<boundary>` when the value declares a boundary parameter,
/// otherwise an empty string.
pub fn extract_boundary(field_value: &str) -> String {
    match parse_content_type(field_value).params.get("boundary") {
        Some(boundary) if !boundary.is_empty() => format!("--{boundary}"),
        _ => String::new(),
    }
}

/// Scans the top-level `Content-Type` fields; the last one declaring a
/// boundary wins.
pub fn message_boundary(fields: &[HeaderField]) -> Option<String> {
    fields
        .iter()
        .filter(|field| field.is("Content-Type"))
        .map(|field| extract_boundary(&field.value))
        .filter(|marker| !marker.is_empty())
        .last()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quoted_boundary() {
        let marker = extract_boundary(r#"multipart/mixed; boundary="XYZ123""#);
        assert!(marker.starts_with("--"));
        assert!(marker.contains("XYZ123"));
        assert_eq!(marker, "--XYZ123");
    }

    #[test]
    fn test_unquoted_boundary_and_case() {
        assert_eq!(
            extract_boundary("multipart/alternative; charset=utf-8; BOUNDARY=abc-42"),
            "--abc-42"
        );
    }

    #[test]
    fn test_boundary_split_into_continuations() {
        assert_eq!(
            extract_boundary(r#"multipart/mixed; boundary*0="part-"; boundary*1="two""#),
            "--part-two"
        );
    }

    #[test]
    fn test_split_parameters_respects_quotes() {
        assert_eq!(
            split_parameters(r#"attachment; filename="a;b.txt"; size=3"#),
            vec!["attachment", r#" filename="a;b.txt""#, " size=3"]
        );
    }

    #[test]
    fn test_no_boundary() {
        assert_eq!(extract_boundary("text/plain; charset=utf-8"), "");
        assert_eq!(extract_boundary("text/plain"), "");
        assert_eq!(extract_boundary(r#"multipart/mixed; boundary="""#), "");
    }

    #[test]
    fn test_message_boundary_only_reads_content_type() {
        let fields = vec![
            HeaderField::new("X-Note", r#"foo; boundary="wrong""#),
            HeaderField::new("Content-Type", r#"multipart/mixed; boundary="first""#),
            HeaderField::new("content-type", r#"multipart/mixed; boundary="second""#),
            HeaderField::new("Content-Type", "text/plain"),
        ];

        assert_eq!(message_boundary(&fields), Some("--second".to_string()));
        assert_eq!(message_boundary(&fields[..1]), None);
    }
}
