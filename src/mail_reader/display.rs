use std::io::Write;

use anyhow::Result;
use serde::Serialize;
use log::error;

// One JSON document per line, so the output can be piped into jq
pub fn display_json_line<T: Serialize, W: Write>(out: &mut W, value: &T) -> Result<()> {
    match serde_json::to_string(value) {
        Ok(json) => writeln!(out, "{}", json)?,
        Err(e) => error!("Error converting to JSON: {}", e),
    }
    Ok(())
}

pub fn display_pretty<T: Serialize, W: Write>(out: &mut W, value: &T) -> Result<()> {
    writeln!(out, "{}", serde_json::to_string_pretty(value)?)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mail_reader::imap::MessageSummary;

    #[test]
    fn test_summary_json_line() {
        let summary = MessageSummary {
            sequence: 7,
            subject: Some("Hi".to_string()),
            from: Some("a@b.com".to_string()),
            date: None,
        };
        let mut out = Vec::new();
        display_json_line(&mut out, &summary).unwrap();

        assert_eq!(
            String::from_utf8(out).unwrap(),
            "{\"sequence\":7,\"subject\":\"Hi\",\"from\":\"a@b.com\",\"date\":null}\n"
        );
    }
}
