#[cfg(test)]
mod tests {

    use crate::mail_reader::append_message;
    use crate::mail_reader::message::parse_message;
    use crate::mbox::{ArchiveError, HeaderField, MboxFormatter, ParsedMessage, Part};
    use crate::mbox::model::PartContent;
    use base64::{engine::general_purpose::STANDARD as BASE64, Engine};

    const REPORT: &str = concat!(
        "From: Alice <alice@example.com>\r\n",
        "To: bob@example.com\r\n",
        "Date: Tue, 2 Jan 2024 09:30:00 +0100\r\n",
        "Subject: Quarterly report\r\n",
        "MIME-Version: 1.0\r\n",
        "Content-Type: multipart/mixed; boundary=\"=_outer\"\r\n",
        "\r\n",
        "--=_outer\r\n",
        "Content-Type: text/plain; charset=utf-8\r\n",
        "Content-Transfer-Encoding: quoted-printable\r\n",
        "\r\n",
        "From the desk of Alice: the numbers are attached.\r\n",
        "--=_outer\r\n",
        "Content-Type: application/pdf; name=\"report.pdf\"\r\n",
        "Content-Disposition: attachment; filename=\"report.pdf\"\r\n",
        "Content-Transfer-Encoding: base64\r\n",
        "\r\n",
        "JVBERi0xLjQKJcOkw7zDtsOfCg==\r\n",
        "--=_outer--\r\n",
    );

    fn archive(raw: &str) -> String {
        let message = parse_message(raw.as_bytes()).unwrap();
        let formatter = MboxFormatter::new(true).unwrap();
        let mut out = Vec::new();
        append_message(&formatter, &message, &mut out).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn test_archive_multipart_report() {
        let out = archive(REPORT);

        assert!(out.starts_with(
            "From Alice <alice@example.com> Tue, 2 Jan 2024 09:30:00 +0100\r\nFrom: Alice"
        ));
        assert!(out.contains("Content-Type: multipart/mixed;\r\n\tboundary=\"=_outer\"\r\n\r\n--=_outer\r\n"));
        assert!(out.contains("\r\n>From the desk of Alice: the numbers are attached.\r\n"));
        assert!(out.contains("Content-Disposition: attachment;\r\n\tfilename=\"report.pdf\"\r\n"));
        assert!(out.ends_with("--=_outer--\r\n\r\n"));
    }

    #[test]
    fn test_archived_attachment_decodes_to_original_bytes() {
        let out = archive(REPORT);

        let encoded: String = out
            .split("Content-Transfer-Encoding: base64\r\n\r\n")
            .nth(1)
            .and_then(|rest| rest.split("--=_outer--").next())
            .unwrap()
            .split("\r\n")
            .collect();
        let decoded = BASE64.decode(encoded).unwrap();
        assert_eq!(decoded, BASE64.decode("JVBERi0xLjQKJcOkw7zDtsOfCg==").unwrap());
    }

    #[test]
    fn test_every_line_is_crlf_terminated() {
        let out = archive(REPORT);
        assert!(out.ends_with("\r\n"));
        assert_eq!(out.matches('\n').count(), out.matches("\r\n").count());
    }

    #[test]
    fn test_long_attachment_lines_are_76_wide() {
        let payload: Vec<u8> = (0..=255u8).cycle().take(1000).collect();
        let message = ParsedMessage {
            headers: vec![
                HeaderField::new("From", "a@b.com"),
                HeaderField::new("Date", "Mon, 1 Jan 2024"),
                HeaderField::new("Content-Type", "multipart/mixed; boundary=zz"),
            ],
            parts: vec![Part::Attachment(PartContent {
                headers: vec![HeaderField::new("Content-Transfer-Encoding", "base64")],
                content_type: "application/octet-stream".to_string(),
                transfer_encoding: Some("base64".to_string()),
                payload: payload.clone(),
            })],
        };

        let mut out = Vec::new();
        let formatter = MboxFormatter::new(false).unwrap();
        append_message(&formatter, &message, &mut out).unwrap();
        let out = String::from_utf8(out).unwrap();

        let body = out
            .split("Content-Transfer-Encoding: base64\r\n\r\n")
            .nth(1)
            .unwrap();
        let lines: Vec<&str> = body
            .split("\r\n")
            .take_while(|line| !line.starts_with("--zz"))
            .collect();
        let (last, full) = lines.split_last().unwrap();
        assert!(full.iter().all(|line| line.len() == 76));
        assert!(last.len() <= 76);
        assert_eq!(BASE64.decode(lines.concat()).unwrap(), payload);
    }

    #[test]
    fn test_failed_message_leaves_sink_untouched() {
        let message = ParsedMessage {
            headers: vec![
                HeaderField::new("From", "a@b.com"),
                HeaderField::new("Date", "Mon, 1 Jan 2024"),
            ],
            parts: vec![Part::Attachment(PartContent {
                headers: vec![HeaderField::new("Content-Transfer-Encoding", "x-custom")],
                content_type: "application/octet-stream".to_string(),
                transfer_encoding: Some("x-custom".to_string()),
                payload: b"payload".to_vec(),
            })],
        };

        let mut out = Vec::new();
        let formatter = MboxFormatter::new(true).unwrap();
        let err = append_message(&formatter, &message, &mut out).unwrap_err();

        assert!(matches!(
            err.downcast_ref::<ArchiveError>(),
            Some(ArchiveError::UnsupportedEncoding(name)) if name == "x-custom"
        ));
        assert!(out.is_empty());
    }

    #[test]
    fn test_single_part_message_archive() {
        let out = archive(concat!(
            "From: a@b.com\r\n",
            "Date: Mon, 1 Jan 2024\r\n",
            "Subject: plain\r\n",
            "\r\n",
            "hello\r\n",
            "world\r\n",
        ));

        assert_eq!(
            out,
            concat!(
                "From a@b.com Mon, 1 Jan 2024\r\n",
                "From: a@b.com\r\n",
                "Date: Mon, 1 Jan 2024\r\n",
                "Subject: plain\r\n",
                "\r\n",
                "hello\r\n",
                "world\r\n",
                "\r\n",
            )
        );
    }

    #[test]
    fn test_latin1_attachment_survives_archiving() {
        let mut raw = concat!(
            "From: a@b.com\r\n",
            "Date: Mon, 1 Jan 2024\r\n",
            "Content-Type: multipart/mixed; boundary=menu\r\n",
            "\r\n",
            "--menu\r\n",
            "Content-Type: text/plain; charset=iso-8859-1\r\n",
            "Content-Disposition: attachment; filename=\"menu.txt\"\r\n",
            "Content-Transfer-Encoding: 8bit\r\n",
            "\r\n",
        )
        .as_bytes()
        .to_vec();
        raw.extend_from_slice(b"caf\xe9\r\n--menu--\r\n");

        let message = parse_message(&raw).unwrap();
        let mut out = Vec::new();
        let formatter = MboxFormatter::new(true).unwrap();
        append_message(&formatter, &message, &mut out).unwrap();

        let expected: &[u8] = b"Content-Transfer-Encoding: 8bit\r\n\r\ncaf\xe9\r\n--menu--\r\n\r\n";
        assert!(out.ends_with(expected));
    }

    #[test]
    fn test_archive_of_two_single_part_attachments() {
        let raw = concat!(
            "From: a@b.com\r\n",
            "Date: Mon, 1 Jan 2024\r\n",
            "Content-Type: application/pdf\r\n",
            "Content-Transfer-Encoding: base64\r\n",
            "\r\n",
            "AAEC\r\n",
        );
        let message = parse_message(raw.as_bytes()).unwrap();
        let formatter = MboxFormatter::new(true).unwrap();
        let mut out = Vec::new();
        append_message(&formatter, &message, &mut out).unwrap();
        append_message(&formatter, &message, &mut out).unwrap();
        let out = String::from_utf8(out).unwrap();

        let entries: Vec<&str> = out.split("\r\n\r\nFrom a@b.com ").collect();
        assert_eq!(entries.len(), 2);
        assert!(entries[0].ends_with("\r\n\r\nAAEC"));
        assert!(out.ends_with("AAEC\r\n\r\n"));
    }
}
