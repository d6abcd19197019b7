use anyhow::{Context, Result};
use futures::StreamExt;
use std::fs::{self, OpenOptions};
use std::io::{self, BufWriter, Write};
use std::path::Path;
use log::{error, info, warn};

use crate::mbox::{MboxFormatter, ParsedMessage};
use crate::settings::Config;

pub mod encryption;
pub mod message;
pub mod imap;
pub mod display;

const DEFAULT_LIST_COUNT: u32 = 10;

fn formatter(config: &Config) -> Result<MboxFormatter> {
    Ok(MboxFormatter::new(config.archive.escape_from_lines)?)
}

fn open_output(path: Option<&Path>) -> Result<Box<dyn Write>> {
    Ok(match path {
        Some(path) => {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("cannot open archive {}", path.display()))?;
            Box::new(BufWriter::new(file))
        }
        None => Box::new(io::stdout().lock()),
    })
}

// Formats into memory first so a failing message leaves nothing behind
pub fn append_message<W: Write>(
    formatter: &MboxFormatter,
    message: &ParsedMessage,
    sink: &mut W,
) -> Result<()> {
    let mut buffer = Vec::new();
    formatter.format_message(message, &mut buffer)?;
    sink.write_all(&buffer)?;
    sink.flush()?;
    Ok(())
}

pub async fn show_mailboxes(config: &Config, account: &str) -> Result<()> {
    let mut session = imap::connect(config, account).await?;
    let mailboxes = imap::list_mailboxes(&mut session).await?;

    let mut out = io::stdout().lock();
    for name in &mailboxes {
        writeln!(out, "{}", name)?;
    }

    // Be nice to the server and log out
    session.logout().await?;
    Ok(())
}

pub async fn show_mailbox(config: &Config, account: &str, mailbox: &str) -> Result<()> {
    let mut session = imap::connect(config, account).await?;
    let info = imap::select_mailbox(&mut session, mailbox).await?;
    display::display_pretty(&mut io::stdout().lock(), &info)?;
    session.logout().await?;
    Ok(())
}

pub async fn list_messages(
    config: &Config,
    account: &str,
    mailbox: &str,
    from: Option<u32>,
    to: Option<u32>,
) -> Result<()> {
    let mut session = imap::connect(config, account).await?;
    let info = imap::select_mailbox(&mut session, mailbox).await?;
    if info.exists == 0 {
        warn!("{} is empty", mailbox);
        session.logout().await?;
        return Ok(());
    }

    let (default_from, default_to) = imap::calculate_message_range(info.exists, DEFAULT_LIST_COUNT);
    let from = from.unwrap_or(default_from);
    let to = to.unwrap_or(default_to);

    {
        let summaries = imap::fetch_message_range(&mut session, from, to).await?;
        let mut summaries = Box::pin(summaries);
        let mut out = io::stdout().lock();
        while let Some(summary) = summaries.next().await {
            display::display_json_line(&mut out, &summary?)?;
        }
    }

    session.logout().await?;
    Ok(())
}

pub async fn fetch_message(
    config: &Config,
    account: &str,
    mailbox: &str,
    sequence: u32,
    output: Option<&Path>,
) -> Result<()> {
    let formatter = formatter(config)?;
    let mut session = imap::connect(config, account).await?;
    imap::select_mailbox(&mut session, mailbox).await?;

    let message = imap::fetch_one_message(&mut session, sequence).await?;
    append_message(&formatter, &message, &mut open_output(output)?)?;

    session.logout().await?;
    Ok(())
}

// Appends every message of the range to the archive; failures are logged
// and skipped so one broken message does not stop the export
pub async fn export_mailbox(
    config: &Config,
    account: &str,
    mailbox: &str,
    from: Option<u32>,
    to: Option<u32>,
    output: &Path,
) -> Result<()> {
    let formatter = formatter(config)?;
    let mut session = imap::connect(config, account).await?;
    let info = imap::select_mailbox(&mut session, mailbox).await?;

    let from = from.unwrap_or(1);
    let to = to.unwrap_or(info.exists).min(info.exists);
    let mut archive = open_output(Some(output))?;

    let (mut written, mut failed) = (0u32, 0u32);
    for sequence in from..=to {
        let result = imap::fetch_one_message(&mut session, sequence)
            .await
            .and_then(|message| append_message(&formatter, &message, &mut archive));
        match result {
            Ok(()) => written += 1,
            Err(e) => {
                failed += 1;
                error!("message {} skipped: {:#}", sequence, e);
            }
        }
    }

    info!("-- {} messages written to {}, {} failed", written, output.display(), failed);
    session.logout().await?;
    Ok(())
}

// Offline conversion of a raw RFC 822 file
pub fn format_file(config: &Config, input: &Path, output: Option<&Path>) -> Result<()> {
    let raw = fs::read(input).with_context(|| format!("cannot read {}", input.display()))?;
    let message = message::parse_message(&raw)?;
    append_message(&formatter(config)?, &message, &mut open_output(output)?)?;
    Ok(())
}
