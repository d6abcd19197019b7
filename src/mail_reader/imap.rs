use std::borrow::Cow;

use anyhow::{Context, Result};
use async_imap::imap_proto::Address;
use async_imap::types::Fetch;
use async_imap::{Client, Session};
use futures::{Stream, StreamExt, TryStreamExt};
use serde::Serialize;
use tokio::net::TcpStream;
use tokio_util::compat::{Compat, TokioAsyncReadCompatExt};

use crate::mail_reader::encryption;
use crate::mail_reader::message::process_message;
use crate::mbox::ParsedMessage;
use crate::settings::Config;
use log::{debug, info};

pub type ImapSession = Session<Compat<tokio_native_tls::TlsStream<TcpStream>>>;

// Status of a selected mailbox
#[derive(Debug, Clone, Serialize)]
pub struct MailboxInfo {
    pub name: String,
    pub exists: u32,
    pub recent: u32,
    pub unseen: Option<u32>,
    pub flags: Vec<String>,
}

// Envelope data of one message, as listed by `fetch_message_range`
#[derive(Debug, Clone, Default, Serialize)]
pub struct MessageSummary {
    pub sequence: u32,
    pub subject: Option<String>,
    pub from: Option<String>,
    pub date: Option<String>,
}

// Establish a TLS-encrypted connection to the IMAP server
async fn connect_to_server(server: &str, port: u16) -> Result<tokio_native_tls::TlsStream<TcpStream>> {
    let imap_addr = (server, port);
    let tcp_stream = TcpStream::connect(imap_addr).await?;
    let tls = tokio_native_tls::TlsConnector::from(native_tls::TlsConnector::new()?);
    let tls_stream = tls.connect(server, tcp_stream).await?;

    info!("-- connected to {}:{}", server, port);
    Ok(tls_stream)
}

// Login to the IMAP server and return an authenticated session
async fn login_to_server(
    client: Client<Compat<tokio_native_tls::TlsStream<TcpStream>>>,
    username: &str,
    password: &str
) -> Result<ImapSession> {
    let imap_session = client
        .login(username, password)
        .await
        .map_err(|e| e.0)?;

    info!("-- logged in as {}", username);
    Ok(imap_session)
}

// Resolve the named account and open an authenticated session
pub async fn connect(config: &Config, account_name: &str) -> Result<ImapSession> {
    let account = crate::settings::fetch_credentials(config, account_name)?;
    let (username, password) =
        encryption::get_credentials(&config.credentials_dir, account_name, &account)?;

    let tls_stream = connect_to_server(account.server.as_str(), account.port)
        .await
        .with_context(|| format!("cannot connect to {}:{}", account.server, account.port))?;
    let client = Client::new(tls_stream.compat());

    login_to_server(client, &username, &password).await
}

pub async fn list_mailboxes(session: &mut ImapSession) -> Result<Vec<String>> {
    let names: Vec<_> = session.list(Some(""), Some("*")).await?.try_collect().await?;
    let mailboxes: Vec<String> = names.iter().map(|name| name.name().to_string()).collect();
    debug!("-- {} mailboxes listed", mailboxes.len());
    Ok(mailboxes)
}

pub async fn select_mailbox(session: &mut ImapSession, name: &str) -> Result<MailboxInfo> {
    // EXAMINE opens the mailbox read-only, so fetching never sets \Seen
    let mailbox = session.examine(name).await?;
    info!("-- {} selected", name);

    Ok(MailboxInfo {
        name: name.to_string(),
        exists: mailbox.exists,
        recent: mailbox.recent,
        unseen: mailbox.unseen,
        flags: mailbox.flags.iter().map(|flag| format!("{:?}", flag)).collect(),
    })
}

// Calculate the range for fetching the most recent messages
pub fn calculate_message_range(total_messages: u32, count: u32) -> (u32, u32) {
    let start = if total_messages > count { total_messages - count + 1 } else { 1 };
    (start, total_messages)
}

pub async fn fetch_one_message(session: &mut ImapSession, sequence: u32) -> Result<ParsedMessage> {
    let messages: Vec<Fetch> = session
        .fetch(sequence.to_string(), "BODY.PEEK[]")
        .await?
        .try_collect()
        .await?;

    let message = messages
        .iter()
        .find(|fetch| fetch.message == sequence)
        .with_context(|| format!("server returned no message {}", sequence))?;

    Ok(process_message(message)?)
}

fn text(value: &Option<Cow<'_, [u8]>>) -> Option<String> {
    value
        .as_ref()
        .map(|bytes| String::from_utf8_lossy(bytes).into_owned())
}

fn format_address(address: &Address<'_>) -> String {
    let mailbox = text(&address.mailbox).unwrap_or_default();
    let host = text(&address.host).unwrap_or_default();
    match text(&address.name) {
        Some(name) => format!("{} <{}@{}>", name, mailbox, host),
        None => format!("{}@{}", mailbox, host),
    }
}

fn summarize(fetch: &Fetch) -> MessageSummary {
    let Some(envelope) = fetch.envelope() else {
        return MessageSummary {
            sequence: fetch.message,
            ..Default::default()
        };
    };

    MessageSummary {
        sequence: fetch.message,
        subject: text(&envelope.subject),
        from: envelope
            .from
            .as_ref()
            .and_then(|addresses| addresses.first())
            .map(format_address),
        date: text(&envelope.date),
    }
}

// Summaries are produced as the server streams FETCH responses
pub async fn fetch_message_range(
    session: &mut ImapSession,
    from: u32,
    to: u32,
) -> Result<impl Stream<Item = Result<MessageSummary>> + '_> {
    let stream = session.fetch(format!("{}:{}", from, to), "ENVELOPE").await?;
    Ok(stream.map(|fetch| fetch.map(|fetch| summarize(&fetch)).map_err(Into::into)))
}
