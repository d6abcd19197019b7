mod logging;
mod mail_reader;
mod mbox;
mod settings;
mod tests;

use std::error::Error;
use std::path::PathBuf;

use clap::{Parser, Subcommand};
use log::LevelFilter;

/// Archive IMAP mailboxes as mbox files.
#[derive(Debug, Parser)]
#[command(name = "mboxer", version)]
struct Cli {
    /// YAML settings with the account definitions
    #[arg(long, default_value = settings::DEFAULT_SETTINGS_PATH)]
    config: PathBuf,

    /// Overrides `log_level` from the settings
    #[arg(long)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// List the mailboxes of an account
    Mailboxes {
        #[arg(short, long)]
        account: String,
    },
    /// Show the status of a mailbox
    Select {
        #[arg(short, long)]
        account: String,
        #[arg(short, long, default_value = "INBOX")]
        mailbox: String,
    },
    /// Print envelope summaries as JSON lines (default: the last 10)
    List {
        #[arg(short, long)]
        account: String,
        #[arg(short, long, default_value = "INBOX")]
        mailbox: String,
        #[arg(long)]
        from: Option<u32>,
        #[arg(long)]
        to: Option<u32>,
    },
    /// Write one message in mbox form
    Fetch {
        #[arg(short, long)]
        account: String,
        #[arg(short, long, default_value = "INBOX")]
        mailbox: String,
        #[arg(short, long)]
        sequence: u32,
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Append a range of messages to an mbox archive
    Export {
        #[arg(short, long)]
        account: String,
        #[arg(short, long, default_value = "INBOX")]
        mailbox: String,
        #[arg(long)]
        from: Option<u32>,
        #[arg(long)]
        to: Option<u32>,
        #[arg(short, long)]
        output: PathBuf,
    },
    /// Convert a raw RFC 822 file without contacting a server
    Format {
        #[arg(short, long)]
        input: PathBuf,
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();
    logging::setup_logging(LevelFilter::Info)?;

    let config = settings::load_settings(&cli.config)?;
    let level = cli.log_level.as_deref().unwrap_or(&config.log_level);
    logging::set_level(logging::parse_level(level));

    match cli.command {
        Command::Mailboxes { account } => mail_reader::show_mailboxes(&config, &account).await?,
        Command::Select { account, mailbox } => {
            mail_reader::show_mailbox(&config, &account, &mailbox).await?
        }
        Command::List { account, mailbox, from, to } => {
            mail_reader::list_messages(&config, &account, &mailbox, from, to).await?
        }
        Command::Fetch { account, mailbox, sequence, output } => {
            mail_reader::fetch_message(&config, &account, &mailbox, sequence, output.as_deref())
                .await?
        }
        Command::Export { account, mailbox, from, to, output } => {
            mail_reader::export_mailbox(&config, &account, &mailbox, from, to, &output).await?
        }
        Command::Format { input, output } => {
            mail_reader::format_file(&config, &input, output.as_deref())?
        }
    }
    Ok(())
}
