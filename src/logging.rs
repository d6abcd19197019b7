use anyhow::Result;
use log::LevelFilter;

pub fn parse_level(level: &str) -> LevelFilter {
    level.parse().unwrap_or(LevelFilter::Info)
}

// Logs go to stderr so stdout stays clean for archive output. The
// dispatch passes everything; `set_level` adjusts the global filter once
// the configured level is known.
pub fn setup_logging(level: LevelFilter) -> Result<()> {
    fern::Dispatch::new()
        .format(|out, message, record| {
            out.finish(format_args!(
                "[{} {} {}] {}",
                chrono::Local::now().format("%Y-%m-%d %H:%M:%S"),
                record.level(),
                record.target(),
                message
            ))
        })
        .level(LevelFilter::Trace)
        .level_for("async_imap", LevelFilter::Warn)
        .chain(std::io::stderr())
        .apply()?;
    set_level(level);
    Ok(())
}

pub fn set_level(level: LevelFilter) {
    log::set_max_level(level);
}
