use std::env;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result, bail};
use env_logger::Env;
use otty_remote_fs::listing::{
    FileTypeClassifier, Row, format_size, format_time,
};
use otty_remote_fs::{
    BrowserConfig, BrowserEffect, BrowserOrchestrator, BrowserSession,
    ChannelConfig, SftpTransport,
};

const REPLY_TIMEOUT: Duration = Duration::from_secs(30);
const USAGE: &str = "usage: otty-remote-ls <config.json> [path]";

fn main() -> Result<()> {
    env_logger::Builder::from_env(Env::default().default_filter_or("info"))
        .format_timestamp_millis()
        .init();

    let mut args = env::args().skip(1);
    let Some(config_path) = args.next().map(PathBuf::from) else {
        bail!(USAGE);
    };
    let target = args.next();

    let config = BrowserConfig::load(&config_path).with_context(|| {
        format!("failed to load {}", config_path.display())
    })?;
    let Some(sftp) = &config.sftp else {
        bail!("{} has no sftp section", config_path.display());
    };

    let channels = ChannelConfig::from(&config);
    let (transport, replies) = SftpTransport::connect(sftp, &channels)
        .with_context(|| format!("failed to connect to {}", sftp.address()))?;
    let mut session = BrowserSession::new(
        BrowserOrchestrator::with_config(&config),
        transport,
        replies,
    );

    let mut effects = session.dispatch(BrowserOrchestrator::refresh);
    effects.extend(
        session
            .pump_until_idle(REPLY_TIMEOUT)
            .context("failed to load drive list")?,
    );

    if let Some(path) = target {
        effects.extend(
            session.dispatch(|browser| browser.set_current_path(&path)),
        );
        effects.extend(
            session
                .pump_until_idle(REPLY_TIMEOUT)
                .with_context(|| format!("failed to list {path}"))?,
        );
    }

    for effect in &effects {
        match effect {
            BrowserEffect::Error(err) => eprintln!("{err}"),
            BrowserEffect::TransportFailed { message, .. } => {
                bail!("{message}")
            },
            _ => {},
        }
    }

    let browser = session.orchestrator();
    let folder = browser.classifier().directory_type();
    println!("{}", browser.current_path());
    for row in browser.listing().rows() {
        let size = if row.is_directory() {
            String::new()
        } else {
            format_size(row.size())
        };
        let kind = match row {
            Row::Directory(_) => folder.label(),
            Row::File(file) => file.file_type().label(),
        };
        println!(
            "{:<40} {:>10} {:<16} {}",
            row.name(),
            size,
            kind,
            format_time(row.last_write())
        );
    }

    Ok(())
}
