//! Logger setup: bare messages on stdout, optionally teed to a plain-text
//! log file.

use std::fs::File;
use std::io::{self, Write};
use std::path::Path;

use log::LevelFilter;

use crate::error::CliError;

/// Writes to stdout and, when set, to a file with ANSI escapes removed.
struct TeeWriter {
    file: Option<File>,
}

impl Write for TeeWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        io::stdout().write_all(buf)?;
        if let Some(file) = self.file.as_mut() {
            file.write_all(&strip_ansi_escapes::strip(buf))?;
        }
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        io::stdout().flush()?;
        if let Some(file) = self.file.as_mut() {
            file.flush()?;
        }
        Ok(())
    }
}

/// Install the global logger.
///
/// `quiet` keeps warnings and errors only; `verbose` adds debug messages
/// and prefixes every line with a timestamp and level. `RUST_LOG` still
/// overrides the level.
pub(crate) fn init(quiet: bool, verbose: bool, logfile: Option<&Path>) -> Result<(), CliError> {
    let level = if quiet {
        LevelFilter::Warn
    } else if verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };

    let file = logfile
        .map(File::create)
        .transpose()
        .map_err(|e| CliError::logging(format!("cannot open log file: {}", e)))?;

    let mut builder = env_logger::Builder::new();
    builder
        .filter_level(level)
        .parse_default_env()
        .write_style(env_logger::WriteStyle::Never)
        .target(env_logger::Target::Pipe(Box::new(TeeWriter { file })));

    if verbose {
        builder.format(|buf, record| {
            writeln!(
                buf,
                "{} {:<5} {}",
                chrono::Local::now().format("%H:%M:%S%.3f"),
                record.level(),
                record.args()
            )
        });
    } else {
        builder.format(|buf, record| writeln!(buf, "{}", record.args()));
    }

    builder.try_init().map_err(|e| CliError::logging(e.to_string()))
}

/// Empty line through the logger, so it also lands in the log file.
pub(crate) fn log_blank() {
    log::info!("");
}
