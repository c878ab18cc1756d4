//! Structured logging.
//!
//! # Responsibilities
//! - Install the console subscriber before the startup script runs
//! - Route access events (target `access`) to the access log file
//! - Copy warnings and errors to the error log file
//!
//! # Design Decisions
//! - Two phases: `init_logging` with the base settings, then
//!   `Logging::apply` with the settings the script produced
//! - `RUST_LOG` overrides the level chosen from the debug flag
//! - An empty or unopenable log path falls back to the console
//! - Files are opened in append mode and never rotated

use arc_swap::ArcSwapOption;
use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::sync::Arc;
use tracing_subscriber::{
    filter::{filter_fn, Filtered, LevelFilter},
    fmt::{self, MakeWriter},
    layer::SubscriberExt,
    reload,
    util::SubscriberInitExt,
    EnvFilter, Layer, Registry,
};

use crate::config::RuntimeConfig;

/// Target used for one-line-per-request access events.
pub const ACCESS_TARGET: &str = "access";

type ConsoleLayer = Filtered<fmt::Layer<Registry>, EnvFilter, Registry>;

/// Default console filter directives.
pub fn default_directives(debug: bool, access_to_console: bool) -> String {
    let mut directives = if debug {
        "confbridge=debug,tower_http=debug".to_string()
    } else {
        "confbridge=info".to_string()
    };
    if access_to_console {
        directives.push_str(&format!(",{}=info", ACCESS_TARGET));
    }
    directives
}

fn console_filter(debug: bool, access_to_console: bool) -> EnvFilter {
    EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| default_directives(debug, access_to_console).into())
}

fn open_log(path: &str) -> Result<Option<File>, (String, io::Error)> {
    if path.is_empty() {
        return Ok(None);
    }
    OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map(Some)
        .map_err(|e| (path.to_string(), e))
}

/// A log file that can be attached after the subscriber is installed.
/// Writes are dropped while no file is attached.
#[derive(Clone, Default)]
pub struct LogFile {
    file: Arc<ArcSwapOption<File>>,
}

impl LogFile {
    fn attach(&self, file: Option<File>) {
        self.file.store(file.map(Arc::new));
    }

    pub fn is_attached(&self) -> bool {
        self.file.load().is_some()
    }
}

pub struct LogFileWriter(Option<Arc<File>>);

impl Write for LogFileWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match &self.0 {
            Some(file) => (&**file).write(buf),
            None => Ok(buf.len()),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match &self.0 {
            Some(file) => (&**file).flush(),
            None => Ok(()),
        }
    }
}

impl<'a> MakeWriter<'a> for LogFile {
    type Writer = LogFileWriter;

    fn make_writer(&'a self) -> Self::Writer {
        LogFileWriter(self.file.load_full())
    }
}

/// Handle to the installed subscriber.
pub struct Logging {
    console: reload::Handle<ConsoleLayer, Registry>,
    access: LogFile,
    error: LogFile,
    installed: bool,
}

/// Install the global subscriber with console output only.
/// Only the first call installs; later handles are inert.
pub fn init_logging(config: &RuntimeConfig) -> Logging {
    let console: ConsoleLayer = fmt::layer().with_filter(console_filter(config.debug, true));
    let (console_layer, console) = reload::Layer::new(console);
    let access = LogFile::default();
    let error = LogFile::default();

    let installed = tracing_subscriber::registry()
        .with(console_layer)
        .with(
            fmt::layer()
                .with_ansi(false)
                .with_target(false)
                .with_writer(access.clone())
                .with_filter(filter_fn(|meta| meta.target() == ACCESS_TARGET)),
        )
        .with(
            fmt::layer()
                .with_ansi(false)
                .with_writer(error.clone())
                .with_filter(LevelFilter::WARN),
        )
        .try_init()
        .is_ok();

    Logging {
        console,
        access,
        error,
        installed,
    }
}

impl Logging {
    pub fn is_installed(&self) -> bool {
        self.installed
    }

    /// Attach the log files and console level from the final settings.
    pub fn apply(&self, config: &RuntimeConfig) {
        if !self.installed {
            return;
        }

        let mut problems = Vec::new();
        let access_file = open_log(&config.access_log_path).unwrap_or_else(|p| {
            problems.push(p);
            None
        });
        let error_file = open_log(&config.error_log_path).unwrap_or_else(|p| {
            problems.push(p);
            None
        });

        let access_to_console = access_file.is_none();
        self.access.attach(access_file);
        self.error.attach(error_file);

        let filter = console_filter(config.debug, access_to_console);
        if let Err(e) = self.console.modify(|layer| *layer.filter_mut() = filter) {
            tracing::warn!(error = %e, "Cannot update console log level");
        }

        for (path, error) in problems {
            tracing::warn!(path = %path, error = %error, "Cannot open log file, logging to console");
        }
    }
}
