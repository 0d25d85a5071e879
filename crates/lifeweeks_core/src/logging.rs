//! Rolling file logs for the core.
//!
//! # Responsibility
//! - Start one `flexi_logger` file logger per process.
//! - Route panics into the log before the default hook runs.
//!
//! # Invariants
//! - Log lines carry metadata only (week numbers, counts, durations); journal
//!   and todo text never reach a log macro.
//! - A second init with the same level and directory is a no-op; any other
//!   second init is rejected.
//! - Nothing here panics.

use crate::config::CoreConfig;
use flexi_logger::{Cleanup, Criterion, FileSpec, Logger, LoggerHandle, Naming, WriteMode};
use log::{error, info};
use once_cell::sync::OnceCell;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};
use std::str::FromStr;

const LOG_FILE_BASENAME: &str = "lifeweeks";
const ROTATE_AT_BYTES: u64 = 10 * 1024 * 1024;
const KEEP_LOG_FILES: usize = 5;
const PANIC_PAYLOAD_LIMIT: usize = 160;

static ACTIVE: OnceCell<ActiveLogger> = OnceCell::new();
static PANIC_HOOK: OnceCell<()> = OnceCell::new();

/// Severity threshold accepted by [`init_logging`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl LogLevel {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Trace => "trace",
            Self::Debug => "debug",
            Self::Info => "info",
            Self::Warn => "warn",
            Self::Error => "error",
        }
    }
}

impl FromStr for LogLevel {
    type Err = LoggingError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "trace" => Ok(Self::Trace),
            "debug" => Ok(Self::Debug),
            "info" => Ok(Self::Info),
            "warn" | "warning" => Ok(Self::Warn),
            "error" => Ok(Self::Error),
            _ => Err(LoggingError::UnknownLevel(raw.trim().to_string())),
        }
    }
}

impl Display for LogLevel {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, PartialEq, Eq)]
pub enum LoggingError {
    UnknownLevel(String),
    RelativeLogDir(PathBuf),
    CreateDir { dir: PathBuf, message: String },
    Backend(String),
    /// Logging already runs with different settings.
    Conflict {
        active_level: LogLevel,
        active_dir: PathBuf,
    },
}

impl Display for LoggingError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UnknownLevel(raw) => write!(
                f,
                "unsupported log level `{raw}`; expected trace|debug|info|warn|error"
            ),
            Self::RelativeLogDir(dir) => {
                write!(f, "log directory must be absolute: `{}`", dir.display())
            }
            Self::CreateDir { dir, message } => {
                write!(f, "cannot create log directory `{}`: {message}", dir.display())
            }
            Self::Backend(message) => write!(f, "logger start failed: {message}"),
            Self::Conflict {
                active_level,
                active_dir,
            } => write!(
                f,
                "logging already active at `{}` with level `{active_level}`",
                active_dir.display()
            ),
        }
    }
}

impl Error for LoggingError {}

struct ActiveLogger {
    level: LogLevel,
    dir: PathBuf,
    _handle: LoggerHandle,
}

impl ActiveLogger {
    fn ensure_same(&self, level: LogLevel, dir: &Path) -> Result<(), LoggingError> {
        if self.level == level && self.dir == dir {
            return Ok(());
        }
        Err(LoggingError::Conflict {
            active_level: self.level,
            active_dir: self.dir.clone(),
        })
    }
}

/// Starts rolling file logs under `log_dir`.
///
/// # Errors
/// - `UnknownLevel` / `RelativeLogDir` for bad arguments.
/// - `CreateDir` / `Backend` when the logger cannot start.
/// - `Conflict` when logging already runs with other settings.
pub fn init_logging(level: &str, log_dir: &Path) -> Result<(), LoggingError> {
    let level = level.parse::<LogLevel>()?;
    if !log_dir.is_absolute() {
        return Err(LoggingError::RelativeLogDir(log_dir.to_path_buf()));
    }

    if let Some(active) = ACTIVE.get() {
        return active.ensure_same(level, log_dir);
    }
    ACTIVE
        .get_or_try_init(|| start_logger(level, log_dir))?
        .ensure_same(level, log_dir)
}

/// Starts logging when `config.log_dir` is set.
///
/// Returns whether a logger is now active for this config.
pub fn init_logging_from_config(config: &CoreConfig) -> Result<bool, LoggingError> {
    match config.log_dir.as_deref() {
        Some(dir) => init_logging(&config.log_level, dir).map(|()| true),
        None => Ok(false),
    }
}

/// Level and directory of the running logger, if any.
pub fn logging_status() -> Option<(LogLevel, PathBuf)> {
    ACTIVE.get().map(|active| (active.level, active.dir.clone()))
}

/// `debug` for debug builds, `info` for release builds.
pub fn default_log_level() -> LogLevel {
    if cfg!(debug_assertions) {
        LogLevel::Debug
    } else {
        LogLevel::Info
    }
}

fn start_logger(level: LogLevel, dir: &Path) -> Result<ActiveLogger, LoggingError> {
    std::fs::create_dir_all(dir).map_err(|err| LoggingError::CreateDir {
        dir: dir.to_path_buf(),
        message: err.to_string(),
    })?;

    let handle = Logger::try_with_str(level.as_str())
        .map_err(|err| LoggingError::Backend(err.to_string()))?
        .log_to_file(FileSpec::default().directory(dir).basename(LOG_FILE_BASENAME))
        .rotate(
            Criterion::Size(ROTATE_AT_BYTES),
            Naming::Numbers,
            Cleanup::KeepLogFiles(KEEP_LOG_FILES),
        )
        .write_mode(WriteMode::BufferAndFlush)
        .append()
        .format_for_files(flexi_logger::detailed_format)
        .start()
        .map_err(|err| LoggingError::Backend(err.to_string()))?;

    install_panic_hook();
    info!(
        "event=core_init module=logging status=ok os={} debug_build={} version={} level={} log_dir={}",
        std::env::consts::OS,
        cfg!(debug_assertions),
        env!("CARGO_PKG_VERSION"),
        level,
        dir.display()
    );

    Ok(ActiveLogger {
        level,
        dir: dir.to_path_buf(),
        _handle: handle,
    })
}

fn install_panic_hook() {
    if PANIC_HOOK.set(()).is_err() {
        return;
    }
    let previous = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        let location = info
            .location()
            .map(|loc| format!("{}:{}", loc.file(), loc.line()))
            .unwrap_or_else(|| "unknown".to_string());
        let payload = info
            .payload()
            .downcast_ref::<&str>()
            .map(|message| (*message).to_string())
            .or_else(|| info.payload().downcast_ref::<String>().cloned())
            .unwrap_or_else(|| "non-string payload".to_string());
        error!(
            "event=panic module=logging status=error location={location} payload={}",
            one_line(&payload, PANIC_PAYLOAD_LIMIT)
        );
        previous(info);
    }));
}

/// Flattens `text` to one line of at most `limit` chars plus an ellipsis.
fn one_line(text: &str, limit: usize) -> String {
    let flat = text.replace(['\n', '\r'], " ");
    if flat.chars().count() <= limit {
        return flat;
    }
    let mut cut: String = flat.chars().take(limit).collect();
    cut.push_str("...");
    cut
}
