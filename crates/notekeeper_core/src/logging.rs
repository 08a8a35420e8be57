//! Client logging bootstrap.
//!
//! # Responsibility
//! - Start the `flexi_logger` backend once per process, to stderr or to a
//!   rolling file set.
//! - Capture panics as sanitized diagnostic events.
//!
//! # Invariants
//! - Initialization is idempotent for an identical level + target.
//! - A second initialization with a different level or target is rejected.
//! - Initialization never panics.
//! - Log lines carry metadata only (`event=... module=... status=...`), never
//!   note titles or bodies.

use flexi_logger::{Cleanup, Criterion, FileSpec, Logger, LoggerHandle, Naming, WriteMode};
use log::{error, info};
use once_cell::sync::OnceCell;
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};

const LOG_FILE_BASENAME: &str = "notekeeper";
const ROTATE_AT_BYTES: u64 = 5 * 1024 * 1024;
const KEEP_LOG_FILES: usize = 5;
const PANIC_SUMMARY_MAX_CHARS: usize = 200;

static ACTIVE: OnceCell<ActiveLogger> = OnceCell::new();
static PANIC_HOOK: OnceCell<()> = OnceCell::new();

/// Where log records go.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogTarget {
    Stderr,
    /// Rolling files inside an absolute directory.
    Directory(PathBuf),
}

impl LogTarget {
    /// Parses an optional directory argument; `None` or blank means stderr.
    pub fn from_dir(dir: Option<&str>) -> Result<Self, String> {
        let Some(raw) = dir.map(str::trim).filter(|value| !value.is_empty()) else {
            return Ok(Self::Stderr);
        };
        let path = Path::new(raw);
        if !path.is_absolute() {
            return Err(format!("log directory must be absolute, got `{raw}`"));
        }
        Ok(Self::Directory(path.to_path_buf()))
    }
}

impl Display for LogTarget {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Stderr => f.write_str("stderr"),
            Self::Directory(dir) => write!(f, "{}", dir.display()),
        }
    }
}

struct ActiveLogger {
    level: &'static str,
    target: LogTarget,
    _handle: LoggerHandle,
}

/// Starts logging at `level` (`trace|debug|info|warn|error`) into `target`.
///
/// # Errors
/// - Unknown level.
/// - Directory cannot be created or the backend fails to start.
/// - Logging already runs with a different level or target.
pub fn init_logging(level: &str, target: LogTarget) -> Result<(), String> {
    let level = parse_level(level)?;

    if let Some(active) = ACTIVE.get() {
        return ensure_same(active, level, &target);
    }

    let active = ACTIVE.get_or_try_init(|| start_backend(level, target.clone()))?;
    ensure_same(active, level, &target)
}

/// Returns the active `(level, target)`, or `None` before initialization.
pub fn logging_status() -> Option<(&'static str, LogTarget)> {
    ACTIVE
        .get()
        .map(|active| (active.level, active.target.clone()))
}

/// `debug` for debug builds, `info` otherwise.
pub fn default_log_level() -> &'static str {
    if cfg!(debug_assertions) {
        "debug"
    } else {
        "info"
    }
}

fn start_backend(level: &'static str, target: LogTarget) -> Result<ActiveLogger, String> {
    let logger = Logger::try_with_str(level)
        .map_err(|err| format!("invalid log level `{level}`: {err}"))?;

    let logger = match &target {
        LogTarget::Stderr => logger
            .log_to_stderr()
            .format_for_stderr(flexi_logger::detailed_format),
        LogTarget::Directory(dir) => {
            std::fs::create_dir_all(dir).map_err(|err| {
                format!("failed to create log directory `{}`: {err}", dir.display())
            })?;
            logger
                .log_to_file(
                    FileSpec::default()
                        .directory(dir.as_path())
                        .basename(LOG_FILE_BASENAME),
                )
                .rotate(
                    Criterion::Size(ROTATE_AT_BYTES),
                    Naming::Numbers,
                    Cleanup::KeepLogFiles(KEEP_LOG_FILES),
                )
                .write_mode(WriteMode::BufferAndFlush)
                .append()
                .format_for_files(flexi_logger::detailed_format)
        }
    };

    let handle = logger
        .start()
        .map_err(|err| format!("failed to start logger: {err}"))?;

    install_panic_hook();
    info!(
        "event=client_start module=logging status=ok level={level} target={target} version={}",
        env!("CARGO_PKG_VERSION")
    );

    Ok(ActiveLogger {
        level,
        target,
        _handle: handle,
    })
}

fn ensure_same(active: &ActiveLogger, level: &str, target: &LogTarget) -> Result<(), String> {
    if active.target != *target {
        return Err(format!(
            "logging already writes to `{}`; refusing to switch to `{target}`",
            active.target
        ));
    }
    if active.level != level {
        return Err(format!(
            "logging already runs at `{}`; refusing to switch to `{level}`",
            active.level
        ));
    }
    Ok(())
}

fn parse_level(level: &str) -> Result<&'static str, String> {
    match level.trim().to_ascii_lowercase().as_str() {
        "trace" => Ok("trace"),
        "debug" => Ok("debug"),
        "info" => Ok("info"),
        "warn" | "warning" => Ok("warn"),
        "error" => Ok("error"),
        other => Err(format!(
            "unsupported log level `{other}`; expected trace|debug|info|warn|error"
        )),
    }
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
            .unwrap_or_else(|| "non-string panic payload".to_string());
        error!(
            "event=panic module=logging status=error location={location} payload={}",
            one_line(&payload, PANIC_SUMMARY_MAX_CHARS)
        );
        previous(info);
    }));
}

/// Flattens newlines and caps length so one record stays on one line.
fn one_line(value: &str, max_chars: usize) -> String {
    let flat = value.replace(['\n', '\r'], " ");
    if flat.chars().count() <= max_chars {
        return flat;
    }
    let mut cut: String = flat.chars().take(max_chars).collect();
    cut.push_str("...");
    cut
}
