//! Process logging bootstrap.
//!
//! # Responsibility
//! - Initialize rolling file logs once per process.
//! - Capture panics as sanitized log events.
//!
//! # Invariants
//! - Log lines carry metadata only (`event=... key=value`), never record
//!   contents such as names, e-mails or salaries.
//! - Initialization is idempotent for identical settings and never panics.
//! - Reconfiguring level or directory after start is rejected.

use flexi_logger::{
    Cleanup, Criterion, FileSpec, LogSpecification, Logger, LoggerHandle, Naming, WriteMode,
};
use log::{error, info, LevelFilter};
use once_cell::sync::OnceCell;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::PathBuf;

const LOG_FILE_BASENAME: &str = "professores";
const ROTATE_AT_BYTES: u64 = 4 * 1024 * 1024;
const KEEP_ROTATED_FILES: usize = 5;
const PANIC_MESSAGE_LIMIT: usize = 200;

static ACTIVE: OnceCell<ActiveLogger> = OnceCell::new();
static PANIC_HOOK: OnceCell<()> = OnceCell::new();

/// Logging bootstrap failure.
#[derive(Debug)]
pub enum LogError {
    UnsupportedLevel(String),
    RelativeDir(PathBuf),
    EmptyDir,
    CreateDir { dir: PathBuf, source: std::io::Error },
    Backend(flexi_logger::FlexiLoggerError),
    /// Logging already runs with different settings.
    AlreadyStarted { active: LogSettings, requested: LogSettings },
}

impl Display for LogError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UnsupportedLevel(level) => write!(
                f,
                "log level `{level}` is not one of trace, debug, info, warn, error"
            ),
            Self::RelativeDir(dir) => {
                write!(f, "log directory must be absolute: `{}`", dir.display())
            }
            Self::EmptyDir => write!(f, "log directory is empty"),
            Self::CreateDir { dir, source } => {
                write!(f, "cannot create log directory `{}`: {source}", dir.display())
            }
            Self::Backend(err) => write!(f, "logger backend failed to start: {err}"),
            Self::AlreadyStarted { active, requested } => write!(
                f,
                "logging already started ({} in `{}`); cannot switch to {} in `{}`",
                active.level,
                active.log_dir.display(),
                requested.level,
                requested.log_dir.display()
            ),
        }
    }
}

impl Error for LogError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::CreateDir { source, .. } => Some(source),
            Self::Backend(err) => Some(err),
            _ => None,
        }
    }
}

/// Validated logging settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogSettings {
    pub level: LevelFilter,
    pub log_dir: PathBuf,
}

impl LogSettings {
    /// Accepts a level name (case-insensitive, `warning` allowed) and an
    /// absolute directory. `off` is refused.
    pub fn parse(level: &str, log_dir: &str) -> Result<Self, LogError> {
        let level_name = level.trim();
        let candidate = if level_name.eq_ignore_ascii_case("warning") {
            "warn"
        } else {
            level_name
        };
        let level = match candidate.parse::<LevelFilter>() {
            Ok(LevelFilter::Off) | Err(_) => {
                return Err(LogError::UnsupportedLevel(level_name.to_string()))
            }
            Ok(level) => level,
        };

        let dir = log_dir.trim();
        if dir.is_empty() {
            return Err(LogError::EmptyDir);
        }
        let log_dir = PathBuf::from(dir);
        if log_dir.is_relative() {
            return Err(LogError::RelativeDir(log_dir));
        }

        Ok(Self { level, log_dir })
    }
}

struct ActiveLogger {
    settings: LogSettings,
    _handle: LoggerHandle,
}

/// Starts rotating file logs at `level` under `log_dir`.
///
/// Calling again with the same settings is a no-op; different settings
/// yield [`LogError::AlreadyStarted`].
pub fn init_logging(level: &str, log_dir: &str) -> Result<(), LogError> {
    let requested = LogSettings::parse(level, log_dir)?;
    let active = ACTIVE.get_or_try_init(|| start(requested.clone()))?;

    if active.settings == requested {
        Ok(())
    } else {
        Err(LogError::AlreadyStarted {
            active: active.settings.clone(),
            requested,
        })
    }
}

/// Returns the active settings, or `None` before [`init_logging`] succeeded.
pub fn logging_status() -> Option<LogSettings> {
    ACTIVE.get().map(|active| active.settings.clone())
}

/// `debug` for debug builds, `info` otherwise.
pub fn default_log_level() -> &'static str {
    if cfg!(debug_assertions) {
        "debug"
    } else {
        "info"
    }
}

fn start(settings: LogSettings) -> Result<ActiveLogger, LogError> {
    std::fs::create_dir_all(&settings.log_dir).map_err(|source| LogError::CreateDir {
        dir: settings.log_dir.clone(),
        source,
    })?;

    let spec = LogSpecification::builder().default(settings.level).build();
    let handle = Logger::with(spec)
        .log_to_file(
            FileSpec::default()
                .directory(&settings.log_dir)
                .basename(LOG_FILE_BASENAME),
        )
        .rotate(
            Criterion::Size(ROTATE_AT_BYTES),
            Naming::Numbers,
            Cleanup::KeepLogFiles(KEEP_ROTATED_FILES),
        )
        .write_mode(WriteMode::BufferAndFlush)
        .append()
        .format_for_files(flexi_logger::detailed_format)
        .start()
        .map_err(LogError::Backend)?;

    if PANIC_HOOK.set(()).is_ok() {
        let chained = std::panic::take_hook();
        std::panic::set_hook(Box::new(move |panic_info| {
            let location = panic_info.location().map_or_else(
                || "unknown".to_string(),
                |loc| format!("{}:{}", loc.file(), loc.line()),
            );
            error!(
                "event=panic module=core status=error location={location} message={}",
                single_line(&panic_message(panic_info), PANIC_MESSAGE_LIMIT)
            );
            chained(panic_info);
        }));
    }

    info!(
        "event=logging_start module=logging status=ok version={} os={} level={} dir={}",
        env!("CARGO_PKG_VERSION"),
        std::env::consts::OS,
        settings.level,
        settings.log_dir.display()
    );

    Ok(ActiveLogger {
        settings,
        _handle: handle,
    })
}

fn panic_message(info: &std::panic::PanicHookInfo<'_>) -> String {
    let payload = info.payload();
    payload
        .downcast_ref::<&str>()
        .map(|message| (*message).to_string())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "<opaque payload>".to_string())
}

/// Collapses line breaks and caps the length at `limit` characters.
fn single_line(value: &str, limit: usize) -> String {
    let mut chars = value.chars().map(|c| if c == '\n' || c == '\r' { ' ' } else { c });
    let mut line: String = chars.by_ref().take(limit).collect();
    if chars.next().is_some() {
        line.push_str("...");
    }
    line
}

#[cfg(test)]
mod tests {
    use super::{init_logging, logging_status, LogError, LogSettings};
    use log::LevelFilter;

    #[test]
    fn parse_accepts_warning_alias_in_any_case() {
        let settings = LogSettings::parse(" WARNING ", "/tmp/professores-logs").unwrap();
        assert_eq!(settings.level, LevelFilter::Warn);
    }

    #[test]
    fn parse_rejects_relative_dir_off_and_unknown_levels() {
        assert!(matches!(
            LogSettings::parse("info", "logs/dev"),
            Err(LogError::RelativeDir(_))
        ));
        assert!(matches!(LogSettings::parse("info", "  "), Err(LogError::EmptyDir)));
        assert!(matches!(
            LogSettings::parse("off", "/tmp"),
            Err(LogError::UnsupportedLevel(_))
        ));
        assert!(matches!(
            LogSettings::parse("verbose", "/tmp"),
            Err(LogError::UnsupportedLevel(_))
        ));
    }

    #[test]
    fn single_line_flattens_and_caps() {
        assert_eq!(super::single_line("a\nb\rc", 10), "a b c");
        assert_eq!(super::single_line("abcdef", 3), "abc...");
        assert_eq!(super::single_line("abc", 3), "abc");
    }

    #[test]
    fn second_init_must_match_first() {
        let first = tempfile::tempdir().unwrap();
        let second = tempfile::tempdir().unwrap();
        let first_dir = first.path().to_str().unwrap().to_string();
        let second_dir = second.path().to_str().unwrap().to_string();

        init_logging("info", &first_dir).unwrap();
        init_logging("INFO", &first_dir).unwrap();

        let err = init_logging("debug", &first_dir).unwrap_err();
        assert!(matches!(err, LogError::AlreadyStarted { .. }));
        let err = init_logging("info", &second_dir).unwrap_err();
        assert!(err.to_string().contains("cannot switch"));

        let active = logging_status().unwrap();
        assert_eq!(active.level, LevelFilter::Info);
        assert_eq!(active.log_dir, first.path());
    }
}
