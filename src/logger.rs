//! log4rs setup for the library and the CLI.
//!
//! Library code only talks to the `log` facade. Applications pick one of the
//! entry points below; later calls replace the active configuration.

use crate::cache::METRICS_TARGET;
use log::LevelFilter;
use log4rs::Handle;
use log4rs::append::console::{ConsoleAppender, Target};
use log4rs::append::rolling_file::RollingFileAppender;
use log4rs::append::rolling_file::policy::compound::{
    CompoundPolicy, roll::fixed_window::FixedWindowRoller, trigger::size::SizeTrigger,
};
use log4rs::config::{Appender, Config, Logger, Root};
use log4rs::encode::pattern::PatternEncoder;
use std::error::Error;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

const PATTERN: &str = "{d(%Y-%m-%d %H:%M:%S%.3f)} [{l}] {t} - {m}{n}";
const ROLL_BYTES: u64 = 10 * 1024 * 1024;

static HANDLE: OnceLock<Handle> = OnceLock::new();

/// Initializes logging from `log4rs.yaml` in the working directory, if present.
pub fn init() -> Result<(), Box<dyn Error>> {
    let path = Path::new("log4rs.yaml");
    if path.exists() {
        init_path(path)?;
    }
    Ok(())
}

/// Initializes logging from a specific log4rs config file.
pub fn init_path(path: &Path) -> Result<(), Box<dyn Error>> {
    log4rs::init_file(path, log4rs::config::Deserializers::default()).map_err(|e| e.to_string())?;
    Ok(())
}

/// Maps `error|warn|info|debug|trace|off` to a filter; anything else is `Info`.
pub fn parse_level(level: &str) -> LevelFilter {
    match level.trim().to_ascii_lowercase().as_str() {
        "off" => LevelFilter::Off,
        "error" => LevelFilter::Error,
        "warn" => LevelFilter::Warn,
        "debug" => LevelFilter::Debug,
        "trace" => LevelFilter::Trace,
        _ => LevelFilter::Info,
    }
}

fn rolling(base: &Path, stem: &str, keep: u32) -> Result<RollingFileAppender, Box<dyn Error>> {
    let roller = FixedWindowRoller::builder()
        .build(&format!("{}", base.join(format!("{stem}.{{}}.log")).display()), keep)?;
    let policy = CompoundPolicy::new(Box::new(SizeTrigger::new(ROLL_BYTES)), Box::new(roller));
    let appender = RollingFileAppender::builder()
        .encoder(Box::new(PatternEncoder::new(PATTERN)))
        .build(base.join(format!("{stem}.log")), Box::new(policy))?;
    Ok(appender)
}

/// Builds a file configuration: `app.log` for everything, `metrics.log` for
/// statistics events and, with `dev_events`, `dev.log` for cache internals.
pub fn build_file_config(
    dir: &Path,
    level: LevelFilter,
    retention: usize,
    dev_events: bool,
) -> Result<Config, Box<dyn Error>> {
    std::fs::create_dir_all(dir)?;
    let keep = u32::try_from(retention.max(1)).unwrap_or(u32::MAX);
    let mut builder = Config::builder()
        .appender(Appender::builder().build("app", Box::new(rolling(dir, "app", keep)?)))
        .appender(Appender::builder().build("metrics", Box::new(rolling(dir, "metrics", keep)?)))
        .logger(Logger::builder().appender("metrics").additive(false).build(METRICS_TARGET, level));
    if dev_events {
        builder = builder
            .appender(Appender::builder().build("dev", Box::new(rolling(dir, "dev", keep)?)))
            .logger(
                Logger::builder()
                    .appender("dev")
                    .additive(false)
                    .build(crate::devlog::TARGET, LevelFilter::Trace),
            );
    } else {
        builder = builder.logger(Logger::builder().additive(false).build(crate::devlog::TARGET, LevelFilter::Off));
    }
    Ok(builder.build(Root::builder().appender("app").build(level))?)
}

/// Builds a stderr-only configuration.
pub fn build_console_config(level: LevelFilter) -> Result<Config, Box<dyn Error>> {
    let stderr = ConsoleAppender::builder()
        .target(Target::Stderr)
        .encoder(Box::new(PatternEncoder::new("[{l}] {t} - {m}{n}")))
        .build();
    let config = Config::builder()
        .appender(Appender::builder().build("stderr", Box::new(stderr)))
        .logger(Logger::builder().build(crate::devlog::TARGET, LevelFilter::Off))
        .build(Root::builder().appender("stderr").build(level))?;
    Ok(config)
}

/// Installs `config` as the process logger, replacing an earlier one set here.
pub fn apply(config: Config) -> Result<(), Box<dyn Error>> {
    if let Some(handle) = HANDLE.get() {
        handle.set_config(config);
        return Ok(());
    }
    let handle = log4rs::init_config(config)?;
    let _ = HANDLE.set(handle);
    Ok(())
}

/// Rolling file logging under `dir` (current directory when `None`).
/// - level: error|warn|info|debug|trace
/// - retention: number of rolled files to keep (default 7)
pub fn configure_logging(
    dir: Option<&Path>,
    level: Option<&str>,
    retention: Option<usize>,
) -> Result<(), Box<dyn Error>> {
    let base = dir
        .map(PathBuf::from)
        .unwrap_or_else(|| std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")));
    let config = build_file_config(&base, parse_level(level.unwrap_or("info")), retention.unwrap_or(7), false)?;
    apply(config)
}

pub fn configure_console(level: &str) -> Result<(), Box<dyn Error>> {
    apply(build_console_config(parse_level(level))?)
}

/// Configure logging from environment variables if present:
/// - THROUGHCACHE_LOG_DIR (file logging; console otherwise)
/// - THROUGHCACHE_LOG_LEVEL
/// - THROUGHCACHE_LOG_RETENTION
/// - THROUGHCACHE_DEV (1/true/yes routes cache internals to dev.log)
pub fn configure_from_env() -> Result<(), Box<dyn Error>> {
    let level = std::env::var("THROUGHCACHE_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());
    let Ok(dir) = std::env::var("THROUGHCACHE_LOG_DIR") else {
        return configure_console(&level);
    };
    let retention = std::env::var("THROUGHCACHE_LOG_RETENTION")
        .ok()
        .and_then(|s| s.parse::<usize>().ok())
        .unwrap_or(7);
    let dev_events = std::env::var("THROUGHCACHE_DEV")
        .map(|s| matches!(s.to_ascii_lowercase().as_str(), "1" | "true" | "yes"))
        .unwrap_or(false);
    apply(build_file_config(Path::new(&dir), parse_level(&level), retention, dev_events)?)
}
