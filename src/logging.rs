//! File logging for binaries embedding the judge.

use std::path::PathBuf;

use flexi_logger::{Cleanup, Criterion, FileSpec, Logger, LoggerHandle, Naming};

use crate::{config::LoggingConfig, error::JudgeError};

const DEFAULT_LOG_DIR: &str = "logs";
const DEFAULT_BASENAME: &str = "llm-judge";

/// Starts a size-rotated file logger. `RUST_LOG` overrides the configured level.
///
/// Keep the returned handle alive for as long as logs should be written.
pub fn init_logging(config: &LoggingConfig) -> Result<LoggerHandle, JudgeError> {
    let log_path = config
        .path
        .as_ref()
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_LOG_DIR).join(format!("{DEFAULT_BASENAME}.log")));
    let directory = log_path
        .parent()
        .filter(|dir| !dir.as_os_str().is_empty())
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("."));
    let basename = log_path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or(DEFAULT_BASENAME)
        .to_string();

    let logger = Logger::try_with_env_or_str(&config.level)
        .map_err(|e| JudgeError::ConfigError(format!("invalid log level {:?}: {e}", config.level)))?
        .log_to_file(FileSpec::default().directory(directory).basename(basename))
        .rotate(
            Criterion::Size(config.rotate_size),
            Naming::Numbers,
            Cleanup::KeepLogFiles(config.rotate_keep),
        );
    logger
        .start()
        .map_err(|e| JudgeError::ConfigError(format!("failed to start logger: {e}")))
}
