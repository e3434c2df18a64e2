use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use log::LevelFilter;
use log4rs::append::file::FileAppender;
use log4rs::config::{Appender, Config, Root};
use log4rs::encode::pattern::PatternEncoder;

use crate::config::LoggingSettings;

/// Optional log4rs file that replaces the built-in file logger.
pub const LOG_CONFIG_RELATIVE_PATH: &str = "config/log4rs.yaml";

const LOG_PATTERN: &str = "{d(%Y-%m-%d %H:%M:%S)} {l:<5} {t} - {m}{n}";

/// Routes the `log` macros to a file, since stdout belongs to the terminal UI.
pub fn init(workspace_root: &Path, settings: &LoggingSettings) -> Result<()> {
    let yaml = workspace_root.join(LOG_CONFIG_RELATIVE_PATH);
    if yaml.exists() {
        return log4rs::init_file(&yaml, Default::default())
            .with_context(|| format!("failed to load logging config: {}", yaml.display()));
    }

    let log_path = workspace_root.join(&settings.file);
    if let Some(parent) = log_path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("failed to create log directory: {}", parent.display()))?;
    }
    let appender = FileAppender::builder()
        .encoder(Box::new(PatternEncoder::new(LOG_PATTERN)))
        .build(&log_path)
        .with_context(|| format!("failed to open log file: {}", log_path.display()))?;

    let config = Config::builder()
        .appender(Appender::builder().build("file", Box::new(appender)))
        .build(Root::builder().appender("file").build(level_filter(&settings.level)))
        .context("invalid logging configuration")?;
    log4rs::init_config(config).context("logger already initialised")?;
    Ok(())
}

/// Unknown level names fall back to `info`.
fn level_filter(level: &str) -> LevelFilter {
    level.trim().parse().unwrap_or(LevelFilter::Info)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn level_names_parse_case_insensitively() {
        assert_eq!(level_filter("debug"), LevelFilter::Debug);
        assert_eq!(level_filter(" WARN "), LevelFilter::Warn);
        assert_eq!(level_filter("off"), LevelFilter::Off);
        assert_eq!(level_filter("chatty"), LevelFilter::Info);
    }
}
