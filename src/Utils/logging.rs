//! Terminal logging through `simplelog`. Library code only uses the `log` macros; the
//! binary decides where records go.
use crate::errors::{ChemError, ChemResult};
use simplelog::{ColorChoice, ConfigBuilder, LevelFilter, TermLogger, TerminalMode};

/// Level filter from its lowercase name: off, error, warn, info, debug, trace.
pub fn parse_level(level: &str) -> ChemResult<LevelFilter> {
    match level.trim().to_lowercase().as_str() {
        "off" => Ok(LevelFilter::Off),
        "error" => Ok(LevelFilter::Error),
        "warn" => Ok(LevelFilter::Warn),
        "info" => Ok(LevelFilter::Info),
        "debug" => Ok(LevelFilter::Debug),
        "trace" => Ok(LevelFilter::Trace),
        other => Err(ChemError::Config(format!("Unknown log level: {}", other))),
    }
}

/// Installs a terminal logger. Fails if the level is unknown or a logger is already set.
pub fn init_logging(level: &str) -> ChemResult<()> {
    let filter = parse_level(level)?;
    let config = ConfigBuilder::new()
        .set_time_level(LevelFilter::Off)
        .set_target_level(LevelFilter::Debug)
        .build();
    TermLogger::init(filter, config, TerminalMode::Stderr, ColorChoice::Auto)
        .map_err(|e| ChemError::Config(format!("logger already initialised: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_level() {
        assert_eq!(parse_level("info").unwrap(), LevelFilter::Info);
        assert_eq!(parse_level(" DEBUG ").unwrap(), LevelFilter::Debug);
        assert_eq!(parse_level("off").unwrap(), LevelFilter::Off);
        assert!(matches!(parse_level("chatty"), Err(ChemError::Config(_))));
    }

    #[test]
    fn test_init_rejects_unknown_level() {
        assert!(init_logging("loud").is_err());
    }
}
