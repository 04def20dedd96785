/// Terminal logger set up from the configured log level.
pub mod logging;
