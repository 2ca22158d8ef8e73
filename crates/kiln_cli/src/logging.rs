//! `log` backend setup.

use std::io::Write;

use log::Level;

use crate::GlobalArgs;

/// Environment variable holding `env_logger` filter directives.
pub const KILN_LOG: &str = "KILN_LOG";

const DEFAULT_FILTERS: &str = "info";

/// How the logger should be configured.
#[derive(Debug, Clone)]
pub struct LoggingOptions {
    /// Base filter directives, e.g. `info` or `kiln_build=debug`.
    pub log_filters: String,
    /// Raise everything to `debug`.
    pub verbose: bool,
    /// Only show errors.
    pub quiet: bool,
}

impl Default for LoggingOptions {
    fn default() -> Self {
        Self {
            log_filters: DEFAULT_FILTERS.to_string(),
            verbose: false,
            quiet: false,
        }
    }
}

impl LoggingOptions {
    /// Reads base filters from `KILN_LOG` and verbosity from the CLI flags.
    pub fn from_env(global: &GlobalArgs) -> Self {
        Self {
            log_filters: std::env::var(KILN_LOG).unwrap_or_else(|_| DEFAULT_FILTERS.to_string()),
            verbose: global.verbose,
            quiet: global.quiet,
        }
    }
}

/// Installs the global logger. Fails if one is already installed.
pub fn init_logging(opts: &LoggingOptions) -> Result<(), log::SetLoggerError> {
    logging_builder(opts).try_init()
}

/// Builds the `env_logger` configuration for `opts`, writing to stderr.
pub fn logging_builder(opts: &LoggingOptions) -> env_logger::Builder {
    use env_logger::{Builder, Target};

    let mut builder = Builder::new();
    builder.parse_filters(&log_filters_with_verbosity(opts));
    builder.target(Target::Stderr);
    builder.format(|buf, record| match record.level() {
        Level::Info => writeln!(buf, "{}", record.args()),
        level => writeln!(buf, "{}: {}", level.as_str().to_lowercase(), record.args()),
    });
    builder
}

fn log_filters_with_verbosity(opts: &LoggingOptions) -> String {
    if opts.quiet {
        "error".to_string()
    } else if opts.verbose {
        format!("{},debug", opts.log_filters)
    } else {
        opts.log_filters.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn log_filters_default() {
        let opts = LoggingOptions::default();
        assert_eq!(log_filters_with_verbosity(&opts), "info");
    }

    #[test]
    fn log_filters_verbose() {
        let opts = LoggingOptions {
            verbose: true,
            ..Default::default()
        };
        assert_eq!(log_filters_with_verbosity(&opts), "info,debug");
    }

    #[test]
    fn log_filters_quiet_overrides_env() {
        let opts = LoggingOptions {
            log_filters: "kiln_build=trace".to_string(),
            quiet: true,
            ..Default::default()
        };
        assert_eq!(log_filters_with_verbosity(&opts), "error");
    }
}
