//! Logging for the create2 CLI.
//!
//! Command output (salts, addresses, receipts) is JSON on stdout; logs never go there. Each `-v`
//! lowers the level of both `create2` and `create2_deploy`:
//!
//! - `-vvv` shows the deployment pipeline (probe hits, submitted and confirmed deployments, the
//!   seed range being searched)
//! - `-vvvv` adds the derived address, init code hash and post-deploy action of every request
//! - `-vvvvv` adds every code query against the node
//!
//! `RUST_LOG` overrides the flags entirely.

use std::path::PathBuf;

use clap::Parser;
use tracing::Level;
use tracing_subscriber::{fmt, fmt::writer::BoxMakeWriter, EnvFilter};

use super::Result;

/// Logging configuration arguments.
#[derive(Debug, Clone, Default, Parser)]
pub struct LogArgs {
    /// Log verbosity (-v = error, -vv = warn, -vvv = info, -vvvv = debug, -vvvvv = trace)
    #[arg(short = 'v', action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Append logs to this file instead of stderr
    #[arg(long = "log.file", visible_aliases = ["log-file"], global = true)]
    pub log_file: Option<PathBuf>,

    /// Plain stderr logs without ANSI colors
    #[arg(long = "log.no-color", visible_aliases = ["log-no-color"], global = true)]
    pub log_no_color: bool,
}

impl LogArgs {
    /// Installs the global tracing subscriber.
    ///
    /// Targets are printed from `-vvvv` on, where `create2` and `create2_deploy` events interleave.
    pub fn init(&self) -> Result<()> {
        let filter = if std::env::var("RUST_LOG").is_ok() {
            EnvFilter::from_default_env()
        } else {
            EnvFilter::new(self.directive())
        };

        let writer = match &self.log_file {
            Some(path) => {
                let file = std::fs::OpenOptions::new().create(true).append(true).open(path)?;
                BoxMakeWriter::new(file)
            }
            None => BoxMakeWriter::new(std::io::stderr),
        };

        fmt()
            .with_env_filter(filter)
            .with_target(self.verbose >= 4)
            .with_writer(writer)
            .with_ansi(self.ansi())
            .init();
        Ok(())
    }

    /// The filter directive implied by the `-v` count.
    fn directive(&self) -> String {
        let level = match self.verbose {
            0 => return "off".to_string(),
            1 => Level::ERROR,
            2 => Level::WARN,
            3 => Level::INFO,
            4 => Level::DEBUG,
            _ => Level::TRACE,
        };
        format!("create2={level},create2_deploy={level}")
    }

    /// Colors only make sense on a terminal stream.
    const fn ansi(&self) -> bool {
        self.log_file.is_none() && !self.log_no_color
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(0, "off")]
    #[case(1, "create2=ERROR,create2_deploy=ERROR")]
    #[case(3, "create2=INFO,create2_deploy=INFO")]
    #[case(9, "create2=TRACE,create2_deploy=TRACE")]
    fn test_verbosity_directive(#[case] verbose: u8, #[case] expected: &str) {
        let args = LogArgs { verbose, ..Default::default() };
        assert_eq!(args.directive(), expected);
    }

    #[rstest]
    #[case(None, false, true)]
    #[case(None, true, false)]
    #[case(Some("deploy.log"), false, false)]
    fn test_ansi(#[case] log_file: Option<&str>, #[case] log_no_color: bool, #[case] ansi: bool) {
        let args =
            LogArgs { log_file: log_file.map(PathBuf::from), log_no_color, ..Default::default() };
        assert_eq!(args.ansi(), ansi);
    }

    #[test]
    fn test_parse_log_flags() {
        let args = LogArgs::try_parse_from(["create2", "-vvv", "--log.file", "out.log"]).unwrap();
        assert_eq!(args.verbose, 3);
        assert_eq!(args.log_file, Some(PathBuf::from("out.log")));
        assert!(!args.ansi());
    }
}
