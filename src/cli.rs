//! CLI argument definitions using clap derive macros.

use std::path::PathBuf;

use clap::Parser;

/// Incremental downloader for the Bing daily image archive.
///
/// Fetches the dated archive feed for each configured market, downloads any
/// images not already present locally, and records failures so they can be
/// retried on a later run.
#[derive(Parser, Debug)]
#[command(name = "bing-image-archiver")]
#[command(author, version, about)]
pub struct Args {
    /// Path to the JSON configuration file
    #[arg(short = 'c', long, default_value = "config.json")]
    pub config: PathBuf,

    /// Increase output verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(short, long)]
    pub quiet: bool,

    /// Run the retry pass over the failed-downloads ledger, regardless of
    /// the config file setting
    #[arg(long)]
    pub retry_failed: bool,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_default_args_parses_successfully() {
        let args = Args::try_parse_from(["bing-image-archiver"]).unwrap();
        assert_eq!(args.config, PathBuf::from("config.json"));
        assert_eq!(args.verbose, 0);
        assert!(!args.quiet);
        assert!(!args.retry_failed);
    }

    #[test]
    fn test_cli_verbose_flag_increments_count() {
        let args = Args::try_parse_from(["bing-image-archiver", "-v"]).unwrap();
        assert_eq!(args.verbose, 1);

        let args = Args::try_parse_from(["bing-image-archiver", "-vv"]).unwrap();
        assert_eq!(args.verbose, 2);
    }

    #[test]
    fn test_cli_config_path_override() {
        let args =
            Args::try_parse_from(["bing-image-archiver", "--config", "/etc/archiver.json"])
                .unwrap();
        assert_eq!(args.config, PathBuf::from("/etc/archiver.json"));
    }

    #[test]
    fn test_cli_retry_failed_flag() {
        let args = Args::try_parse_from(["bing-image-archiver", "--retry-failed"]).unwrap();
        assert!(args.retry_failed);
    }

    #[test]
    fn test_cli_help_flag_shows_usage() {
        // --help causes early exit, so we check it returns an error with Help kind
        let result = Args::try_parse_from(["bing-image-archiver", "--help"]);
        assert!(result.is_err());
        let err = result.unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::DisplayHelp);
    }
}
