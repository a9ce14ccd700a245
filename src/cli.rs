//! CLI argument definitions using clap derive macros.

use std::path::PathBuf;

use clap::Parser;

use seedwatch::config::DEFAULT_CONFIG_FILE;

/// Poll a tracker listing page and download watch-listed torrents.
///
/// Seedwatch checks the configured listing page on a fixed interval and
/// downloads the first matching torrent for every title on the watch-list,
/// exiting once all of them have been fetched.
#[derive(Parser, Debug)]
#[command(name = "seedwatch")]
#[command(author, version, about)]
pub struct Args {
    /// Path to the JSON configuration file
    #[arg(short = 'c', long, default_value = DEFAULT_CONFIG_FILE)]
    pub config: PathBuf,

    /// Watch-list file, one wanted title per line (overrides the config value)
    #[arg(short = 'w', long)]
    pub watch_list: Option<PathBuf>,

    /// Directory downloaded torrents are written to (overrides the config value)
    #[arg(short = 'o', long)]
    pub output_dir: Option<PathBuf>,

    /// Increase output verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(short, long)]
    pub quiet: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_default_args_parses_successfully() {
        let args = Args::try_parse_from(["seedwatch"]).unwrap();
        assert_eq!(args.config, PathBuf::from("config.json"));
        assert!(args.watch_list.is_none());
        assert!(args.output_dir.is_none());
        assert_eq!(args.verbose, 0);
        assert!(!args.quiet);
    }

    #[test]
    fn test_cli_config_flag_overrides_default() {
        let args = Args::try_parse_from(["seedwatch", "-c", "site.json"]).unwrap();
        assert_eq!(args.config, PathBuf::from("site.json"));

        let args = Args::try_parse_from(["seedwatch", "--config", "other.json"]).unwrap();
        assert_eq!(args.config, PathBuf::from("other.json"));
    }

    #[test]
    fn test_cli_watch_list_flag() {
        let args = Args::try_parse_from(["seedwatch", "-w", "wanted.txt"]).unwrap();
        assert_eq!(args.watch_list, Some(PathBuf::from("wanted.txt")));
    }

    #[test]
    fn test_cli_output_dir_flag() {
        let args = Args::try_parse_from(["seedwatch", "--output-dir", "/tmp/torrents"]).unwrap();
        assert_eq!(args.output_dir, Some(PathBuf::from("/tmp/torrents")));
    }

    #[test]
    fn test_cli_verbose_flag_increments_count() {
        let args = Args::try_parse_from(["seedwatch", "-v"]).unwrap();
        assert_eq!(args.verbose, 1);

        let args = Args::try_parse_from(["seedwatch", "-vv"]).unwrap();
        assert_eq!(args.verbose, 2);
    }

    #[test]
    fn test_cli_quiet_flag_sets_quiet() {
        let args = Args::try_parse_from(["seedwatch", "-q"]).unwrap();
        assert!(args.quiet);
    }

    #[test]
    fn test_cli_invalid_flag_returns_error() {
        let result = Args::try_parse_from(["seedwatch", "--invalid-flag"]);
        assert!(result.is_err());
        let err = result.unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::UnknownArgument);
    }

    #[test]
    fn test_cli_help_flag_shows_usage() {
        let result = Args::try_parse_from(["seedwatch", "--help"]);
        assert!(result.is_err());
        let err = result.unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::DisplayHelp);
    }
}
