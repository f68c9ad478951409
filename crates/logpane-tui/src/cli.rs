//! Command line. Flags override the config file.

use std::path::PathBuf;

use clap::Parser;

use crate::config::Config;
use crate::tail::Source;

#[derive(Parser, Debug)]
#[command(name = "logpane", version, about = "Follow, order and filter logs in the terminal")]
pub struct Cli {
    /// Files to follow. Reads stdin when none are given, or for `-`.
    pub files: Vec<PathBuf>,
    /// Start with this plain-text filter applied.
    #[arg(long, conflicts_with = "regex")]
    pub filter: Option<String>,
    /// Start with this regex filter applied.
    #[arg(long)]
    pub regex: Option<String>,
    /// Newest logs first.
    #[arg(long, action = clap::ArgAction::SetTrue)]
    pub descending: bool,
    /// Hide non-matching lines while filtering.
    #[arg(long, action = clap::ArgAction::SetTrue)]
    pub matches_only: bool,
    /// Read files once instead of following them.
    #[arg(long, action = clap::ArgAction::SetTrue)]
    pub no_follow: bool,
    #[arg(long, action = clap::ArgAction::SetTrue)]
    pub wrap: bool,
    #[arg(long, action = clap::ArgAction::SetTrue)]
    pub no_color: bool,
    /// Config file to use instead of the default location.
    #[arg(long)]
    pub config: Option<PathBuf>,
}

impl Cli {
    pub fn apply(&self, config: &mut Config) {
        if self.descending {
            config.view.descending = true;
        }
        if self.matches_only {
            config.view.context = false;
        }
        if self.no_follow {
            config.tail.follow = false;
        }
        if self.wrap {
            config.view.wrap = true;
        }
        if self.no_color {
            config.view.color = false;
        }
    }

    pub fn sources(&self) -> Vec<Source> {
        if self.files.is_empty() {
            return vec![Source::Stdin];
        }
        self.files
            .iter()
            .map(|path| {
                if path.as_os_str() == "-" {
                    Source::Stdin
                } else {
                    Source::File(path.clone())
                }
            })
            .collect()
    }

    /// Initial filter text and whether it is a regex.
    pub fn initial_filter(&self) -> Option<(&str, bool)> {
        match (&self.filter, &self.regex) {
            (_, Some(re)) => Some((re.as_str(), true)),
            (Some(text), None) => Some((text.as_str(), false)),
            (None, None) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_to_stdin() {
        let cli = Cli::parse_from(["logpane"]);
        assert_eq!(cli.sources(), vec![Source::Stdin]);
        assert!(cli.initial_filter().is_none());
    }

    #[test]
    fn test_files_and_dash() {
        let cli = Cli::parse_from(["logpane", "a.log", "-", "/var/log/b.log"]);
        assert_eq!(
            cli.sources(),
            vec![
                Source::File(PathBuf::from("a.log")),
                Source::Stdin,
                Source::File(PathBuf::from("/var/log/b.log")),
            ]
        );
    }

    #[test]
    fn test_flags_override_config() {
        let cli = Cli::parse_from([
            "logpane",
            "--descending",
            "--matches-only",
            "--no-follow",
            "--regex",
            "err(or)?",
            "app.log",
        ]);
        let mut config = Config::default();
        cli.apply(&mut config);
        assert!(config.view.descending);
        assert!(!config.view.context);
        assert!(!config.tail.follow);
        assert!(config.view.color);
        assert_eq!(cli.initial_filter(), Some(("err(or)?", true)));
    }

    #[test]
    fn test_filter_and_regex_conflict() {
        assert!(Cli::try_parse_from(["logpane", "--filter", "a", "--regex", "b"]).is_err());
    }
}
