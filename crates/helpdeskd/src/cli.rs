//! Command-line arguments for the helpdeskd binary.

use crate::config::CONFIG_ENV;
use clap::Parser;
use helpdesk_shared::VERSION;
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "helpdeskd")]
#[command(about = "IT service desk daemon - repair tickets and Zoom bookings", long_about = None)]
#[command(version = VERSION)]
pub struct Args {
    /// Config file; otherwise the first of /etc/helpdesk/config.toml and
    /// /var/lib/helpdesk/config.toml that exists
    #[arg(long, value_name = "PATH", env = CONFIG_ENV)]
    pub config: Option<PathBuf>,

    /// Write the default config to PATH and exit
    #[arg(long, value_name = "PATH")]
    pub write_config: Option<PathBuf>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_arguments() {
        let args = Args::try_parse_from(["helpdeskd"]).unwrap();
        assert!(args.write_config.is_none());
    }

    #[test]
    fn test_write_config_forms() {
        let args = Args::try_parse_from(["helpdeskd", "--write-config", "/tmp/h.toml"]).unwrap();
        assert_eq!(args.write_config, Some(PathBuf::from("/tmp/h.toml")));

        let args = Args::try_parse_from(["helpdeskd", "--write-config=/tmp/h.toml"]).unwrap();
        assert_eq!(args.write_config, Some(PathBuf::from("/tmp/h.toml")));
    }

    #[test]
    fn test_flags_combine_in_any_order() {
        let args = Args::try_parse_from([
            "helpdeskd",
            "--write-config",
            "out.toml",
            "--config",
            "in.toml",
        ])
        .unwrap();
        assert_eq!(args.config, Some(PathBuf::from("in.toml")));
        assert_eq!(args.write_config, Some(PathBuf::from("out.toml")));
    }

    #[test]
    fn test_unknown_or_incomplete_flags_rejected() {
        assert!(Args::try_parse_from(["helpdeskd", "--write-confg", "x"]).is_err());
        assert!(Args::try_parse_from(["helpdeskd", "--write-config"]).is_err());
        assert!(Args::try_parse_from(["helpdeskd", "stray"]).is_err());
    }
}
