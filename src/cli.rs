use std::path::PathBuf;

use clap::Parser;

use crate::types::Command;

#[derive(Parser, Debug)]
#[command(name = "gphotos-sync", about = "Mirror a Google Photos album into a local directory")]
pub struct Cli {
    /// Path to config.yml
    #[arg(long, default_value = "/configs/config.yml")]
    pub config: PathBuf,

    /// Command to execute
    #[arg(long, value_enum, default_value = "SyncImage")]
    pub command: Command,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let cli = Cli::try_parse_from(["gphotos-sync"]).unwrap();
        assert_eq!(cli.config, PathBuf::from("/configs/config.yml"));
        assert_eq!(cli.command, Command::SyncImage);
    }

    #[test]
    fn test_list_album_command() {
        let cli =
            Cli::try_parse_from(["gphotos-sync", "--command", "ListAlbum", "--config", "c.yml"])
                .unwrap();
        assert_eq!(cli.command, Command::ListAlbum);
        assert_eq!(cli.config, PathBuf::from("c.yml"));
    }

    #[test]
    fn test_unknown_command_rejected() {
        assert!(Cli::try_parse_from(["gphotos-sync", "--command", "Purge"]).is_err());
    }

    #[test]
    fn test_no_other_flags() {
        assert!(Cli::try_parse_from(["gphotos-sync", "--dry-run"]).is_err());
    }
}
