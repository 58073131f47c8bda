//! Command line interface definition

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use hfskit::volume::CopyMode;

#[derive(Parser, Debug)]
#[command(
    name = "hfskit",
    version,
    about = "Inspect and modify HFS disk images through hfsutils"
)]
pub struct Cli {
    /// Directory containing the hfsutils programs (overrides config.json)
    #[arg(long, value_name = "DIR", global = true)]
    pub tool_dir: Option<PathBuf>,

    /// Disk image to operate on
    pub image: PathBuf,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Show volume name, dates and free space
    Info,

    /// List a directory (the volume root if omitted)
    Ls { path: Option<String> },

    /// Show a single item
    Stat { path: String },

    /// Exit with status 0 if the item exists, 1 if not, 2 on error
    Exists { path: String },

    /// Copy a host file onto the volume ("-" reads standard input)
    Put {
        source: PathBuf,
        target: String,
        #[arg(long, value_enum)]
        mode: Option<CopyMode>,
    },

    /// Delete a file or empty directory
    Rm { path: String },

    /// Create a directory
    Mkdir { path: String },

    /// Format the existing image
    Format { name: String },

    /// Create a new zero-filled image of SIZE bytes and format it
    New { name: String, size: u64 },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_put() {
        let cli = Cli::parse_from([
            "hfskit",
            "boot.img",
            "put",
            "-",
            "Boot:Alias",
            "--mode",
            "bin-hex",
        ]);
        assert_eq!(cli.image, PathBuf::from("boot.img"));
        match cli.command {
            Commands::Put {
                source,
                target,
                mode,
            } => {
                assert_eq!(source, PathBuf::from("-"));
                assert_eq!(target, "Boot:Alias");
                assert_eq!(mode, Some(CopyMode::BinHex));
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_parse_new_with_tool_dir() {
        let cli = Cli::parse_from([
            "hfskit",
            "--tool-dir",
            "/opt/hfsutils/bin",
            "scratch.img",
            "new",
            "Scratch",
            "1474560",
        ]);
        assert_eq!(cli.tool_dir, Some(PathBuf::from("/opt/hfsutils/bin")));
        assert!(matches!(
            cli.command,
            Commands::New { ref name, size: 1474560 } if name == "Scratch"
        ));
    }

    #[test]
    fn test_ls_path_is_optional() {
        let cli = Cli::parse_from(["hfskit", "boot.img", "ls"]);
        assert!(matches!(cli.command, Commands::Ls { path: None }));
    }
}
