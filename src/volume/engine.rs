//! Command execution against the hfsutils tool set
//!
//! The engine knows nothing about paths or listings: it receives commands whose
//! names and paths are already Mac OS Roman encoded, runs them to completion,
//! and hands back the exit status plus raw output.

use serde::{Deserialize, Serialize};
use std::ffi::OsString;
use std::io;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

/// How `hcopy` translates the host file while copying it in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum CopyMode {
    /// MacBinary II, carrying both forks and Finder info
    #[default]
    MacBinary,
    BinHex,
    /// Text with line ending translation
    Text,
    /// Data fork only, untranslated
    Raw,
    /// Let hcopy guess from the file contents
    Auto,
}

impl CopyMode {
    fn flag(self) -> &'static str {
        match self {
            Self::MacBinary => "-m",
            Self::BinHex => "-b",
            Self::Text => "-t",
            Self::Raw => "-r",
            Self::Auto => "-a",
        }
    }
}

/// A single engine invocation. Byte fields are Mac OS Roman.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineCommand {
    Mount { image: PathBuf },
    Unmount,
    /// `stat` lists the item itself instead of its contents
    List { path: Option<Vec<u8>>, stat: bool },
    CopyIn {
        mode: CopyMode,
        source: PathBuf,
        target: Vec<u8>,
    },
    Delete { path: Vec<u8> },
    Mkdir { path: Vec<u8> },
    Format { image: PathBuf, name: Vec<u8> },
}

impl EngineCommand {
    /// Name of the hfsutils program that carries out this command
    pub fn program(&self) -> &'static str {
        match self {
            Self::Mount { .. } => "hmount",
            Self::Unmount => "humount",
            Self::List { .. } => "hdir",
            Self::CopyIn { .. } => "hcopy",
            Self::Delete { .. } => "hdel",
            Self::Mkdir { .. } => "hmkdir",
            Self::Format { .. } => "hformat",
        }
    }

    /// Command line arguments, not including the program
    pub fn args(&self) -> Vec<OsString> {
        match self {
            Self::Mount { image } => vec![image.into()],
            Self::Unmount => Vec::new(),
            Self::List { path, stat } => {
                let mut args = vec![OsString::from("-i")];
                if *stat {
                    args.push("-d".into());
                }
                if let Some(path) = path {
                    args.push(os_string_from_bytes(path));
                }
                args
            }
            Self::CopyIn {
                mode,
                source,
                target,
            } => vec![
                mode.flag().into(),
                source.into(),
                os_string_from_bytes(target),
            ],
            Self::Delete { path } | Self::Mkdir { path } => vec![os_string_from_bytes(path)],
            Self::Format { image, name } => {
                vec!["-l".into(), os_string_from_bytes(name), image.into()]
            }
        }
    }
}

#[cfg(unix)]
fn os_string_from_bytes(bytes: &[u8]) -> OsString {
    use std::os::unix::ffi::OsStringExt;
    OsString::from_vec(bytes.to_vec())
}

#[cfg(not(unix))]
fn os_string_from_bytes(bytes: &[u8]) -> OsString {
    OsString::from(super::macroman::decode(bytes))
}

/// Exit status and captured output of a finished command
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EngineOutput {
    /// Exit code, `None` if the process was killed by a signal
    pub status: Option<i32>,
    pub stdout: Vec<u8>,
    pub stderr: Vec<u8>,
}

impl EngineOutput {
    pub fn success(&self) -> bool {
        self.status == Some(0)
    }
}

/// Executes engine commands
pub trait Engine {
    /// Run a command to completion. Only failure to launch is an `Err`;
    /// a non-zero exit is reported through [`EngineOutput::status`].
    fn run(&self, command: &EngineCommand) -> io::Result<EngineOutput>;
}

/// Engine backed by the hfsutils command line programs
#[derive(Debug, Clone, Default)]
pub struct HfsUtils {
    tool_dir: Option<PathBuf>,
}

impl HfsUtils {
    /// Use the programs found on `PATH`
    pub fn new() -> Self {
        Self::default()
    }

    /// Use the programs in a specific directory
    pub fn with_tool_dir(dir: impl Into<PathBuf>) -> Self {
        Self {
            tool_dir: Some(dir.into()),
        }
    }

    pub fn tool_dir(&self) -> Option<&Path> {
        self.tool_dir.as_deref()
    }

    fn program_path(&self, program: &str) -> PathBuf {
        match &self.tool_dir {
            Some(dir) => dir.join(program),
            None => PathBuf::from(program),
        }
    }
}

impl Engine for HfsUtils {
    fn run(&self, command: &EngineCommand) -> io::Result<EngineOutput> {
        let program = self.program_path(command.program());
        let args = command.args();
        log::debug!("Running {} {:?}", program.display(), args);

        let output = Command::new(&program)
            .args(&args)
            .stdin(Stdio::null())
            .output()
            .map_err(|e| {
                io::Error::new(
                    e.kind(),
                    format!("Failed to run {}: {}", program.display(), e),
                )
            })?;

        log::debug!("{} exited with {}", command.program(), output.status);
        Ok(EngineOutput {
            status: output.status.code(),
            stdout: output.stdout,
            stderr: output.stderr,
        })
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_list_args() {
        let command = EngineCommand::List {
            path: Some(b"Boot:System Folder".to_vec()),
            stat: true,
        };
        assert_eq!(command.program(), "hdir");
        assert_eq!(command.args(), vec!["-i", "-d", "Boot:System Folder"]);

        let command = EngineCommand::List {
            path: None,
            stat: false,
        };
        assert_eq!(command.args(), vec!["-i"]);
    }

    #[test]
    fn test_copy_and_format_args() {
        let command = EngineCommand::CopyIn {
            mode: CopyMode::MacBinary,
            source: PathBuf::from("/tmp/app.bin"),
            target: b"Boot:App".to_vec(),
        };
        assert_eq!(command.args(), vec!["-m", "/tmp/app.bin", "Boot:App"]);

        let command = EngineCommand::Format {
            image: PathBuf::from("disk.img"),
            name: b"Boot".to_vec(),
        };
        assert_eq!(command.program(), "hformat");
        assert_eq!(command.args(), vec!["-l", "Boot", "disk.img"]);
    }

    #[cfg(unix)]
    #[test]
    fn test_encoded_args_are_passed_as_bytes() {
        use std::os::unix::ffi::OsStrExt;
        let command = EngineCommand::Delete {
            path: b"Boot:Caf\x8E".to_vec(),
        };
        assert_eq!(command.args()[0].as_bytes(), b"Boot:Caf\x8E");
    }

    #[test]
    fn test_tool_dir() {
        let engine = HfsUtils::with_tool_dir("/opt/hfsutils/bin");
        assert_eq!(
            engine.program_path("hmount"),
            PathBuf::from("/opt/hfsutils/bin/hmount")
        );
        assert_eq!(HfsUtils::new().program_path("hdir"), PathBuf::from("hdir"));
    }

    #[test]
    fn test_missing_program_is_io_error() {
        let engine = HfsUtils::with_tool_dir("/nonexistent/hfskit-test");
        assert!(engine.run(&EngineCommand::Unmount).is_err());
    }

    #[test]
    fn test_copy_mode_serde_names() {
        let mode: CopyMode = serde_json::from_str("\"mac-binary\"").unwrap();
        assert_eq!(mode, CopyMode::MacBinary);
        assert_eq!(serde_json::to_string(&CopyMode::BinHex).unwrap(), "\"bin-hex\"");
    }
}
