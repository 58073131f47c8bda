//! Mount lifecycle of an HFS volume
//!
//! hfsutils keeps a single "current volume" that every command operates on.
//! That global is modeled as a session slot: [`Hfs::mount`] claims it and
//! returns a [`VolumeSession`], which gives it back when it is unmounted or
//! dropped. A second mount while the slot is taken fails with
//! [`HfsError::SessionAlreadyActive`] instead of silently switching volumes.

use regex::bytes::Regex;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, LazyLock};

use super::engine::{CopyMode, Engine, EngineCommand, HfsUtils};
use super::error::{HfsError, Result};
use super::macroman;
use crate::config::AppConfig;
use crate::timestamp;

/// Slot shared by every handle that drives the real hfsutils programs
static SYSTEM_SLOT: LazyLock<Arc<AtomicBool>> = LazyLock::new(|| Arc::new(AtomicBool::new(false)));

static VOLUME_NAME_LINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"(?s-u)^Volume name is "(.*)"$"#).unwrap());
static CREATED_LINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s-u)^Volume was created on (.*)$").unwrap());
static MODIFIED_LINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s-u)^Volume was last modified on (.*)$").unwrap());
static BYTES_FREE_LINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?-u)^Volume has ([0-9]+) bytes free$").unwrap());

/// Snapshot of a volume taken when it was mounted. Not refreshed afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VolumeInfo {
    pub name: String,
    /// Creation date, seconds since the Mac OS epoch
    pub created: i64,
    /// Last modification date, seconds since the Mac OS epoch
    pub modified: i64,
    /// Creation date as reported by hmount
    pub created_ctime: String,
    /// Modification date as reported by hmount
    pub modified_ctime: String,
    pub bytes_free: u64,
}

impl VolumeInfo {
    /// Parse the report hmount prints after mounting a volume
    pub fn parse(output: &[u8]) -> std::result::Result<Self, String> {
        let mut name = None;
        let mut created = None;
        let mut modified = None;
        let mut bytes_free = None;

        for line in output.split(|&b| b == b'\n') {
            let line = line.strip_suffix(b"\r").unwrap_or(line);

            if let Some(caps) = VOLUME_NAME_LINE.captures(line) {
                name = Some(macroman::decode(&caps[1]));
            } else if let Some(caps) = CREATED_LINE.captures(line) {
                created = Some(parse_date(&caps[1])?);
            } else if let Some(caps) = MODIFIED_LINE.captures(line) {
                modified = Some(parse_date(&caps[1])?);
            } else if let Some(caps) = BYTES_FREE_LINE.captures(line) {
                let digits = String::from_utf8_lossy(&caps[1]);
                bytes_free = Some(
                    digits
                        .parse::<u64>()
                        .map_err(|_| format!("Invalid free space: {}", digits))?,
                );
            }
        }

        let missing = |what: &str| format!("hmount did not report the volume {}", what);
        let (created_ctime, created) = created.ok_or_else(|| missing("creation date"))?;
        let (modified_ctime, modified) = modified.ok_or_else(|| missing("modification date"))?;

        Ok(VolumeInfo {
            name: name.ok_or_else(|| missing("name"))?,
            created,
            modified,
            created_ctime,
            modified_ctime,
            bytes_free: bytes_free.ok_or_else(|| missing("free space"))?,
        })
    }
}

fn parse_date(raw: &[u8]) -> std::result::Result<(String, i64), String> {
    let text = macroman::decode(raw);
    let timestamp = timestamp::ctime_to_mac_timestamp(&text)
        .ok_or_else(|| format!("Unrecognized date: {}", text))?;
    Ok((text, timestamp))
}

/// Exclusive claim on the engine's current volume, released on drop
#[derive(Debug)]
pub(crate) struct SessionSlot {
    flag: Arc<AtomicBool>,
}

impl SessionSlot {
    fn acquire(flag: &Arc<AtomicBool>) -> Result<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .map_err(|_| HfsError::SessionAlreadyActive)?;
        Ok(Self { flag: flag.clone() })
    }
}

impl Drop for SessionSlot {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::Release);
    }
}

/// Entry point for working with HFS disk images
pub struct Hfs<E: Engine = HfsUtils> {
    engine: E,
    slot: Arc<AtomicBool>,
    pub(crate) copy_mode: CopyMode,
    pub(crate) temp_suffix: String,
}

impl Hfs<HfsUtils> {
    /// Drive the hfsutils programs on `PATH`
    pub fn system() -> Self {
        Self::system_with(HfsUtils::new())
    }

    /// Build a handle from application configuration
    pub fn from_config(config: &AppConfig) -> Self {
        let engine = match &config.engine.tool_dir {
            Some(dir) => HfsUtils::with_tool_dir(dir),
            None => HfsUtils::new(),
        };
        let mut hfs = Self::system_with(engine);
        hfs.copy_mode = config.engine.copy_mode;
        hfs.temp_suffix = config.temp.suffix.clone();
        hfs
    }

    /// The hfsutils current volume is shared by the whole process, so every
    /// handle built here competes for the same slot.
    fn system_with(engine: HfsUtils) -> Self {
        Self {
            engine,
            slot: SYSTEM_SLOT.clone(),
            copy_mode: CopyMode::default(),
            temp_suffix: crate::config::default_temp_suffix(),
        }
    }
}

impl<E: Engine> Hfs<E> {
    /// Wrap an engine with a session slot of its own
    pub fn new(engine: E) -> Self {
        Self {
            engine,
            slot: Arc::new(AtomicBool::new(false)),
            copy_mode: CopyMode::default(),
            temp_suffix: crate::config::default_temp_suffix(),
        }
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }

    /// Whether some session currently holds the slot
    pub fn is_mounted(&self) -> bool {
        self.slot.load(Ordering::Acquire)
    }

    /// Mount a disk image and make it the current volume.
    ///
    /// Fails with [`HfsError::MountFailed`] if the image is missing, has no
    /// HFS partition, or is otherwise not recognized.
    pub fn mount(&self, image: impl AsRef<Path>) -> Result<VolumeSession<'_, E>> {
        let image = image.as_ref();
        let slot = SessionSlot::acquire(&self.slot)?;
        let mount_failed = |reason: String| HfsError::MountFailed {
            image: image.display().to_string(),
            reason,
        };

        let output = self
            .engine
            .run(&EngineCommand::Mount {
                image: image.to_path_buf(),
            })
            .map_err(|e| mount_failed(e.to_string()))?;

        if !output.success() {
            let stderr = macroman::decode(&output.stderr);
            return Err(mount_failed(format!(
                "hmount exited with {:?}: {}",
                output.status,
                stderr.trim_end()
            )));
        }

        let info = match VolumeInfo::parse(&output.stdout) {
            Ok(info) => info,
            Err(reason) => {
                // hmount succeeded, so the engine has a volume we will not track
                self.release_engine_volume();
                return Err(mount_failed(reason));
            }
        };

        log::info!(
            "Mounted volume '{}' from {} ({} bytes free)",
            info.name,
            image.display(),
            info.bytes_free
        );

        Ok(VolumeSession {
            hfs: self,
            state: SessionState::Mounted { info, _slot: slot },
        })
    }

    /// Mount `image`, run `body`, and unmount again on every exit path
    pub fn with_mounted<T, Er>(
        &self,
        image: impl AsRef<Path>,
        body: impl FnOnce(&mut VolumeSession<'_, E>) -> std::result::Result<T, Er>,
    ) -> std::result::Result<T, Er>
    where
        Er: From<HfsError>,
    {
        let mut session = self.mount(image)?;
        let result = body(&mut session);
        session.unmount();
        result
    }

    /// Claim the slot without mounting, for commands that replace the
    /// engine's current volume as a side effect
    pub(crate) fn claim(&self) -> Result<SessionSlot> {
        SessionSlot::acquire(&self.slot)
    }

    /// Tell the engine to drop its current volume. Failures are only logged.
    pub(crate) fn release_engine_volume(&self) {
        match self.engine.run(&EngineCommand::Unmount) {
            Ok(output) if output.success() => {}
            Ok(output) => log::warn!(
                "humount exited with {:?}: {}",
                output.status,
                macroman::decode(&output.stderr).trim_end()
            ),
            Err(e) => log::warn!("humount failed: {}", e),
        }
    }
}

enum SessionState {
    Mounted { info: VolumeInfo, _slot: SessionSlot },
    Unmounted,
}

/// A mounted volume. Unmounts itself when dropped.
pub struct VolumeSession<'a, E: Engine = HfsUtils> {
    pub(crate) hfs: &'a Hfs<E>,
    state: SessionState,
}

impl<'a, E: Engine> VolumeSession<'a, E> {
    /// Volume details captured at mount time, or `None` after unmounting
    pub fn info(&self) -> Option<&VolumeInfo> {
        match &self.state {
            SessionState::Mounted { info, .. } => Some(info),
            SessionState::Unmounted => None,
        }
    }

    pub fn is_mounted(&self) -> bool {
        matches!(self.state, SessionState::Mounted { .. })
    }

    /// Like [`info`](Self::info), failing with [`HfsError::NoActiveSession`] once unmounted
    pub fn require_mounted(&self) -> Result<&VolumeInfo> {
        self.info().ok_or(HfsError::NoActiveSession)
    }

    /// Unmount the volume. Never fails; engine errors are logged and the
    /// session ends regardless. Calling this twice is a no-op.
    pub fn unmount(&mut self) {
        if let SessionState::Mounted { info, .. } = &self.state {
            log::info!("Unmounting volume '{}'", info.name);
            self.hfs.release_engine_volume();
            // Dropping the old state frees the slot
            self.state = SessionState::Unmounted;
        }
    }
}

impl<E: Engine> Drop for VolumeSession<'_, E> {
    fn drop(&mut self) {
        self.unmount();
    }
}
