//! Operations on a mounted volume
//!
//! Each operation encodes its path, runs one engine command, and maps the
//! outcome onto [`HfsError`]. Nothing is retried.

use std::fs::File;
use std::io::{self, BufWriter, Read, Write};
use std::path::Path;

use super::engine::{CopyMode, Engine, EngineCommand, EngineOutput};
use super::error::{HfsError, Result};
use super::listing::{self, ItemRecord};
use super::macroman;
use super::path;
use super::session::{Hfs, VolumeSession};

/// hdir's complaint about a path that does not exist
const NOT_FOUND_SUFFIX: &[u8] = b"no such file or directory\n";

/// Items of a directory listing.
///
/// The whole listing is parsed before the first item is handed out, so a bad
/// line fails the call rather than truncating the sequence.
#[derive(Debug)]
pub struct Listing {
    items: std::vec::IntoIter<ItemRecord>,
}

impl Iterator for Listing {
    type Item = ItemRecord;

    fn next(&mut self) -> Option<ItemRecord> {
        self.items.next()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.items.size_hint()
    }
}

impl ExactSizeIterator for Listing {}

impl<E: Engine> VolumeSession<'_, E> {
    fn run(&self, command: EngineCommand) -> Result<EngineOutput> {
        self.require_mounted()?;
        Ok(self.hfs.engine().run(&command)?)
    }

    /// Run a command that reports nothing but its exit status
    fn run_checked(&self, command: EngineCommand) -> Result<()> {
        let program = command.program();
        let output = self.run(command)?;
        if !output.success() {
            return Err(HfsError::engine(program, &output));
        }
        Ok(())
    }

    /// List a directory, or the engine's current directory if `dir` is `None`.
    ///
    /// The engine's current directory is whatever hfsutils last used; pass an
    /// explicit path wherever possible.
    pub fn list(&self, dir: Option<&str>) -> Result<Listing> {
        let path = dir.map(macroman::encode).transpose()?;
        let output = self.run(EngineCommand::List { path, stat: false })?;
        if !output.success() {
            return Err(HfsError::engine("hdir", &output));
        }

        let items = listing::parse_listing(&output.stdout)?;
        log::debug!("Listed {} items in {}", items.len(), dir.unwrap_or("current directory"));
        Ok(Listing {
            items: items.into_iter(),
        })
    }

    /// Describe a single item.
    ///
    /// The item must exist; check with [`exists`](Self::exists) first when in doubt.
    pub fn stat(&self, item: &str) -> Result<ItemRecord> {
        let output = self.run(EngineCommand::List {
            path: Some(macroman::encode(item)?),
            stat: true,
        })?;
        if !output.success() {
            return Err(HfsError::engine("hdir", &output));
        }

        let mut record = listing::parse_listing(&output.stdout)?
            .into_iter()
            .next()
            .ok_or_else(|| HfsError::engine("hdir", &output))?;

        // In this mode hdir reports the whole path as the name
        record.name = path::leaf_name(item).to_string();
        Ok(record)
    }

    /// Whether an item exists at `item`
    pub fn exists(&self, item: &str) -> Result<bool> {
        let output = self.run(EngineCommand::List {
            path: Some(macroman::encode(item)?),
            stat: true,
        })?;

        if output.stderr.ends_with(NOT_FOUND_SUFFIX) {
            return Ok(false);
        }
        if !output.success() || !output.stderr.is_empty() {
            return Err(HfsError::engine("hdir", &output));
        }
        Ok(true)
    }

    /// Copy a host file onto the volume, replacing anything at `target`.
    /// Uses the handle's configured copy mode (MacBinary by default).
    pub fn copy_in(&self, source: impl AsRef<Path>, target: &str) -> Result<()> {
        self.copy_in_with_mode(source, target, self.hfs.copy_mode)
    }

    pub fn copy_in_with_mode(
        &self,
        source: impl AsRef<Path>,
        target: &str,
        mode: CopyMode,
    ) -> Result<()> {
        let source = source.as_ref();
        log::info!("Copying {} to {} ({:?})", source.display(), target, mode);
        self.run_checked(EngineCommand::CopyIn {
            mode,
            source: source.to_path_buf(),
            target: macroman::encode(target)?,
        })
    }

    /// Same as [`copy_in`](Self::copy_in), reading the file from a stream.
    ///
    /// hcopy needs a real file, so the stream is written to a temporary file
    /// first. The temporary file is removed whether or not the copy succeeds.
    pub fn copy_in_from_reader<R: Read>(&self, source: &mut R, target: &str) -> Result<()> {
        self.copy_in_from_reader_with_mode(source, target, self.hfs.copy_mode)
    }

    pub fn copy_in_from_reader_with_mode<R: Read>(
        &self,
        source: &mut R,
        target: &str,
        mode: CopyMode,
    ) -> Result<()> {
        self.require_mounted()?;

        let mut temp = tempfile::Builder::new()
            .prefix("hfskit-")
            .suffix(&self.hfs.temp_suffix)
            .tempfile()?;
        io::copy(source, &mut temp)?;
        temp.flush()?;

        self.copy_in_with_mode(temp.path(), target, mode)
    }

    /// Delete a file or an empty directory
    pub fn delete(&self, item: &str) -> Result<()> {
        log::info!("Deleting {}", item);
        self.run_checked(EngineCommand::Delete {
            path: macroman::encode(item)?,
        })
    }

    /// Create a directory. An existing path is reported however hmkdir reports it.
    pub fn mkdir(&self, dir: &str) -> Result<()> {
        log::info!("Creating directory {}", dir);
        self.run_checked(EngineCommand::Mkdir {
            path: macroman::encode(dir)?,
        })
    }
}

impl<E: Engine> Hfs<E> {
    /// Format an existing disk image in place. The new volume is left unmounted.
    pub fn format_existing(&self, image: impl AsRef<Path>, volume_name: &str) -> Result<()> {
        // hformat switches the engine's current volume, so nobody may hold it
        let _slot = self.claim()?;
        self.format_claimed(image.as_ref(), volume_name)
    }

    /// Run hformat. The caller must already hold the session slot.
    fn format_claimed(&self, image: &Path, volume_name: &str) -> Result<()> {
        let output = self.engine().run(&EngineCommand::Format {
            image: image.to_path_buf(),
            name: macroman::encode(volume_name)?,
        })?;
        if !output.success() {
            return Err(HfsError::engine("hformat", &output));
        }

        log::info!("Formatted {} as '{}'", image.display(), volume_name);
        // hformat mounts what it formats
        self.release_engine_volume();
        Ok(())
    }

    /// Create a zero-filled image of exactly `size` bytes and format it.
    /// An existing file at `image` is replaced.
    pub fn format_new(&self, image: impl AsRef<Path>, volume_name: &str, size: u64) -> Result<()> {
        let image = image.as_ref();
        if size == 0 {
            return Err(HfsError::InvalidSize(size));
        }
        // Claim the slot and check the name before touching the filesystem,
        // the image may belong to the mounted volume
        let _slot = self.claim()?;
        macroman::encode(volume_name)?;

        let mut output = BufWriter::new(File::create(image)?);
        io::copy(&mut io::repeat(0).take(size), &mut output)?;
        output.flush()?;
        drop(output);
        log::debug!("Created {} byte image at {}", size, image.display());

        self.format_claimed(image, volume_name)
    }
}
