//! hfskit Library
//!
//! Typed access to classic Mac OS HFS disk images through hfsutils.

pub mod config;
pub mod timestamp;
pub mod volume;

pub use volume::{Hfs, HfsError, ItemRecord, MacPath, VolumeInfo, VolumeSession};
