//! HFS Standard volume access
//!
//! Wraps the hfsutils command line programs in a typed interface: mount a disk
//! image, list and inspect its catalog, and copy files onto it.

mod error;
pub mod engine;
pub mod listing;
pub mod macroman;
pub mod ops;
pub mod path;
pub mod session;

pub use engine::{CopyMode, Engine, EngineCommand, EngineOutput, HfsUtils};
pub use error::{HfsError, Result};
pub use listing::{ItemRecord, ListingLine};
pub use ops::Listing;
pub use path::MacPath;
pub use session::{Hfs, VolumeInfo, VolumeSession};
