//! Absolute Mac OS path handling
//!
//! Paths are colon separated: `Boot:`, `Boot:System Folder`,
//! `Boot:System Folder:Preferences`. A volume is written with a trailing
//! colon; any other trailing colon is redundant. All functions here operate on
//! decoded text and never touch the engine.
//!
//! Note that the semantics are close to, but not the same as,
//! `Path::parent` and `Path::file_name`.

use std::fmt;

/// Path component separator
pub const SEPARATOR: char = ':';

/// Normalize a path: drop trailing separators unless the path names a volume.
///
/// * `Boot:` -> `Boot:`
/// * `Boot:System Folder:` -> `Boot:System Folder`
/// * `Boot:SimpleText` -> `Boot:SimpleText`
pub fn normalize(path: &str) -> String {
    if !path.ends_with(SEPARATOR) {
        return path.to_string();
    }
    let trimmed = path.trim_end_matches(SEPARATOR);
    if trimmed.contains(SEPARATOR) {
        trimmed.to_string()
    } else {
        // Only the volume component is left
        format!("{}{}", trimmed, SEPARATOR)
    }
}

/// Path of the volume or directory containing `path`, or `None` for a volume.
///
/// * `Boot:` -> `None`
/// * `Boot:System Folder` -> `Boot:`
/// * `Boot:System Folder:Preferences` -> `Boot:System Folder`
pub fn parent(path: &str) -> Option<String> {
    let path = normalize(path);
    if path.ends_with(SEPARATOR) {
        return None;
    }
    let (parent, _) = path.rsplit_once(SEPARATOR)?;
    if parent.contains(SEPARATOR) {
        Some(parent.to_string())
    } else {
        Some(format!("{}{}", parent, SEPARATOR))
    }
}

/// Final component of `path`; the volume name if `path` is a volume.
///
/// * `Boot:` -> `Boot`
/// * `Boot:System Folder` -> `System Folder`
/// * `Boot:System Folder:` -> `System Folder`
pub fn leaf_name(path: &str) -> &str {
    let path = path.trim_end_matches(SEPARATOR);
    match path.rsplit_once(SEPARATOR) {
        Some((_, leaf)) => leaf,
        None => path,
    }
}

/// Whether `path` names a volume (`Boot:`)
pub fn is_volume(path: &str) -> bool {
    normalize(path).ends_with(SEPARATOR)
}

/// An absolute Mac OS path, stored in normalized form
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MacPath(String);

impl MacPath {
    pub fn new(path: impl AsRef<str>) -> Self {
        Self(normalize(path.as_ref()))
    }

    /// Path to the root of the named volume
    pub fn volume(name: &str) -> Self {
        Self(format!("{}{}", name, SEPARATOR))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_volume(&self) -> bool {
        self.0.ends_with(SEPARATOR)
    }

    pub fn parent(&self) -> Option<MacPath> {
        parent(&self.0).map(MacPath)
    }

    pub fn leaf_name(&self) -> &str {
        leaf_name(&self.0)
    }

    /// Name of the volume this path lives on
    pub fn volume_name(&self) -> &str {
        self.0.split(SEPARATOR).next().unwrap_or_default()
    }

    /// Append a child name. A name containing `:` adds more than one level.
    pub fn join(&self, name: &str) -> MacPath {
        if self.is_volume() {
            MacPath::new(format!("{}{}", self.0, name))
        } else {
            MacPath::new(format!("{}{}{}", self.0, SEPARATOR, name))
        }
    }
}

impl AsRef<str> for MacPath {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<&str> for MacPath {
    fn from(path: &str) -> Self {
        MacPath::new(path)
    }
}

impl From<String> for MacPath {
    fn from(path: String) -> Self {
        MacPath::new(path)
    }
}

impl fmt::Display for MacPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
