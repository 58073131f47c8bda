//! Parsing of `hdir -i` listing lines
//!
//! hdir prints one line per item in one of two shapes:
//!
//! ```text
//!   12 f  APPL/ABCD         1024          512 Jan  1 12:00 MyApp
//!    7 d     3 items                          Jan  1 12:00 System Folder
//! ```
//!
//! Lines are matched as raw Mac OS Roman bytes. Names may contain any byte, so
//! fields are cut out first and decoded afterwards.

use regex::bytes::Regex;
use std::sync::LazyLock;

use super::error::{HfsError, Result};
use super::macroman;

/// Type and creator placeholder for directories
pub const NO_CODE: &str = "    ";

static FILE_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s-u)^ *([0-9]+) f  (....)/(....) +([0-9]+) +([0-9]+) ([^ ]...........) (.+)$")
        .unwrap()
});

static DIR_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s-u)^ *([0-9]+) d +([0-9]+) items? +([^ ]...........) (.+)$").unwrap()
});

/// One recognized listing line, before it is flattened into an [`ItemRecord`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListingLine {
    File {
        id: u64,
        type_code: String,
        creator_code: String,
        data_size: u64,
        rsrc_size: u64,
        date_modified: String,
        name: String,
    },
    Directory {
        id: u64,
        child_count: u64,
        date_modified: String,
        name: String,
    },
}

impl ListingLine {
    /// Parse a single line of `hdir -i` output. Trailing line terminators are ignored.
    pub fn parse(raw: &[u8]) -> Result<Self> {
        let line = trim_line_end(raw);
        let malformed = || HfsError::MalformedListingLine {
            line: macroman::decode(line),
        };

        if let Some(caps) = FILE_LINE.captures(line) {
            return Ok(ListingLine::File {
                id: parse_number(&caps[1]).ok_or_else(malformed)?,
                type_code: macroman::decode(&caps[2]),
                creator_code: macroman::decode(&caps[3]),
                data_size: parse_number(&caps[4]).ok_or_else(malformed)?,
                rsrc_size: parse_number(&caps[5]).ok_or_else(malformed)?,
                date_modified: macroman::decode(&caps[6]),
                name: macroman::decode(&caps[7]),
            });
        }

        if let Some(caps) = DIR_LINE.captures(line) {
            return Ok(ListingLine::Directory {
                id: parse_number(&caps[1]).ok_or_else(malformed)?,
                child_count: parse_number(&caps[2]).ok_or_else(malformed)?,
                date_modified: macroman::decode(&caps[3]),
                name: macroman::decode(&caps[4]),
            });
        }

        Err(malformed())
    }
}

/// A file or directory from a volume listing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemRecord {
    /// File number or directory ID (catalog ID)
    pub id: u64,
    pub name: String,
    pub is_file: bool,
    /// Four-character type code; [`NO_CODE`] for directories
    pub type_code: String,
    /// Four-character creator code; [`NO_CODE`] for directories
    pub creator_code: String,
    pub data_size: u64,
    pub rsrc_size: u64,
    /// Human-readable modification date. hdir has no machine-readable form.
    pub date_modified: String,
}

impl ItemRecord {
    /// Parse a single line of `hdir -i` output
    pub fn parse(raw: &[u8]) -> Result<Self> {
        ListingLine::parse(raw).map(ItemRecord::from)
    }

    pub fn is_directory(&self) -> bool {
        !self.is_file
    }

    /// Combined size of both forks
    pub fn total_size(&self) -> u64 {
        self.data_size.saturating_add(self.rsrc_size)
    }

    /// Get a display-friendly size string
    pub fn size_string(&self) -> String {
        if self.is_directory() {
            return String::new();
        }

        let size = self.total_size();
        if size < 1024 {
            format!("{} B", size)
        } else if size < 1024 * 1024 {
            format!("{:.1} KB", size as f64 / 1024.0)
        } else if size < 1024 * 1024 * 1024 {
            format!("{:.1} MB", size as f64 / (1024.0 * 1024.0))
        } else {
            format!("{:.2} GB", size as f64 / (1024.0 * 1024.0 * 1024.0))
        }
    }
}

impl From<ListingLine> for ItemRecord {
    fn from(line: ListingLine) -> Self {
        match line {
            ListingLine::File {
                id,
                type_code,
                creator_code,
                data_size,
                rsrc_size,
                date_modified,
                name,
            } => ItemRecord {
                id,
                name,
                is_file: true,
                type_code,
                creator_code,
                data_size,
                rsrc_size,
                date_modified,
            },
            ListingLine::Directory {
                id,
                date_modified,
                name,
                ..
            } => ItemRecord {
                id,
                name,
                is_file: false,
                type_code: NO_CODE.to_string(),
                creator_code: NO_CODE.to_string(),
                data_size: 0,
                rsrc_size: 0,
                date_modified,
            },
        }
    }
}

/// Parse a whole listing. Any bad line fails the entire listing.
pub fn parse_listing(output: &[u8]) -> Result<Vec<ItemRecord>> {
    output
        .split(|&b| b == b'\n')
        .filter(|line| !trim_line_end(line).is_empty())
        .map(ItemRecord::parse)
        .collect()
}

fn trim_line_end(line: &[u8]) -> &[u8] {
    let end = line
        .iter()
        .rposition(|&b| b != b'\r' && b != b'\n')
        .map_or(0, |i| i + 1);
    &line[..end]
}

fn parse_number(digits: &[u8]) -> Option<u64> {
    std::str::from_utf8(digits).ok()?.parse().ok()
}
