//! Source location types
//!
//! The compiler encodes positions as `"offset:length:fileIndex"` strings.
//! Only the offset takes part in line/column mapping.

use serde::{Deserialize, Serialize};

/// Byte range in a source file, as found in a node's `src` field
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SourceLocation {
    pub offset: i64,
    pub length: i64,
    pub file_index: i64,
}

impl SourceLocation {
    pub fn new(offset: i64, length: i64, file_index: i64) -> Self {
        Self {
            offset,
            length,
            file_index,
        }
    }

    /// Parse `"offset:length:fileIndex"`; malformed parts default to 0.
    pub fn parse(src: &str) -> Self {
        let mut parts = src.split(':').map(|p| p.trim().parse::<i64>().unwrap_or(0));
        Self {
            offset: parts.next().unwrap_or(0),
            length: parts.next().unwrap_or(0),
            file_index: parts.next().unwrap_or(0),
        }
    }

    /// 1-based (line, column) of the start offset within `source`
    pub fn line_col(&self, source: &str) -> (usize, usize) {
        offset_to_line_col(self.offset, source)
    }
}

impl std::fmt::Display for SourceLocation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}:{}", self.offset, self.length, self.file_index)
    }
}

/// Convert a byte offset into a 1-based (line, column) pair.
///
/// Line lengths are measured in UTF-8 bytes, newline included. Empty
/// sources, negative offsets and offsets past the end map to `(1, 1)`.
pub fn offset_to_line_col(offset: i64, source: &str) -> (usize, usize) {
    if source.is_empty() || offset < 0 {
        return (1, 1);
    }
    let offset = offset as usize;
    if offset >= source.len() {
        return (1, 1);
    }

    let mut line_start = 0usize;
    for (idx, line) in source.split_inclusive('\n').enumerate() {
        let line_end = line_start + line.len();
        if offset < line_end {
            return (idx + 1, offset - line_start + 1);
        }
        line_start = line_end;
    }

    (1, 1)
}
