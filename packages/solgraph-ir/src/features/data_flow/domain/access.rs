//! Read/write sets over plain and composite variable names

use std::collections::BTreeSet;

use serde::Serialize;

/// Names a block (or statement) reads and writes.
///
/// Names are plain identifiers or composites such as `s.x`, `m[k]`,
/// `m[k1][k2]`. Ordered sets keep every downstream pass deterministic.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AccessSet {
    pub reads: BTreeSet<String>,
    pub writes: BTreeSet<String>,
}

impl AccessSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn read(&mut self, name: impl Into<String>) {
        let name = name.into();
        if !name.is_empty() {
            self.reads.insert(name);
        }
    }

    pub fn write(&mut self, name: impl Into<String>) {
        let name = name.into();
        if !name.is_empty() {
            self.writes.insert(name);
        }
    }

    pub fn union_with(&mut self, other: &AccessSet) {
        self.reads.extend(other.reads.iter().cloned());
        self.writes.extend(other.writes.iter().cloned());
    }

    pub fn is_empty(&self) -> bool {
        self.reads.is_empty() && self.writes.is_empty()
    }

    /// Every name seen, read or written
    pub fn names(&self) -> impl Iterator<Item = &String> {
        self.reads.union(&self.writes)
    }
}

/// Plain identifier at the root of a composite name (`m` for `m[k].x`)
pub fn base_name(name: &str) -> &str {
    let end = name.find(|c| c == '.' || c == '[').unwrap_or(name.len());
    &name[..end]
}
