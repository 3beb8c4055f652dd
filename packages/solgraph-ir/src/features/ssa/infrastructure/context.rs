//! Per-function SSA version state

use std::collections::BTreeMap;

use crate::features::ssa::domain::SsaVar;

/// Version tables threaded through one function's SSA passes.
///
/// `version_counter` only grows; `current_version` is what a read sees.
/// Both default to 0 ("value on entry").
#[derive(Debug, Clone, Default)]
pub struct SsaBuildContext {
    pub version_counter: BTreeMap<String, u32>,
    pub current_version: BTreeMap<String, u32>,
    next_call_id: u32,
}

impl SsaBuildContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a name at version 0 without defining it
    pub fn seed(&mut self, name: &str) {
        self.version_counter.entry(name.to_string()).or_insert(0);
        self.current_version.entry(name.to_string()).or_insert(0);
    }

    pub fn current(&self, name: &str) -> u32 {
        self.current_version.get(name).copied().unwrap_or(0)
    }

    pub fn use_var(&self, name: &str) -> SsaVar {
        SsaVar::new(name, self.current(name))
    }

    /// New version for a write; it becomes the current one
    pub fn define(&mut self, name: &str) -> SsaVar {
        let version = self.allocate(name);
        self.current_version.insert(name.to_string(), version);
        SsaVar::new(name, version)
    }

    /// New version that does not become current (phi destinations)
    pub fn allocate(&mut self, name: &str) -> u32 {
        let counter = self.version_counter.entry(name.to_string()).or_insert(0);
        *counter += 1;
        *counter
    }

    /// Make an existing version current
    pub fn set_current(&mut self, name: &str, version: u32) {
        self.current_version.insert(name.to_string(), version);
    }

    /// Destination for a hoisted call result: `ret1_1`, `ret2_1`, ...
    pub fn fresh_call_dest(&mut self) -> SsaVar {
        self.next_call_id += 1;
        let name = format!("ret{}", self.next_call_id);
        self.define(&name)
    }

    /// Continue numbering after calls already present in a body
    pub fn reserve_call_ids(&mut self, at_least: u32) {
        self.next_call_id = self.next_call_id.max(at_least);
    }

    pub fn call_count(&self) -> u32 {
        self.next_call_id
    }

    pub fn snapshot(&self) -> BTreeMap<String, u32> {
        self.current_version.clone()
    }
}
