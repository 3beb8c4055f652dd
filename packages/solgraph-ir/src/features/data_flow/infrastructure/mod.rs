pub mod access_tracker;
pub mod composite;

pub use access_tracker::{block_accesses, statement_accesses, track_blocks, AccessTracker};
pub use composite::{access_path, composite_name, is_location, loop_counters};
