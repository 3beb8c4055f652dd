mod access;

pub use access::{base_name, AccessSet};
