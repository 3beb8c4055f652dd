//! Data flow: read/write sets over plain and composite names

pub mod domain;
pub mod infrastructure;
