//! SSA: structured instructions, versioning, phi insertion and IR splitting

pub mod application;
pub mod domain;
pub mod infrastructure;
