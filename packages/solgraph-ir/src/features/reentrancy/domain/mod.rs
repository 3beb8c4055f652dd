mod finding;

pub use finding::{DetectionMode, Finding, Severity};
