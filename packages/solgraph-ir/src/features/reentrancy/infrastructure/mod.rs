pub mod detector;

pub use detector::{is_reentrancy_guard, FunctionView, ReentrancyDetector};
