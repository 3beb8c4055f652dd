pub mod call_classifier;
pub mod inliner;

pub use call_classifier::{callee_of, call_name, classify_call, is_struct_constructor, is_type_conversion, CallContext};
pub use inliner::{InlineOutcome, InlineTemplate, Inliner};
