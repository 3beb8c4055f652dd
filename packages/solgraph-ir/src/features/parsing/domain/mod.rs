mod statement;

pub use statement::{StatementKind, TypedStatement};
