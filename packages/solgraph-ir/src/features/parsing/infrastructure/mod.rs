pub mod ast_loader;
pub mod classifier;
pub mod forge;
pub mod project;
pub mod source_text;

pub use ast_loader::{load_ast_file, parse_ast_json};
pub use classifier::{classify_statement, classify_statements};
pub use forge::ForgeBuildTool;
pub use project::{
    build_project, find_ast_files, find_source_files, prepare_project, ProjectArtifacts,
};
pub use source_text::{call_arguments_text, expression_text, statement_text, type_name_text};
