mod build_tool;

pub use build_tool::BuildTool;
