pub mod bfg;
pub mod cfg;

pub use bfg::{build_blocks, BlockBuilder};
pub use cfg::{
    back_edges, finalize_blocks, loop_headers, predecessor_map, reachable_from, refine_blocks,
    successors, to_graph, FlowBlock,
};
