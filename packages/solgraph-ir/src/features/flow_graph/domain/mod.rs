mod block;

pub use block::{
    closing_terminator, is_revert, BasicBlock, BlockIdAllocator, BranchSide, LoopRole, Terminator,
};
