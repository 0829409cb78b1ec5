pub mod narrative;
pub mod pipeline;

pub use pipeline::{assemble_tasks, PR_APPROVAL_ITEM_ID};
