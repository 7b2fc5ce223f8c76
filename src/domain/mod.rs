pub mod duration;
pub mod enums;
pub mod filter;
pub mod task;

pub use enums::{StatusFilter, TaskStatus, UiMode};
pub use task::{parse_tags, Comment, Task, TaskId, TaskPatch};
