pub mod board;
pub mod order;
pub mod sorting;
pub mod task;

pub use board::{column_orders, column_tasks, move_order, new_task_order, Board, BoardConfig, Column};
pub use order::{Bisection, OrderAllocator, OrderConfig, Placement};
pub use sorting::{sort_by_position, sort_tasks, SortField, SortOrder};
pub use task::{Task, TaskId, TaskMetadata, TaskStatus};
