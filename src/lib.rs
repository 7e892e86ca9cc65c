//! # Taskboard Core
//!
//! Ordering, storage and change-notification core for a kanban board kept
//! in local task files.
//!
//! Tasks are ordered within their column by a numeric order value. Moving a
//! task computes a new value from its new neighbors, so no other task is
//! rewritten. See [`domain::order`] for the allocation rules and their known
//! limits.

pub mod config;
pub mod domain;
pub mod error;
pub mod service;
pub mod storage;
pub mod watch;

// Re-export commonly used types
pub use config::{Settings, WatchSettings};
pub use domain::{
    board::{Board, BoardConfig, Column},
    order::{Bisection, OrderAllocator, OrderConfig, Placement},
    task::{Task, TaskId, TaskMetadata, TaskStatus},
};
pub use error::{Result, TaskboardError};
pub use service::TaskBoard;
pub use storage::{FileStorage, Storage};
pub use watch::{ChangeHandler, ChangeMessage, ChangeSource, WatchClient};
