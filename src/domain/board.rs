use crate::domain::order::{OrderAllocator, Placement};
use crate::domain::sorting::sort_by_position;
use crate::domain::task::{Task, TaskId, TaskStatus};
use crate::error::{Result, TaskboardError};
use serde::{Deserialize, Serialize};

/// Configuration for a kanban board column
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Column {
    pub name: String,
    pub status: TaskStatus,
}

impl Column {
    pub fn new(name: impl Into<String>, status: TaskStatus) -> Self {
        Self {
            name: name.into(),
            status,
        }
    }
}

/// Board configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoardConfig {
    pub name: String,
    pub columns: Vec<Column>,
}

impl Default for BoardConfig {
    fn default() -> Self {
        Self {
            name: "Default Board".to_string(),
            columns: TaskStatus::ALL
                .iter()
                .map(|status| Column::new(status.to_string(), *status))
                .collect(),
        }
    }
}

/// Kanban board state
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Board {
    pub config: BoardConfig,
    pub next_task_number: u32,
}

impl Board {
    pub fn new(config: BoardConfig) -> Self {
        Self {
            config,
            next_task_number: 1,
        }
    }

    /// Generates the next task ID
    pub fn next_task_id(&mut self) -> TaskId {
        let id = TaskId::new(self.next_task_number);
        self.next_task_number += 1;
        id
    }

    /// Gets the column configuration for a status
    pub fn get_column_for_status(&self, status: &TaskStatus) -> Option<&Column> {
        self.config.columns.iter().find(|col| &col.status == status)
    }
}

impl Default for Board {
    fn default() -> Self {
        Self::new(BoardConfig::default())
    }
}

/// Order for a task added to the tail of `status`.
///
/// Uses the append slot for the column's current length. When moves have
/// left the tail beyond that slot, the task goes after the tail instead so
/// the column stays increasing.
pub fn new_task_order(allocator: &OrderAllocator, tasks: &[Task], status: TaskStatus) -> f64 {
    let orders = column_orders(tasks, status, None);
    let candidate = allocator.append_order(orders.len());

    match orders.last() {
        Some(&last) if candidate <= last => allocator.between(Some(last), None),
        _ => candidate,
    }
}

/// Placement for `task_id` dropped at `target_index` of the `to_status` column.
///
/// `target_index` counts positions in the destination column as shown
/// without the moved task.
pub fn move_order(
    allocator: &OrderAllocator,
    tasks: &[Task],
    task_id: &TaskId,
    to_status: TaskStatus,
    target_index: usize,
) -> Result<Placement> {
    if !tasks.iter().any(|t| &t.id == task_id) {
        return Err(TaskboardError::TaskNotFound(task_id.to_string()));
    }

    let orders = column_orders(tasks, to_status, Some(task_id));
    Ok(allocator.place(&orders, target_index))
}

/// Tasks in `status`, in display order
pub fn column_tasks(tasks: &[Task], status: TaskStatus) -> Vec<Task> {
    let mut column: Vec<Task> = tasks.iter().filter(|t| t.status == status).cloned().collect();
    sort_by_position(&mut column);
    column
}

/// Order values of a column in display order, optionally leaving one task out
pub fn column_orders(tasks: &[Task], status: TaskStatus, excluding: Option<&TaskId>) -> Vec<f64> {
    let mut orders: Vec<f64> = tasks
        .iter()
        .filter(|t| t.status == status && Some(&t.id) != excluding)
        .map(Task::order)
        .collect();
    orders.sort_by(f64::total_cmp);
    orders
}
