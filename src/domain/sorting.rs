use crate::domain::task::{Task, TaskStatus};
use std::cmp::Ordering;
use std::str::FromStr;

/// Fields available for sorting tasks
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortField {
    Id,
    Title,
    Status,
    Created,
    Updated,
    Order,
}

/// Sort order direction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    Ascending,
    Descending,
}

impl FromStr for SortField {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "id" => Ok(SortField::Id),
            "title" => Ok(SortField::Title),
            "status" => Ok(SortField::Status),
            "created" => Ok(SortField::Created),
            "updated" => Ok(SortField::Updated),
            "order" => Ok(SortField::Order),
            _ => Err(format!(
                "Invalid sort field '{}'. Valid fields: id, title, status, created, updated, order",
                s
            )),
        }
    }
}

impl FromStr for SortOrder {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "asc" => Ok(SortOrder::Ascending),
            "desc" => Ok(SortOrder::Descending),
            _ => Err(format!(
                "Invalid sort order '{}'. Valid orders: asc, desc",
                s
            )),
        }
    }
}

/// Sorts tasks in-place by the given field and direction.
///
/// The sort is stable, so tasks comparing equal keep their relative order.
///
/// # Examples
/// ```
/// use taskboard_core::domain::sorting::{sort_tasks, SortField, SortOrder};
/// use taskboard_core::domain::task::{Task, TaskId, TaskStatus};
///
/// let mut tasks = vec![
///     Task::new(TaskId::new(1), "A".to_string(), TaskStatus::Todo, 30.0),
///     Task::new(TaskId::new(2), "B".to_string(), TaskStatus::Todo, 10.0),
/// ];
///
/// sort_tasks(&mut tasks, SortField::Order, SortOrder::Ascending);
/// assert_eq!(tasks[0].id.as_str(), "TASK2");
/// ```
pub fn sort_tasks(tasks: &mut [Task], field: SortField, order: SortOrder) {
    tasks.sort_by(|a, b| {
        let cmp = match field {
            SortField::Id => a.id.number().cmp(&b.id.number()),
            SortField::Title => a.title.to_lowercase().cmp(&b.title.to_lowercase()),
            SortField::Status => compare_status(&a.status, &b.status),
            SortField::Created => a.created_at.cmp(&b.created_at),
            SortField::Updated => a.updated_at.cmp(&b.updated_at),
            SortField::Order => a.order().total_cmp(&b.order()),
        };

        match order {
            SortOrder::Ascending => cmp,
            SortOrder::Descending => cmp.reverse(),
        }
    });
}

/// Sorts a column into display order.
///
/// Order values decide the sequence. Tasks with equal order fall back to
/// insertion history: creation time, then ID number.
pub fn sort_by_position(tasks: &mut [Task]) {
    tasks.sort_by(|a, b| {
        a.order()
            .total_cmp(&b.order())
            .then_with(|| a.created_at.cmp(&b.created_at))
            .then_with(|| a.id.number().cmp(&b.id.number()))
    });
}

/// Compare task status by board column order
fn compare_status(a: &TaskStatus, b: &TaskStatus) -> Ordering {
    a.rank().cmp(&b.rank())
}
