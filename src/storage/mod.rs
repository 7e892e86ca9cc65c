use crate::{
    domain::{Board, Task, TaskId},
    error::Result,
};
use async_trait::async_trait;

pub mod file_storage;

pub use file_storage::FileStorage;

/// Storage trait for persisting tasks and board state
#[async_trait]
pub trait Storage: Send + Sync {
    /// Initializes the storage backend
    async fn initialize(&self) -> Result<()>;

    /// Saves a task
    async fn save_task(&self, task: &Task) -> Result<()>;

    /// Loads a task by ID
    async fn load_task(&self, id: &TaskId) -> Result<Task>;

    /// Lists all task IDs
    async fn list_task_ids(&self) -> Result<Vec<TaskId>>;

    /// Deletes a task
    async fn delete_task(&self, id: &TaskId) -> Result<()>;

    /// Saves the board state
    async fn save_board(&self, board: &Board) -> Result<()>;

    /// Loads the board state
    async fn load_board(&self) -> Result<Board>;

    /// Checks if the project is initialized
    async fn is_initialized(&self) -> bool;

    /// Loads every task
    async fn load_tasks(&self) -> Result<Vec<Task>> {
        let ids = self.list_task_ids().await?;
        let mut tasks = Vec::with_capacity(ids.len());
        for id in ids {
            tasks.push(self.load_task(&id).await?);
        }
        Ok(tasks)
    }
}
