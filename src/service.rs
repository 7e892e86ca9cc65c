//! Board operations backed by a [`Storage`] implementation.
//!
//! Every mutation recomputes only the touched task's order and persists just
//! that task. Loaded tasks are cached until a mutation or a file-change
//! notification invalidates them. Mutations run one at a time so the task
//! counter in `board.json` is never read twice before it is written.

use crate::config::Settings;
use crate::domain::{
    board::{column_tasks, move_order, new_task_order},
    Column, OrderAllocator, Task, TaskId, TaskStatus,
};
use crate::error::{Result, TaskboardError};
use crate::storage::{FileStorage, Storage};
use crate::watch::{ChangeHandler, ChangeMessage};
use async_trait::async_trait;
use std::path::Path;
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, info, warn};

pub struct TaskBoard<S> {
    storage: S,
    settings: Settings,
    allocator: OrderAllocator,
    cache: RwLock<Option<Vec<Task>>>,
    writes: Mutex<()>,
}

impl TaskBoard<FileStorage> {
    /// Opens the board of an initialized project, reading its `config.toml`
    pub async fn open(project_root: impl AsRef<Path>) -> Result<Self> {
        let storage = FileStorage::new(project_root);
        if !storage.is_initialized().await {
            return Err(TaskboardError::BoardNotInitialized);
        }

        let settings = Settings::load_or_default(storage.root_path()).await?;
        Self::new(storage, settings)
    }
}

impl<S: Storage> TaskBoard<S> {
    pub fn new(storage: S, settings: Settings) -> Result<Self> {
        settings.validate()?;

        Ok(Self {
            allocator: OrderAllocator::new(settings.order),
            storage,
            settings,
            cache: RwLock::new(None),
            writes: Mutex::new(()),
        })
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn allocator(&self) -> &OrderAllocator {
        &self.allocator
    }

    /// All tasks, from cache when it is fresh
    pub async fn tasks(&self) -> Result<Vec<Task>> {
        if let Some(tasks) = self.cache.read().await.as_ref() {
            return Ok(tasks.clone());
        }

        // Held across the load: a concurrent invalidation lands after it
        let mut cache = self.cache.write().await;
        if let Some(tasks) = cache.as_ref() {
            return Ok(tasks.clone());
        }

        let tasks = self.storage.load_tasks().await?;
        debug!(count = tasks.len(), "loaded tasks");
        *cache = Some(tasks.clone());
        Ok(tasks)
    }

    /// Drops cached tasks so the next read goes to storage
    pub async fn invalidate(&self) {
        *self.cache.write().await = None;
    }

    /// Tasks of one column in display order
    pub async fn column(&self, status: TaskStatus) -> Result<Vec<Task>> {
        let tasks = self.tasks().await?;
        Ok(column_tasks(&tasks, status))
    }

    /// Every configured column with its tasks, in board order
    pub async fn columns(&self) -> Result<Vec<(Column, Vec<Task>)>> {
        let board = self.storage.load_board().await?;
        let tasks = self.tasks().await?;

        Ok(board
            .config
            .columns
            .into_iter()
            .map(|column| {
                let in_column = column_tasks(&tasks, column.status);
                (column, in_column)
            })
            .collect())
    }

    /// Creates a task at the bottom of `status`
    pub async fn create_task(&self, title: impl Into<String>, status: TaskStatus) -> Result<Task> {
        let _guard = self.writes.lock().await;
        let mut board = self.storage.load_board().await?;
        let tasks = self.tasks().await?;

        let id = board.next_task_id();
        let order = new_task_order(&self.allocator, &tasks, status);
        let task = Task::new(id, title.into(), status, order);

        self.storage.save_task(&task).await?;
        self.storage.save_board(&board).await?;
        self.invalidate().await;

        info!(id = %task.id, %status, order, "created task");
        Ok(task)
    }

    /// Moves a task to `target_index` of the `to_status` column.
    ///
    /// `target_index` is the drop position among the column's other tasks.
    /// Only the moved task is rewritten.
    pub async fn move_task(
        &self,
        id: &TaskId,
        to_status: TaskStatus,
        target_index: usize,
    ) -> Result<Task> {
        let _guard = self.writes.lock().await;
        let tasks = self.tasks().await?;
        let placement = move_order(&self.allocator, &tasks, id, to_status, target_index)?;

        if placement.is_degenerate() {
            warn!(
                %id,
                order = placement.order,
                prev = ?placement.prev,
                next = ?placement.next,
                "order spacing exhausted, task ties with a neighbor"
            );
        }

        let mut task = tasks
            .into_iter()
            .find(|t| &t.id == id)
            .ok_or_else(|| TaskboardError::TaskNotFound(id.to_string()))?;
        task.move_to(to_status, placement.order);

        self.storage.save_task(&task).await?;
        self.invalidate().await;

        info!(%id, %to_status, target_index, order = placement.order, "moved task");
        Ok(task)
    }

    pub async fn delete_task(&self, id: &TaskId) -> Result<()> {
        let _guard = self.writes.lock().await;
        self.storage.delete_task(id).await?;
        self.invalidate().await;
        info!(%id, "deleted task");
        Ok(())
    }
}

#[async_trait]
impl<S: Storage> ChangeHandler for TaskBoard<S> {
    async fn on_invalidate(&self, changes: Vec<ChangeMessage>) {
        debug!(changes = changes.len(), "task files changed on disk");
        self.invalidate().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Board, OrderConfig};
    use std::sync::Arc;
    use tempfile::TempDir;
    use tokio::sync::{oneshot, Notify};

    async fn setup(order: OrderConfig) -> (TempDir, TaskBoard<FileStorage>) {
        let temp_dir = TempDir::new().unwrap();
        let storage = FileStorage::new(temp_dir.path());
        storage.initialize().await.unwrap();

        let settings = Settings {
            order,
            ..Settings::default()
        };
        (temp_dir, TaskBoard::new(storage, settings).unwrap())
    }

    fn orders(tasks: &[Task]) -> Vec<f64> {
        tasks.iter().map(Task::order).collect()
    }

    fn titles(tasks: &[Task]) -> Vec<&str> {
        tasks.iter().map(|t| t.title.as_str()).collect()
    }

    #[tokio::test]
    async fn test_open_requires_initialization() {
        let temp_dir = TempDir::new().unwrap();

        let result = TaskBoard::<FileStorage>::open(temp_dir.path()).await;
        assert!(matches!(result, Err(TaskboardError::BoardNotInitialized)));

        FileStorage::new(temp_dir.path()).initialize().await.unwrap();
        let board = TaskBoard::<FileStorage>::open(temp_dir.path()).await.unwrap();
        assert_eq!(board.settings(), &Settings::default());
    }

    #[tokio::test]
    async fn test_open_reads_order_settings() {
        let temp_dir = TempDir::new().unwrap();
        let storage = FileStorage::new(temp_dir.path());
        storage.initialize().await.unwrap();
        tokio::fs::write(storage.config_file(), "[order]\ngap = 10.0\n")
            .await
            .unwrap();

        let board = TaskBoard::<FileStorage>::open(temp_dir.path()).await.unwrap();
        assert_eq!(board.allocator().gap(), 10.0);
    }

    #[tokio::test]
    async fn test_create_tasks_append_to_column() {
        let (_temp_dir, board) = setup(OrderConfig::default()).await;

        for title in ["A", "B", "C"] {
            board.create_task(title, TaskStatus::Todo).await.unwrap();
        }
        let first_done = board.create_task("D", TaskStatus::Done).await.unwrap();

        let todo = board.column(TaskStatus::Todo).await.unwrap();
        assert_eq!(titles(&todo), vec!["A", "B", "C"]);
        assert_eq!(orders(&todo), vec![10_000.0, 20_000.0, 30_000.0]);
        assert_eq!(first_done.order(), 10_000.0);
        assert_eq!(first_done.id.as_str(), "TASK4");
    }

    #[tokio::test]
    async fn test_move_between_neighbors() {
        let (_temp_dir, board) = setup(OrderConfig::compact()).await;

        board.create_task("A", TaskStatus::Todo).await.unwrap();
        board.create_task("B", TaskStatus::Todo).await.unwrap();
        board.create_task("C", TaskStatus::Todo).await.unwrap();
        let d = board.create_task("D", TaskStatus::Backlog).await.unwrap();

        let moved = board.move_task(&d.id, TaskStatus::Todo, 1).await.unwrap();
        assert_eq!(moved.order(), 15.0);
        assert_eq!(moved.status, TaskStatus::Todo);

        let todo = board.column(TaskStatus::Todo).await.unwrap();
        assert_eq!(titles(&todo), vec!["A", "D", "B", "C"]);
        assert_eq!(orders(&todo), vec![10.0, 15.0, 20.0, 30.0]);
        assert!(board.column(TaskStatus::Backlog).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_move_to_head_and_tail() {
        let (_temp_dir, board) = setup(OrderConfig::default()).await;

        let a = board.create_task("A", TaskStatus::Todo).await.unwrap();
        board.create_task("B", TaskStatus::Todo).await.unwrap();
        let c = board.create_task("C", TaskStatus::Todo).await.unwrap();

        let moved = board.move_task(&c.id, TaskStatus::Todo, 0).await.unwrap();
        assert_eq!(moved.order(), 5_000.0);

        let moved = board.move_task(&a.id, TaskStatus::Todo, 99).await.unwrap();
        assert_eq!(moved.order(), 30_000.0);

        let todo = board.column(TaskStatus::Todo).await.unwrap();
        assert_eq!(titles(&todo), vec!["C", "B", "A"]);
    }

    #[tokio::test]
    async fn test_repeated_moves_exhaust_spacing() {
        let (_temp_dir, board) = setup(OrderConfig::compact()).await;

        board.create_task("First", TaskStatus::Todo).await.unwrap();
        board.create_task("Second", TaskStatus::Todo).await.unwrap();
        let mut movers = Vec::new();
        for n in 0..4 {
            let task = board
                .create_task(format!("Mover {}", n), TaskStatus::Backlog)
                .await
                .unwrap();
            movers.push(task);
        }

        // Each mover drops directly below "First"
        let mut produced = Vec::new();
        for mover in &movers {
            let moved = board.move_task(&mover.id, TaskStatus::Todo, 1).await.unwrap();
            produced.push(moved.order());
        }

        assert_eq!(produced, vec![15.0, 12.0, 11.0, 10.0]);

        let todo = board.column(TaskStatus::Todo).await.unwrap();
        assert_eq!(todo.len(), 6);
        assert_eq!(todo[0].order(), todo[1].order());
    }

    #[tokio::test]
    async fn test_move_missing_task() {
        let (_temp_dir, board) = setup(OrderConfig::default()).await;

        let result = board.move_task(&TaskId::new(7), TaskStatus::Done, 0).await;
        assert!(matches!(result, Err(TaskboardError::TaskNotFound(_))));
    }

    #[tokio::test]
    async fn test_columns_follow_board_order() {
        let (_temp_dir, board) = setup(OrderConfig::default()).await;

        board.create_task("Ship", TaskStatus::Done).await.unwrap();
        board.create_task("Plan", TaskStatus::Backlog).await.unwrap();

        let columns = board.columns().await.unwrap();
        let statuses: Vec<TaskStatus> = columns.iter().map(|(c, _)| c.status).collect();
        assert_eq!(statuses, TaskStatus::ALL.to_vec());
        assert_eq!(titles(&columns[0].1), vec!["Plan"]);
        assert_eq!(titles(&columns[4].1), vec!["Ship"]);
    }

    #[tokio::test]
    async fn test_cache_refreshes_on_invalidation() {
        let (_temp_dir, board) = setup(OrderConfig::default()).await;

        board.create_task("A", TaskStatus::Todo).await.unwrap();
        assert_eq!(board.tasks().await.unwrap().len(), 1);

        // Written behind the board's back, as another process would
        let external = Task::new(TaskId::new(50), "External".to_string(), TaskStatus::Todo, 1.0);
        board.storage().save_task(&external).await.unwrap();
        assert_eq!(board.tasks().await.unwrap().len(), 1);

        board
            .on_invalidate(vec![ChangeMessage::Add {
                path: Some("tasks/TASK50.json".to_string()),
            }])
            .await;

        let todo = board.column(TaskStatus::Todo).await.unwrap();
        assert_eq!(titles(&todo), vec!["External", "A"]);
    }

    #[tokio::test]
    async fn test_delete_task() {
        let (_temp_dir, board) = setup(OrderConfig::default()).await;

        let task = board.create_task("A", TaskStatus::Todo).await.unwrap();
        board.delete_task(&task.id).await.unwrap();

        assert!(board.tasks().await.unwrap().is_empty());
        assert!(matches!(
            board.delete_task(&task.id).await,
            Err(TaskboardError::TaskNotFound(_))
        ));
    }

    /// File storage whose first `load_tasks` takes its snapshot and then
    /// waits to be released before returning it.
    struct GatedStorage {
        inner: FileStorage,
        entered: Arc<Notify>,
        release: std::sync::Mutex<Option<oneshot::Receiver<()>>>,
    }

    #[async_trait]
    impl Storage for GatedStorage {
        async fn initialize(&self) -> Result<()> {
            self.inner.initialize().await
        }

        async fn save_task(&self, task: &Task) -> Result<()> {
            self.inner.save_task(task).await
        }

        async fn load_task(&self, id: &TaskId) -> Result<Task> {
            self.inner.load_task(id).await
        }

        async fn list_task_ids(&self) -> Result<Vec<TaskId>> {
            self.inner.list_task_ids().await
        }

        async fn delete_task(&self, id: &TaskId) -> Result<()> {
            self.inner.delete_task(id).await
        }

        async fn save_board(&self, board: &Board) -> Result<()> {
            self.inner.save_board(board).await
        }

        async fn load_board(&self) -> Result<Board> {
            self.inner.load_board().await
        }

        async fn is_initialized(&self) -> bool {
            self.inner.is_initialized().await
        }

        async fn load_tasks(&self) -> Result<Vec<Task>> {
            let snapshot = self.inner.load_tasks().await?;
            let gate = self.release.lock().unwrap().take();
            if let Some(gate) = gate {
                self.entered.notify_one();
                let _ = gate.await;
            }
            Ok(snapshot)
        }
    }

    #[tokio::test]
    async fn test_invalidation_during_load_is_not_lost() {
        let temp_dir = TempDir::new().unwrap();
        let inner = FileStorage::new(temp_dir.path());
        inner.initialize().await.unwrap();

        let entered = Arc::new(Notify::new());
        let (release_tx, release_rx) = oneshot::channel();
        let storage = GatedStorage {
            inner,
            entered: entered.clone(),
            release: std::sync::Mutex::new(Some(release_rx)),
        };
        let board = Arc::new(TaskBoard::new(storage, Settings::default()).unwrap());

        let loading = tokio::spawn({
            let board = board.clone();
            async move { board.tasks().await.unwrap().len() }
        });
        entered.notified().await;

        // A file lands and its notification arrives while the load is in flight
        let external = Task::new(TaskId::new(1), "External".to_string(), TaskStatus::Todo, 1.0);
        board.storage().inner.save_task(&external).await.unwrap();
        let invalidating = tokio::spawn({
            let board = board.clone();
            async move {
                board
                    .on_invalidate(vec![ChangeMessage::Add { path: None }])
                    .await
            }
        });
        tokio::task::yield_now().await;

        release_tx.send(()).unwrap();
        assert_eq!(loading.await.unwrap(), 0);
        invalidating.await.unwrap();

        assert_eq!(board.tasks().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_concurrent_creates_get_distinct_ids() {
        let (_temp_dir, board) = setup(OrderConfig::default()).await;

        let (a, b) = tokio::join!(
            board.create_task("A", TaskStatus::Todo),
            board.create_task("B", TaskStatus::Todo)
        );
        let (a, b) = (a.unwrap(), b.unwrap());

        assert_ne!(a.id, b.id);
        assert_ne!(a.order(), b.order());
        board.invalidate().await;
        assert_eq!(board.tasks().await.unwrap().len(), 2);
        assert_eq!(board.storage().load_board().await.unwrap().next_task_number, 3);
    }

    #[tokio::test]
    async fn test_new_rejects_invalid_settings() {
        let temp_dir = TempDir::new().unwrap();
        let settings = Settings {
            order: OrderConfig::default().with_gap(0.0),
            ..Settings::default()
        };

        let result = TaskBoard::new(FileStorage::new(temp_dir.path()), settings);
        assert!(matches!(
            result,
            Err(TaskboardError::InvalidConfig { .. })
        ));
    }
}
