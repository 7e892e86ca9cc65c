use crate::{
    config::Settings,
    domain::{Board, Task, TaskId},
    error::{Result, TaskboardError},
    storage::Storage,
};
use async_trait::async_trait;
use std::{
    path::{Path, PathBuf},
    str::FromStr,
};
use tokio::fs;
use tracing::{debug, info, warn};

/// JSON file storage rooted at `<project>/.taskboard`
pub struct FileStorage {
    root_path: PathBuf,
}

impl FileStorage {
    pub const DATA_DIR: &'static str = ".taskboard";
    const TASKS_DIR: &'static str = "tasks";
    const BOARD_FILE: &'static str = "board.json";
    const CONFIG_FILE: &'static str = "config.toml";

    /// Creates a new FileStorage instance for the given project root
    pub fn new(project_root: impl AsRef<Path>) -> Self {
        Self {
            root_path: project_root.as_ref().join(Self::DATA_DIR),
        }
    }

    pub fn root_path(&self) -> &Path {
        &self.root_path
    }

    pub fn config_file(&self) -> PathBuf {
        self.root_path.join(Self::CONFIG_FILE)
    }

    fn tasks_dir(&self) -> PathBuf {
        self.root_path.join(Self::TASKS_DIR)
    }

    fn board_file(&self) -> PathBuf {
        self.root_path.join(Self::BOARD_FILE)
    }

    fn task_file(&self, id: &TaskId) -> PathBuf {
        self.tasks_dir().join(format!("{}.json", id.as_str()))
    }

    async fn ensure_directory_exists(&self, path: &Path) -> Result<()> {
        if !path.exists() {
            fs::create_dir_all(path).await?;
        }
        Ok(())
    }
}

#[async_trait]
impl Storage for FileStorage {
    async fn initialize(&self) -> Result<()> {
        self.ensure_directory_exists(&self.root_path).await?;
        self.ensure_directory_exists(&self.tasks_dir()).await?;

        if !self.board_file().exists() {
            self.save_board(&Board::default()).await?;
        }

        if !self.config_file().exists() {
            Settings::default().save(&self.config_file()).await?;
        }

        info!(path = %self.root_path.display(), "initialized task board storage");
        Ok(())
    }

    async fn save_task(&self, task: &Task) -> Result<()> {
        self.ensure_directory_exists(&self.tasks_dir()).await?;

        let json = serde_json::to_string_pretty(task)?;
        fs::write(self.task_file(&task.id), json).await?;

        debug!(id = %task.id, order = task.order(), "saved task");
        Ok(())
    }

    async fn load_task(&self, id: &TaskId) -> Result<Task> {
        let file_path = self.task_file(id);

        if !file_path.exists() {
            return Err(TaskboardError::TaskNotFound(id.to_string()));
        }

        let contents = fs::read_to_string(&file_path).await?;
        let task: Task = serde_json::from_str(&contents)?;

        Ok(task)
    }

    async fn list_task_ids(&self) -> Result<Vec<TaskId>> {
        let tasks_dir = self.tasks_dir();

        if !tasks_dir.exists() {
            return Ok(Vec::new());
        }

        let mut entries = fs::read_dir(&tasks_dir).await?;
        let mut ids: Vec<TaskId> = Vec::new();

        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if path.extension().and_then(|s| s.to_str()) != Some("json") {
                continue;
            }
            let Some(stem) = path.file_stem().and_then(|s| s.to_str()) else {
                continue;
            };
            match TaskId::from_str(stem) {
                Ok(id) => ids.push(id),
                Err(_) => warn!(file = %path.display(), "skipping file with invalid task ID"),
            }
        }

        ids.sort_by_key(TaskId::number);
        Ok(ids)
    }

    async fn delete_task(&self, id: &TaskId) -> Result<()> {
        let file_path = self.task_file(id);

        if !file_path.exists() {
            return Err(TaskboardError::TaskNotFound(id.to_string()));
        }

        fs::remove_file(file_path).await?;
        debug!(%id, "deleted task");
        Ok(())
    }

    async fn save_board(&self, board: &Board) -> Result<()> {
        self.ensure_directory_exists(&self.root_path).await?;

        let json = serde_json::to_string_pretty(board)?;
        fs::write(self.board_file(), json).await?;

        Ok(())
    }

    async fn load_board(&self) -> Result<Board> {
        let board_file = self.board_file();

        if !board_file.exists() {
            return Err(TaskboardError::BoardNotInitialized);
        }

        let contents = fs::read_to_string(&board_file).await?;
        let board: Board = serde_json::from_str(&contents)?;

        Ok(board)
    }

    async fn is_initialized(&self) -> bool {
        self.root_path.exists() && self.board_file().exists()
    }
}
