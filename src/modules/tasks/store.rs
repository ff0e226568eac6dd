use std::path::{Path, PathBuf};
use std::sync::Mutex;

use log::warn;

use super::model::TaskRecord;
use crate::modules::auth::store::normalize_identifier;
use crate::modules::error::Error;

/// Read seam for task records. The sweep only ever reads; task CRUD
/// lives with whatever owns the store.
pub trait TodoStore: Send + Sync {
    fn list_by_owner(&self, identifier: &str) -> Result<Vec<TaskRecord>, Error>;
}

/// In-memory task store for tests and embedding
pub struct MemoryTodoStore {
    tasks: Mutex<Vec<TaskRecord>>,
}

impl MemoryTodoStore {
    pub fn new() -> Self {
        Self {
            tasks: Mutex::new(Vec::new()),
        }
    }

    pub fn add(&self, task: TaskRecord) -> Result<(), Error> {
        let mut tasks = self
            .tasks
            .lock()
            .map_err(|_| Error::Storage("todo store lock poisoned".to_string()))?;
        tasks.push(task);
        Ok(())
    }
}

impl Default for MemoryTodoStore {
    fn default() -> Self {
        Self::new()
    }
}

impl TodoStore for MemoryTodoStore {
    fn list_by_owner(&self, identifier: &str) -> Result<Vec<TaskRecord>, Error> {
        let tasks = self
            .tasks
            .lock()
            .map_err(|_| Error::Storage("todo store lock poisoned".to_string()))?;
        let key = normalize_identifier(identifier);
        Ok(tasks
            .iter()
            .filter(|task| normalize_identifier(&task.owner) == key)
            .cloned()
            .collect())
    }
}

/// File-backed task store used by the CLI. The file holds one flat task
/// list; a missing or corrupt file reads as empty.
pub struct JsonTodoStore {
    path: PathBuf,
}

impl JsonTodoStore {
    pub fn open(path: &Path) -> Self {
        Self {
            path: path.to_path_buf(),
        }
    }

    fn load(&self) -> Result<Vec<TaskRecord>, Error> {
        match std::fs::read_to_string(&self.path) {
            Ok(data) => match serde_json::from_str(&data) {
                Ok(parsed) => Ok(parsed),
                Err(e) => {
                    warn!(
                        "Task file {} is corrupt, treating as empty: {}",
                        self.path.display(),
                        e
                    );
                    Ok(Vec::new())
                }
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Vec::new()),
            Err(e) => Err(Error::IoError(e)),
        }
    }
}

impl TodoStore for JsonTodoStore {
    fn list_by_owner(&self, identifier: &str) -> Result<Vec<TaskRecord>, Error> {
        let key = normalize_identifier(identifier);
        Ok(self
            .load()?
            .into_iter()
            .filter(|task| normalize_identifier(&task.owner) == key)
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn task(owner: &str, description: &str) -> TaskRecord {
        TaskRecord {
            owner: owner.to_string(),
            description: description.to_string(),
            due_at: Some(1_000),
            completed: false,
        }
    }

    #[test]
    fn test_list_by_owner_filters() {
        let store = MemoryTodoStore::new();
        store.add(task("a@x.com", "one")).unwrap();
        store.add(task("b@x.com", "two")).unwrap();
        store.add(task("A@X.com", "three")).unwrap();

        let tasks = store.list_by_owner("a@x.com").unwrap();
        let descriptions: Vec<&str> = tasks.iter().map(|t| t.description.as_str()).collect();
        assert_eq!(descriptions, vec!["one", "three"]);

        assert!(store.list_by_owner("nobody@x.com").unwrap().is_empty());
    }

    #[test]
    fn test_json_store_reads_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("todos.json");

        let tasks = vec![task("a@x.com", "from disk"), task("b@x.com", "not mine")];
        std::fs::write(&path, serde_json::to_string_pretty(&tasks).unwrap()).unwrap();

        let store = JsonTodoStore::open(&path);
        let mine = store.list_by_owner("a@x.com").unwrap();
        assert_eq!(mine.len(), 1);
        assert_eq!(mine[0].description, "from disk");
    }

    #[test]
    fn test_json_store_tolerates_missing_and_corrupt_files() {
        let dir = TempDir::new().unwrap();

        let store = JsonTodoStore::open(&dir.path().join("absent.json"));
        assert!(store.list_by_owner("a@x.com").unwrap().is_empty());

        let path = dir.path().join("corrupt.json");
        std::fs::write(&path, "[ not json").unwrap();
        let store = JsonTodoStore::open(&path);
        assert!(store.list_by_owner("a@x.com").unwrap().is_empty());
    }
}
