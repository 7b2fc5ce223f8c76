use crate::domain::{Comment, Task, TaskId, TaskPatch};
use crate::error::{TrackerError, TrackerResult};
use crate::persistence::KeyValueStore;
use anyhow::Context;

/// Key under which the whole task collection is stored
pub const TASKS_KEY: &str = "tasks";

/// Ordered task collection, written through to a key-value store on every mutation
pub struct TaskStore {
    tasks: Vec<Task>,
    kv: Box<dyn KeyValueStore>,
}

impl TaskStore {
    /// Load the collection; an absent or malformed blob starts empty
    pub fn load(kv: Box<dyn KeyValueStore>) -> Self {
        let tasks = match kv.get(TASKS_KEY) {
            Ok(Some(content)) => match serde_json::from_str::<Vec<Task>>(&content) {
                Ok(tasks) => {
                    tracing::debug!(count = tasks.len(), "loaded tasks");
                    tasks
                }
                Err(e) => {
                    tracing::warn!(error = %e, "malformed task data, starting empty");
                    if let Err(e) = kv.backup(TASKS_KEY) {
                        tracing::warn!(error = %e, "could not back up malformed task data");
                    }
                    Vec::new()
                }
            },
            Ok(None) => Vec::new(),
            Err(e) => {
                tracing::warn!(error = %e, "could not read task data, starting empty");
                Vec::new()
            }
        };

        Self { tasks, kv }
    }

    /// All tasks in insertion order
    pub fn all(&self) -> &[Task] {
        &self.tasks
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    pub fn find(&self, id: &TaskId) -> Option<&Task> {
        self.tasks.iter().find(|t| &t.id == id)
    }

    pub fn contains(&self, id: &TaskId) -> bool {
        self.find(id).is_some()
    }

    fn find_mut(&mut self, id: &TaskId) -> TrackerResult<&mut Task> {
        self.tasks
            .iter_mut()
            .find(|t| &t.id == id)
            .ok_or_else(|| TrackerError::NotFound(id.clone()))
    }

    /// Append a new task; fails when the trimmed text is empty
    pub fn create(&mut self, text: &str) -> TrackerResult<Task> {
        let text = text.trim();
        if text.is_empty() {
            return Err(TrackerError::Validation("task text is empty".to_string()));
        }

        let task = Task::new(text.to_string());
        self.tasks.push(task.clone());
        tracing::info!(id = %task.id, "task created");
        self.persist()?;
        Ok(task)
    }

    /// Merge a patch into an existing task
    pub fn update(&mut self, id: &TaskId, patch: TaskPatch) -> TrackerResult<Task> {
        let task = self.find_mut(id)?;
        task.apply(patch);
        let updated = task.clone();
        self.persist()?;
        Ok(updated)
    }

    pub fn append_comment(&mut self, id: &TaskId, comment: Comment) -> TrackerResult<Task> {
        let task = self.find_mut(id)?;
        task.comments.push(comment);
        let updated = task.clone();
        self.persist()?;
        Ok(updated)
    }

    /// Remove a task; returns whether it existed
    pub fn delete(&mut self, id: &TaskId) -> TrackerResult<bool> {
        let before = self.tasks.len();
        self.tasks.retain(|t| &t.id != id);
        if self.tasks.len() == before {
            return Ok(false);
        }

        tracing::info!(id = %id, "task deleted");
        self.persist()?;
        Ok(true)
    }

    /// Serialize the whole collection and write it
    fn persist(&mut self) -> TrackerResult<()> {
        let json = serde_json::to_string(&self.tasks).context("Failed to serialize tasks")?;
        self.kv.set(TASKS_KEY, &json).map_err(|e| {
            tracing::error!(error = %e, "failed to persist tasks");
            TrackerError::Storage(e)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::TaskStatus;
    use crate::persistence::kv::MemoryKv;
    use crate::persistence::FileKv;
    use pretty_assertions::assert_eq;

    fn empty_store() -> TaskStore {
        TaskStore::load(Box::new(MemoryKv::new()))
    }

    #[test]
    fn test_create_rejects_blank_text() {
        let mut store = empty_store();
        assert!(matches!(store.create(""), Err(TrackerError::Validation(_))));
        assert!(matches!(store.create("   "), Err(TrackerError::Validation(_))));
        assert!(store.is_empty());
    }

    #[test]
    fn test_create_defaults() {
        let mut store = empty_store();
        let task = store.create("  buy milk ").unwrap();

        assert_eq!(task.text, "buy milk");
        assert_eq!(task.status, TaskStatus::ToDo);
        assert!(task.tags.is_empty());
        assert_eq!(task.duration, 0);
        assert_eq!(store.find(&task.id), Some(&task));
    }

    #[test]
    fn test_all_keeps_insertion_order() {
        let mut store = empty_store();
        for text in ["one", "two", "three"] {
            store.create(text).unwrap();
        }
        let texts: Vec<&str> = store.all().iter().map(|t| t.text.as_str()).collect();
        assert_eq!(texts, vec!["one", "two", "three"]);
    }

    #[test]
    fn test_update_normalizes_tags() {
        let mut store = empty_store();
        let task = store.create("task").unwrap();

        let updated = store
            .update(
                &task.id,
                TaskPatch {
                    tags: Some(vec![" x ".into(), "".into(), "y".into(), "x".into()]),
                    ..TaskPatch::default()
                },
            )
            .unwrap();

        assert_eq!(updated.tags, vec!["x".to_string(), "y".to_string()]);
        assert_eq!(store.find(&task.id).unwrap().tags, updated.tags);
    }

    #[test]
    fn test_update_unknown_id() {
        let mut store = empty_store();
        let missing = TaskId::from("missing");
        let err = store.update(&missing, TaskPatch::duration(5)).unwrap_err();
        assert!(matches!(err, TrackerError::NotFound(id) if id == missing));
    }

    #[test]
    fn test_delete() {
        let mut store = empty_store();
        let task = store.create("task").unwrap();

        assert!(store.delete(&task.id).unwrap());
        assert!(!store.delete(&task.id).unwrap());
        assert!(store.find(&task.id).is_none());
    }

    #[test]
    fn test_persists_and_reloads() {
        let temp_dir = tempfile::tempdir().unwrap();
        let id = {
            let mut store = TaskStore::load(Box::new(FileKv::open(temp_dir.path()).unwrap()));
            let task = store.create("persisted").unwrap();
            store.update(&task.id, TaskPatch::duration(90)).unwrap();
            task.id
        };

        let store = TaskStore::load(Box::new(FileKv::open(temp_dir.path()).unwrap()));
        let task = store.find(&id).unwrap();
        assert_eq!(task.text, "persisted");
        assert_eq!(task.duration, 90);
    }

    #[test]
    fn test_malformed_blob_loads_empty() {
        let store = TaskStore::load(Box::new(MemoryKv::with_value(TASKS_KEY, "{not json")));
        assert!(store.is_empty());

        let store = TaskStore::load(Box::new(MemoryKv::with_value(TASKS_KEY, r#"{"id": 1}"#)));
        assert!(store.is_empty());
    }

    #[test]
    fn test_malformed_file_is_backed_up() {
        let temp_dir = tempfile::tempdir().unwrap();
        let mut kv = FileKv::open(temp_dir.path()).unwrap();
        kv.set(TASKS_KEY, "garbage").unwrap();

        let store = TaskStore::load(Box::new(kv));
        assert!(store.is_empty());

        let backups = std::fs::read_dir(temp_dir.path())
            .unwrap()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_name().to_string_lossy().starts_with("tasks.bak."))
            .count();
        assert_eq!(backups, 1);
    }

    #[test]
    fn test_loads_legacy_format() {
        let blob = r#"[{"id":"1718000000000","text":"Legacy","completed":false,"status":"To Do",
            "tags":["a"],"duration":61,"attachment":"notes.txt","comments":[]}]"#;
        let store = TaskStore::load(Box::new(MemoryKv::with_value(TASKS_KEY, blob)));

        assert_eq!(store.len(), 1);
        let task = &store.all()[0];
        assert_eq!(task.id, TaskId::from("1718000000000"));
        assert_eq!(task.duration, 61);
        assert_eq!(task.attachment, "notes.txt");
    }

    #[test]
    fn test_failed_write_reports_storage_error() {
        let mut kv = MemoryKv::new();
        kv.fail_writes = true;
        let mut store = TaskStore::load(Box::new(kv));

        let err = store.create("kept in memory").unwrap_err();
        assert!(matches!(err, TrackerError::Storage(_)));
        assert_eq!(store.len(), 1);
    }
}
