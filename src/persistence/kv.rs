use super::files::{atomic_write, backup_file, read_file};
use anyhow::{Context, Result};
#[cfg(test)]
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

/// Durable string blobs under fixed keys
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>>;

    fn set(&mut self, key: &str, value: &str) -> Result<()>;

    /// Keep a copy of an unreadable value before it gets overwritten
    fn backup(&self, _key: &str) -> Result<()> {
        Ok(())
    }
}

/// One `<key>.json` file per key inside a directory
#[derive(Debug, Clone)]
pub struct FileKv {
    dir: PathBuf,
}

impl FileKv {
    pub fn open<P: AsRef<Path>>(dir: P) -> Result<Self> {
        let dir = dir.as_ref().to_path_buf();
        fs::create_dir_all(&dir)
            .with_context(|| format!("Failed to create directory: {}", dir.display()))?;
        Ok(Self { dir })
    }

    pub fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.json", key))
    }
}

impl KeyValueStore for FileKv {
    fn get(&self, key: &str) -> Result<Option<String>> {
        read_file(self.path_for(key))
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        atomic_write(self.path_for(key), value)
    }

    fn backup(&self, key: &str) -> Result<()> {
        let backup = backup_file(self.path_for(key))?;
        tracing::info!(key, path = %backup.display(), "backed up unreadable value");
        Ok(())
    }
}

/// In-memory store for tests
#[cfg(test)]
#[derive(Debug, Clone, Default)]
pub struct MemoryKv {
    values: HashMap<String, String>,
    /// When set, every write fails
    pub fail_writes: bool,
}

#[cfg(test)]
impl MemoryKv {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_value(key: &str, value: &str) -> Self {
        let mut kv = Self::new();
        kv.values.insert(key.to_string(), value.to_string());
        kv
    }
}

#[cfg(test)]
impl KeyValueStore for MemoryKv {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.values.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        if self.fail_writes {
            anyhow::bail!("write to {} refused", key);
        }
        self.values.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_kv_round_trip() {
        let temp_dir = tempfile::tempdir().unwrap();
        let mut kv = FileKv::open(temp_dir.path()).unwrap();

        assert!(kv.get("tasks").unwrap().is_none());
        kv.set("tasks", "[1,2]").unwrap();
        assert_eq!(kv.get("tasks").unwrap().as_deref(), Some("[1,2]"));
        assert!(kv.path_for("tasks").ends_with("tasks.json"));
    }

    #[test]
    fn test_file_kv_backup_keeps_original() {
        let temp_dir = tempfile::tempdir().unwrap();
        let mut kv = FileKv::open(temp_dir.path()).unwrap();
        kv.set("tasks", "not json").unwrap();

        kv.backup("tasks").unwrap();

        let backups = fs::read_dir(temp_dir.path())
            .unwrap()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_name().to_string_lossy().contains(".bak."))
            .count();
        assert_eq!(backups, 1);
        assert_eq!(kv.get("tasks").unwrap().as_deref(), Some("not json"));
    }

    #[test]
    fn test_memory_kv_fail_writes() {
        let mut kv = MemoryKv::new();
        kv.fail_writes = true;
        assert!(kv.set("tasks", "[]").is_err());
        assert!(kv.get("tasks").unwrap().is_none());
    }
}
