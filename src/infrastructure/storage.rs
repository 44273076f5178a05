//! 持久化存储后端 - 基础设施层
//!
//! 只提供按键读 / 写 / 删字符串的能力，不关心字段类型和序列化。

use std::collections::HashMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use crate::error::StorageError;

/// 键值存储后端
///
/// 会话存储通过这个 trait 访问持久化介质，可以替换成任意实现。
/// 方法是同步的，调用方负责把写入放到阻塞线程池里执行。
pub trait StorageBackend: Send + Sync {
    /// 读取键值，键不存在时返回 `Ok(None)`
    fn read(&self, key: &str) -> Result<Option<String>, StorageError>;

    fn write(&self, key: &str, value: &str) -> Result<(), StorageError>;

    /// 删除键，键不存在不算错误
    fn remove(&self, key: &str) -> Result<(), StorageError>;
}

/// 目录存储：每个键对应目录下的一个 `<key>.json` 文件
#[derive(Debug, Clone)]
pub struct FileStorage {
    dir: PathBuf,
}

impl FileStorage {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.json", key))
    }
}

fn io_error(key: &str, source: std::io::Error) -> StorageError {
    StorageError::Io {
        key: key.to_string(),
        source,
    }
}

impl StorageBackend for FileStorage {
    fn read(&self, key: &str) -> Result<Option<String>, StorageError> {
        match fs::read_to_string(self.path_for(key)) {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(io_error(key, e)),
        }
    }

    fn write(&self, key: &str, value: &str) -> Result<(), StorageError> {
        fs::create_dir_all(&self.dir).map_err(|e| io_error(key, e))?;

        // 先写临时文件再改名，避免读到写了一半的内容
        let target = self.path_for(key);
        let tmp = self.dir.join(format!("{}.json.tmp", key));
        fs::write(&tmp, value).map_err(|e| io_error(key, e))?;
        fs::rename(&tmp, &target).map_err(|e| io_error(key, e))?;
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        match fs::remove_file(self.path_for(key)) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(io_error(key, e)),
        }
    }
}

/// 内存存储，进程退出即丢失
#[derive(Debug, Default)]
pub struct MemoryStorage {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.lock().map(|e| e.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn contains(&self, key: &str) -> bool {
        self.entries
            .lock()
            .map(|e| e.contains_key(key))
            .unwrap_or(false)
    }
}

impl StorageBackend for MemoryStorage {
    fn read(&self, key: &str) -> Result<Option<String>, StorageError> {
        let entries = self
            .entries
            .lock()
            .map_err(|_| StorageError::Unavailable("内存存储锁已损坏".to_string()))?;
        Ok(entries.get(key).cloned())
    }

    fn write(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let mut entries = self
            .entries
            .lock()
            .map_err(|_| StorageError::Unavailable("内存存储锁已损坏".to_string()))?;
        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        let mut entries = self
            .entries
            .lock()
            .map_err(|_| StorageError::Unavailable("内存存储锁已损坏".to_string()))?;
        entries.remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_file_storage_roundtrip_and_remove() {
        let dir = tempdir().expect("Failed to create temp dir");
        let storage = FileStorage::new(dir.path().join("session"));

        assert_eq!(storage.read("tubelens_searchResults").unwrap(), None);

        storage.write("tubelens_searchResults", r#"{"videos":[]}"#).unwrap();
        assert_eq!(
            storage.read("tubelens_searchResults").unwrap().as_deref(),
            Some(r#"{"videos":[]}"#)
        );
        assert!(dir.path().join("session/tubelens_searchResults.json").exists());
        assert!(!dir.path().join("session/tubelens_searchResults.json.tmp").exists());

        storage.remove("tubelens_searchResults").unwrap();
        assert_eq!(storage.read("tubelens_searchResults").unwrap(), None);

        // 删除不存在的键不报错
        storage.remove("tubelens_searchResults").unwrap();
    }

    #[test]
    fn test_memory_storage() {
        let storage = MemoryStorage::new();
        assert!(storage.is_empty());
        storage.write("k", "1").unwrap();
        storage.write("k", "2").unwrap();
        assert_eq!(storage.read("k").unwrap().as_deref(), Some("2"));
        assert_eq!(storage.len(), 1);
        storage.remove("k").unwrap();
        assert!(!storage.contains("k"));
    }
}
