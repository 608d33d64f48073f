use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// One completed test, immutable once created.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TestResult {
    pub wpm: u32,
    pub accuracy: u32,
    pub mistakes: u32,
    pub timestamp: DateTime<Local>,
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("history file error: {0}")]
    Io(#[from] std::io::Error),
    #[error("history file is not valid JSON: {0}")]
    Corrupt(#[from] serde_json::Error),
}

/// On-disk layout of the persisted blob.
#[derive(Debug, Default, Serialize, Deserialize)]
struct HistoryBlob {
    results: Vec<TestResult>,
}

/// Append-only history of test results, insertion order preserved.
pub trait ResultStore {
    /// Add one record to the end of the persisted sequence.
    fn append(&mut self, result: &TestResult) -> Result<(), StoreError>;

    /// Full history in insertion order. The returned copy is detached from
    /// storage; mutating it does not affect stored state.
    fn all(&self) -> Vec<TestResult>;
}

/// Durable store backed by a single JSON file, read once at open and
/// rewritten in full after every append.
#[derive(Debug)]
pub struct JsonResultStore {
    path: PathBuf,
    results: Vec<TestResult>,
}

impl JsonResultStore {
    /// Open the store at `path`. A missing or unreadable blob yields an
    /// empty history rather than an error.
    pub fn open<P: AsRef<Path>>(path: P) -> Self {
        let path = path.as_ref().to_path_buf();
        let results = match fs::read(&path) {
            Ok(bytes) => serde_json::from_slice::<HistoryBlob>(&bytes)
                .map(|blob| blob.results)
                .unwrap_or_default(),
            Err(_) => Vec::new(),
        };
        Self { path, results }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn persist(&self) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let blob = HistoryBlob {
            results: self.results.clone(),
        };
        let data = serde_json::to_vec_pretty(&blob)?;
        fs::write(&self.path, data)?;
        Ok(())
    }
}

impl ResultStore for JsonResultStore {
    fn append(&mut self, result: &TestResult) -> Result<(), StoreError> {
        self.results.push(result.clone());
        self.persist()
    }

    fn all(&self) -> Vec<TestResult> {
        self.results.clone()
    }
}

/// In-memory fake for tests and headless runs.
#[derive(Debug, Default)]
pub struct MemoryResultStore {
    results: Vec<TestResult>,
}

impl MemoryResultStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ResultStore for MemoryResultStore {
    fn append(&mut self, result: &TestResult) -> Result<(), StoreError> {
        self.results.push(result.clone());
        Ok(())
    }

    fn all(&self) -> Vec<TestResult> {
        self.results.clone()
    }
}
