// crates/test-utils/src/builders.rs

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Result;
use serde_json::{json, Map, Value};
use tempfile::TempDir;

/// A job file on disk, removed together with its directory on drop.
pub struct JobFile {
    _dir: TempDir,
    path: PathBuf,
}

impl JobFile {
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Write `contents` verbatim to `<tmp>/<name>.json`.
    pub fn raw(name: &str, contents: &str) -> Result<Self> {
        let dir = TempDir::new()?;
        let path = dir.path().join(format!("{name}.json"));
        fs::write(&path, contents)?;
        Ok(Self { _dir: dir, path })
    }
}

/// Builder for job files to simplify test setup.
pub struct JobFileBuilder {
    name: String,
    body: Map<String, Value>,
}

impl JobFileBuilder {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            body: Map::new(),
        }
    }

    pub fn command(mut self, command: &str) -> Self {
        self.body.insert("command".into(), json!(command));
        self
    }

    pub fn notify_url(mut self, url: &str) -> Self {
        self.body.insert("notify".into(), json!({ "url": url }));
        self
    }

    pub fn locking(mut self, lock_runner_path: &str, lock_dir: &str) -> Self {
        self.body.insert(
            "locking".into(),
            json!({ "lockRunnerPath": lock_runner_path, "lockDir": lock_dir }),
        );
        self
    }

    /// Requires [`JobFileBuilder::locking`] to have been called first.
    pub fn lock_retries(mut self, retries: i64, sleep_seconds: i64) -> Self {
        if let Some(Value::Object(locking)) = self.body.get_mut("locking") {
            locking.insert("retries".into(), json!(retries));
            locking.insert("sleepSeconds".into(), json!(sleep_seconds));
        }
        self
    }

    /// Set an arbitrary top-level key, for invalid-config cases.
    pub fn set(mut self, key: &str, value: Value) -> Self {
        self.body.insert(key.to_string(), value);
        self
    }

    pub fn to_json(&self) -> String {
        Value::Object(self.body.clone()).to_string()
    }

    pub fn write(self) -> Result<JobFile> {
        let contents = self.to_json();
        JobFile::raw(&self.name, &contents)
    }
}
