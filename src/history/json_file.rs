use crate::history::traits::{HistoryError, HistoryResult, HistoryStore, ScanRecord};
use crate::url::normalize_url;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// History kept as one JSON array in a flat file
///
/// Every append loads the full list, pushes the record and rewrites the
/// file. A single lock serializes these read-modify-write cycles within the
/// process; separate processes sharing the file are not coordinated.
#[derive(Debug)]
pub struct JsonFileHistory {
    path: PathBuf,
    lock: Mutex<()>,
}

impl JsonFileHistory {
    /// Creates a store backed by `path`; the file is created on first write
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load(&self) -> HistoryResult<Vec<ScanRecord>> {
        let content = match std::fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };
        if content.trim().is_empty() {
            return Ok(Vec::new());
        }
        Ok(serde_json::from_str(&content)?)
    }

    fn persist(&self, records: &[ScanRecord]) -> HistoryResult<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_vec_pretty(records)?;

        // Write next to the target and rename so readers never see a torn file.
        let mut staging = self.path.clone().into_os_string();
        staging.push(".tmp");
        let staging = PathBuf::from(staging);
        std::fs::write(&staging, json)?;
        std::fs::rename(&staging, &self.path)?;
        Ok(())
    }
}

/// Canonical form used to match history entries
fn history_key(url: &str) -> String {
    normalize_url(url)
        .map(|u| u.to_string())
        .unwrap_or_else(|_| url.trim().to_string())
}

impl HistoryStore for JsonFileHistory {
    fn add_record(&self, record: ScanRecord) -> HistoryResult<()> {
        let _guard = self.lock.lock().map_err(|_| HistoryError::Poisoned)?;
        let mut records = self.load()?;
        records.push(record);
        self.persist(&records)?;
        tracing::debug!(
            "Appended history record ({} total) to {}",
            records.len(),
            self.path.display()
        );
        Ok(())
    }

    fn get_history(&self, url: &str) -> HistoryResult<Vec<ScanRecord>> {
        let key = history_key(url);
        let _guard = self.lock.lock().map_err(|_| HistoryError::Poisoned)?;

        let mut matching: Vec<ScanRecord> = self
            .load()?
            .into_iter()
            .rev()
            .filter(|r| history_key(&r.url) == key)
            .collect();
        // Stable sort keeps later appends first among equal timestamps.
        matching.sort_by(|a, b| b.checked_at.cmp(&a.checked_at));
        Ok(matching)
    }
}
