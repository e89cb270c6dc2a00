//! Record store backing the predictor.
//!
//! Records are appended to one JSONL (JSON Lines) file per kind with file
//! locking to ensure safe concurrent access. The file is append-only: writing a
//! record whose `id` already exists supersedes the earlier line.

use crate::summary::record_id;
use crate::types::RawRecord;
use crate::{Error, Result};
use fs2::FileExt;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use uuid::Uuid;

/// Kind of record kept in the store
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordKind {
    Dog,
    Puppy,
    Medication,
    HealthIndicator,
}

impl RecordKind {
    fn file_name(self) -> &'static str {
        match self {
            RecordKind::Dog => "dogs.jsonl",
            RecordKind::Puppy => "puppies.jsonl",
            RecordKind::Medication => "medications.jsonl",
            RecordKind::HealthIndicator => "health_indicators.jsonl",
        }
    }
}

impl FromStr for RecordKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "dog" | "dogs" => Ok(RecordKind::Dog),
            "puppy" | "puppies" => Ok(RecordKind::Puppy),
            "medication" | "medications" | "med" | "meds" => Ok(RecordKind::Medication),
            "health" | "health_indicator" | "health-indicator" => Ok(RecordKind::HealthIndicator),
            other => Err(Error::Store(format!("Unknown record kind: {}", other))),
        }
    }
}

/// Generic record store the predictor reads from
pub trait RecordStore {
    /// Latest version of the record with the given id
    fn fetch(&self, kind: RecordKind, id: &str) -> Result<Option<RawRecord>>;

    /// Latest version of every record of a kind, in first-seen order
    fn list(&self, kind: RecordKind) -> Result<Vec<RawRecord>>;

    /// Insert or replace a record, assigning an id if it has none; returns the id
    fn insert(&mut self, kind: RecordKind, record: RawRecord) -> Result<String>;
}

/// JSONL-backed record store with file locking
pub struct JsonlStore {
    dir: PathBuf,
}

impl JsonlStore {
    /// Create a store rooted at `<data_dir>/records`
    pub fn open(data_dir: &Path) -> Self {
        Self {
            dir: data_dir.join("records"),
        }
    }

    /// Path of the file holding records of `kind`
    pub fn path_for(&self, kind: RecordKind) -> PathBuf {
        self.dir.join(kind.file_name())
    }
}

/// Read every record line from a JSONL file, skipping malformed lines
pub fn read_records(path: &Path) -> Result<Vec<RawRecord>> {
    if !path.exists() {
        return Ok(Vec::new());
    }

    let file = File::open(path)?;
    // Acquire shared lock for reading
    file.lock_shared()?;

    let reader = BufReader::new(&file);
    let mut records = Vec::new();

    for (line_num, line_result) in reader.lines().enumerate() {
        let line = line_result?;
        if line.trim().is_empty() {
            continue;
        }

        match serde_json::from_str::<RawRecord>(&line) {
            Ok(record) => records.push(record),
            Err(e) => {
                tracing::warn!(
                    "Skipping malformed record in {:?} at line {}: {}",
                    path,
                    line_num + 1,
                    e
                );
            }
        }
    }

    file.unlock()?;
    tracing::debug!("Read {} record lines from {:?}", records.len(), path);
    Ok(records)
}

/// Collapse record versions so the last line for each id wins
fn latest_versions(lines: Vec<RawRecord>) -> Vec<RawRecord> {
    let mut order: Vec<String> = Vec::new();
    let mut latest: HashMap<String, RawRecord> = HashMap::new();

    for record in lines {
        let Some(id) = record_id(&record) else {
            tracing::warn!("Skipping record without id");
            continue;
        };
        if !latest.contains_key(&id) {
            order.push(id.clone());
        }
        latest.insert(id, record);
    }

    order
        .into_iter()
        .filter_map(|id| latest.remove(&id))
        .collect()
}

impl RecordStore for JsonlStore {
    fn fetch(&self, kind: RecordKind, id: &str) -> Result<Option<RawRecord>> {
        let records = read_records(&self.path_for(kind))?;
        Ok(records
            .into_iter()
            .rev()
            .find(|record| record_id(record).as_deref() == Some(id)))
    }

    fn list(&self, kind: RecordKind) -> Result<Vec<RawRecord>> {
        Ok(latest_versions(read_records(&self.path_for(kind))?))
    }

    fn insert(&mut self, kind: RecordKind, mut record: RawRecord) -> Result<String> {
        let id = match record_id(&record) {
            Some(id) => id,
            None => {
                let id = Uuid::new_v4().to_string();
                record.insert("id".into(), serde_json::Value::String(id.clone()));
                id
            }
        };

        std::fs::create_dir_all(&self.dir)?;
        let path = self.path_for(kind);

        let file = OpenOptions::new().create(true).append(true).open(&path)?;

        // Acquire exclusive lock
        file.lock_exclusive()?;

        let mut writer = std::io::BufWriter::new(&file);
        let line = serde_json::to_string(&record)?;
        writer.write_all(line.as_bytes())?;
        writer.write_all(b"\n")?;
        writer.flush()?;
        drop(writer);

        file.unlock()?;

        tracing::debug!("Stored {:?} record {} in {:?}", kind, id, path);
        Ok(id)
    }
}
