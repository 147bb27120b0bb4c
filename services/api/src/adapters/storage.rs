//! services/api/src/adapters/storage.rs
//!
//! This module contains the persistence adapter: the concrete implementations
//! of the `ScriptStore` and `DraftStore` ports from the `core` crate, layered
//! over a minimal key-value capability with a durable (file-backed) and an
//! ephemeral (in-memory) backend.

use chrono::{DateTime, Utc};
use script_studio_core::domain::{NewScript, SavedScript, ScriptDraft};
use script_studio_core::ports::{DraftStore, PortError, PortResult, ScriptStore};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;
use std::sync::{Arc, Mutex, PoisonError};
use tracing::warn;
use uuid::Uuid;

/// Storage key for the durable script collection.
pub const SCRIPTS_KEY: &str = "saved_scripts";
/// Storage key for the single-slot ephemeral draft.
pub const DRAFT_KEY: &str = "draft";

//=========================================================================================
// The Key-Value Capability
//=========================================================================================

/// A minimal key-value capability. The typed adapters above it never see the
/// storage engine, only this interface.
pub trait StorageBackend: Send + Sync {
    fn get(&self, key: &str) -> PortResult<Option<String>>;
    fn set(&self, key: &str, value: &str) -> PortResult<()>;
    fn remove(&self, key: &str) -> PortResult<()>;
}

/// A durable backend storing one JSON document per key under a data directory.
///
/// Writes go to a sibling temp file first and are renamed into place, so an
/// interrupted write never truncates the previous document. The internal lock
/// serializes the read-modify-write cycles of the adapters above.
pub struct FileBackend {
    dir: PathBuf,
    lock: Mutex<()>,
}

impl FileBackend {
    /// Opens (and creates, if needed) the data directory.
    pub fn new(dir: PathBuf) -> PortResult<Self> {
        fs::create_dir_all(&dir).map_err(|e| PortError::Storage(e.to_string()))?;
        Ok(Self {
            dir,
            lock: Mutex::new(()),
        })
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.json", key))
    }
}

impl StorageBackend for FileBackend {
    fn get(&self, key: &str) -> PortResult<Option<String>> {
        let _guard = self.lock.lock().unwrap_or_else(PoisonError::into_inner);
        match fs::read_to_string(self.path_for(key)) {
            Ok(data) => Ok(Some(data)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(PortError::Storage(e.to_string())),
        }
    }

    fn set(&self, key: &str, value: &str) -> PortResult<()> {
        let _guard = self.lock.lock().unwrap_or_else(PoisonError::into_inner);
        let tmp_path = self.dir.join(format!("{}.json.tmp", key));
        fs::write(&tmp_path, value).map_err(|e| PortError::Storage(e.to_string()))?;
        fs::rename(&tmp_path, self.path_for(key)).map_err(|e| PortError::Storage(e.to_string()))
    }

    fn remove(&self, key: &str) -> PortResult<()> {
        let _guard = self.lock.lock().unwrap_or_else(PoisonError::into_inner);
        match fs::remove_file(self.path_for(key)) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(PortError::Storage(e.to_string())),
        }
    }
}

/// An in-process backend for the ephemeral session store, and the fake the
/// tests inject everywhere a backend is needed.
#[derive(Default)]
pub struct MemoryBackend {
    entries: Mutex<HashMap<String, String>>,
    #[cfg(test)]
    fail_writes: std::sync::atomic::AtomicBool,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every subsequent write fail, simulating an out-of-quota store.
    #[cfg(test)]
    pub(crate) fn fail_writes(&self, fail: bool) {
        self.fail_writes
            .store(fail, std::sync::atomic::Ordering::SeqCst);
    }

    #[cfg(test)]
    fn writes_fail(&self) -> bool {
        self.fail_writes.load(std::sync::atomic::Ordering::SeqCst)
    }

    #[cfg(not(test))]
    fn writes_fail(&self) -> bool {
        false
    }
}

impl StorageBackend for MemoryBackend {
    fn get(&self, key: &str) -> PortResult<Option<String>> {
        let entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(entries.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> PortResult<()> {
        if self.writes_fail() {
            return Err(PortError::Storage("simulated write failure".to_string()));
        }
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> PortResult<()> {
        if self.writes_fail() {
            return Err(PortError::Storage("simulated write failure".to_string()));
        }
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        entries.remove(key);
        Ok(())
    }
}

//=========================================================================================
// "Impure" Storage Record Structs
//=========================================================================================

#[derive(Serialize, Deserialize)]
struct SavedScriptRecord {
    id: Uuid,
    title: String,
    content: String,
    #[serde(rename = "createdAt", with = "chrono::serde::ts_milliseconds")]
    created_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tone: Option<String>,
    #[serde(
        rename = "targetAudience",
        skip_serializing_if = "Option::is_none",
        default
    )]
    target_audience: Option<String>,
}

impl SavedScriptRecord {
    fn from_domain(script: &SavedScript) -> Self {
        Self {
            id: script.id,
            title: script.title.clone(),
            content: script.content.clone(),
            created_at: script.created_at,
            tone: script.tone.clone(),
            target_audience: script.target_audience.clone(),
        }
    }

    fn to_domain(self) -> SavedScript {
        SavedScript {
            id: self.id,
            title: self.title,
            content: self.content,
            created_at: self.created_at,
            tone: self.tone,
            target_audience: self.target_audience,
        }
    }
}

#[derive(Serialize, Deserialize)]
struct DraftRecord {
    title: String,
    content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    tone: Option<String>,
    #[serde(
        rename = "targetAudience",
        skip_serializing_if = "Option::is_none",
        default
    )]
    target_audience: Option<String>,
    #[serde(rename = "createdAt", with = "chrono::serde::ts_milliseconds")]
    created_at: DateTime<Utc>,
}

impl DraftRecord {
    fn from_domain(draft: &ScriptDraft) -> Self {
        Self {
            title: draft.title.clone(),
            content: draft.content.clone(),
            tone: draft.tone.clone(),
            target_audience: draft.target_audience.clone(),
            created_at: draft.created_at,
        }
    }

    fn to_domain(self) -> ScriptDraft {
        ScriptDraft {
            title: self.title,
            content: self.content,
            tone: self.tone,
            target_audience: self.target_audience,
            created_at: self.created_at,
        }
    }
}

//=========================================================================================
// `ScriptStore` Trait Implementation
//=========================================================================================

/// Implements the durable `ScriptStore` port over a key-value backend.
pub struct ScriptStoreAdapter {
    backend: Arc<dyn StorageBackend>,
    key: String,
}

impl ScriptStoreAdapter {
    /// Creates a new `ScriptStoreAdapter` over the given backend.
    pub fn new(backend: Arc<dyn StorageBackend>) -> Self {
        Self {
            backend,
            key: SCRIPTS_KEY.to_string(),
        }
    }

    /// Reads and decodes the whole collection. Corrupt data degrades to the
    /// empty collection; the next successful save re-persists a clean set.
    fn read_all(&self) -> PortResult<Vec<SavedScriptRecord>> {
        let Some(raw) = self.backend.get(&self.key)? else {
            return Ok(Vec::new());
        };
        match serde_json::from_str::<Vec<SavedScriptRecord>>(&raw) {
            Ok(records) => Ok(records),
            Err(e) => {
                warn!("Discarding undecodable script collection: {}", e);
                Ok(Vec::new())
            }
        }
    }

    fn write_all(&self, records: &[SavedScriptRecord]) -> PortResult<()> {
        let raw =
            serde_json::to_string(records).map_err(|e| PortError::Storage(e.to_string()))?;
        self.backend.set(&self.key, &raw)
    }
}

impl ScriptStore for ScriptStoreAdapter {
    fn list_all(&self) -> PortResult<Vec<SavedScript>> {
        let mut scripts: Vec<SavedScript> = self
            .read_all()?
            .into_iter()
            .map(SavedScriptRecord::to_domain)
            .collect();
        scripts.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(scripts)
    }

    fn save(&self, script: NewScript) -> PortResult<SavedScript> {
        let mut records = self.read_all()?;
        // Timestamps persist at millisecond precision; truncate here so the
        // returned entity equals what a later read decodes.
        let now = Utc::now();
        let created_at = DateTime::from_timestamp_millis(now.timestamp_millis()).unwrap_or(now);
        let saved = SavedScript {
            id: Uuid::new_v4(),
            title: script.title,
            content: script.content,
            created_at,
            tone: script.tone,
            target_audience: script.target_audience,
        };
        records.push(SavedScriptRecord::from_domain(&saved));
        self.write_all(&records)?;
        Ok(saved)
    }

    fn delete(&self, id: Uuid) -> PortResult<()> {
        let mut records = self.read_all()?;
        records.retain(|record| record.id != id);
        self.write_all(&records)
    }

    fn get(&self, id: Uuid) -> PortResult<Option<SavedScript>> {
        Ok(self
            .read_all()?
            .into_iter()
            .find(|record| record.id == id)
            .map(SavedScriptRecord::to_domain))
    }
}

//=========================================================================================
// `DraftStore` Trait Implementation
//=========================================================================================

/// Implements the single-slot ephemeral `DraftStore` port over a key-value backend.
pub struct DraftStoreAdapter {
    backend: Arc<dyn StorageBackend>,
    key: String,
}

impl DraftStoreAdapter {
    /// Creates a new `DraftStoreAdapter` over the given backend.
    pub fn new(backend: Arc<dyn StorageBackend>) -> Self {
        Self {
            backend,
            key: DRAFT_KEY.to_string(),
        }
    }
}

impl DraftStore for DraftStoreAdapter {
    fn save_draft(&self, draft: &ScriptDraft) -> PortResult<()> {
        let raw = serde_json::to_string(&DraftRecord::from_domain(draft))
            .map_err(|e| PortError::Storage(e.to_string()))?;
        self.backend.set(&self.key, &raw)
    }

    fn get_draft(&self) -> PortResult<Option<ScriptDraft>> {
        let Some(raw) = self.backend.get(&self.key)? else {
            return Ok(None);
        };
        match serde_json::from_str::<DraftRecord>(&raw) {
            Ok(record) => Ok(Some(record.to_domain())),
            Err(e) => {
                warn!("Discarding undecodable draft: {}", e);
                Ok(None)
            }
        }
    }

    fn clear_draft(&self) -> PortResult<()> {
        self.backend.remove(&self.key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread::sleep;
    use std::time::Duration;
    use tempfile::tempdir;

    fn new_script(title: &str) -> NewScript {
        NewScript {
            title: title.to_string(),
            content: format!("{} 본문", title),
            tone: Some("정보 전달 중심".to_string()),
            target_audience: Some("2030 시청자".to_string()),
        }
    }

    fn draft(title: &str) -> ScriptDraft {
        ScriptDraft {
            title: title.to_string(),
            content: format!("{} 본문", title),
            tone: Some("진지함".to_string()),
            target_audience: None,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn save_assigns_fresh_ids_and_lists_newest_first() {
        let store = ScriptStoreAdapter::new(Arc::new(MemoryBackend::new()));

        let first = store.save(new_script("첫 번째")).unwrap();
        // Timestamps are stored at millisecond precision; keep the two saves apart.
        sleep(Duration::from_millis(5));
        let second = store.save(new_script("두 번째")).unwrap();

        assert_ne!(first.id, second.id);
        assert!(second.created_at > first.created_at);

        let listed = store.list_all().unwrap();
        assert_eq!(listed.len(), 2);
        assert_eq!(listed[0].id, second.id);
        assert_eq!(listed[1].id, first.id);
        assert_eq!(listed[0].tone.as_deref(), Some("정보 전달 중심"));
    }

    #[test]
    fn get_finds_a_saved_script_and_misses_unknown_ids() {
        let store = ScriptStoreAdapter::new(Arc::new(MemoryBackend::new()));
        let saved = store.save(new_script("내 대본")).unwrap();

        assert_eq!(store.get(saved.id).unwrap(), Some(saved));
        assert_eq!(store.get(Uuid::new_v4()).unwrap(), None);
    }

    #[test]
    fn delete_is_idempotent() {
        let store = ScriptStoreAdapter::new(Arc::new(MemoryBackend::new()));
        let keep = store.save(new_script("남는 대본")).unwrap();
        let gone = store.save(new_script("지울 대본")).unwrap();

        store.delete(gone.id).unwrap();
        let after_first = store.list_all().unwrap();

        store.delete(gone.id).unwrap();
        let after_second = store.list_all().unwrap();

        assert_eq!(after_first, after_second);
        assert_eq!(after_second.len(), 1);
        assert_eq!(after_second[0].id, keep.id);
    }

    #[test]
    fn corrupt_collection_reads_as_empty_and_heals_on_save() {
        let backend = Arc::new(MemoryBackend::new());
        backend.set(SCRIPTS_KEY, "definitely not json").unwrap();

        let store = ScriptStoreAdapter::new(backend);
        assert!(store.list_all().unwrap().is_empty());
        assert_eq!(store.get(Uuid::new_v4()).unwrap(), None);

        let saved = store.save(new_script("복구")).unwrap();
        let listed = store.list_all().unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].id, saved.id);
    }

    #[test]
    fn quota_failure_surfaces_a_storage_error() {
        let backend = Arc::new(MemoryBackend::new());
        let store = ScriptStoreAdapter::new(backend.clone());
        store.save(new_script("먼저 저장")).unwrap();

        backend.fail_writes(true);
        assert!(matches!(
            store.save(new_script("실패할 저장")),
            Err(PortError::Storage(_))
        ));

        // The earlier save is still intact.
        backend.fail_writes(false);
        assert_eq!(store.list_all().unwrap().len(), 1);
    }

    #[test]
    fn record_layout_uses_the_persisted_field_names() {
        let store = ScriptStoreAdapter::new(Arc::new(MemoryBackend::new()));
        let saved = store.save(new_script("필드 이름")).unwrap();

        let raw = store.backend.get(SCRIPTS_KEY).unwrap().unwrap();
        let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
        let record = &value[0];
        assert!(record.get("createdAt").unwrap().is_i64());
        assert_eq!(
            record.get("targetAudience").unwrap().as_str(),
            Some("2030 시청자")
        );
        assert_eq!(
            record.get("id").unwrap().as_str(),
            Some(saved.id.to_string().as_str())
        );
    }

    #[test]
    fn draft_slot_overwrites_and_clears() {
        let drafts = DraftStoreAdapter::new(Arc::new(MemoryBackend::new()));

        drafts.save_draft(&draft("첫 초안")).unwrap();
        drafts.save_draft(&draft("두 번째 초안")).unwrap();
        let current = drafts.get_draft().unwrap().unwrap();
        assert_eq!(current.title, "두 번째 초안");

        drafts.clear_draft().unwrap();
        assert_eq!(drafts.get_draft().unwrap(), None);
        // Clearing an already-empty slot is fine.
        drafts.clear_draft().unwrap();
    }

    #[test]
    fn corrupt_draft_reads_as_absent() {
        let backend = Arc::new(MemoryBackend::new());
        backend.set(DRAFT_KEY, "{not a draft").unwrap();

        let drafts = DraftStoreAdapter::new(backend);
        assert_eq!(drafts.get_draft().unwrap(), None);
    }

    #[test]
    fn file_backend_round_trips_and_survives_reopen() {
        let dir = tempdir().unwrap();

        {
            let backend = FileBackend::new(dir.path().to_path_buf()).unwrap();
            assert_eq!(backend.get("missing").unwrap(), None);
            backend.set("greeting", "안녕하세요").unwrap();
            assert_eq!(backend.get("greeting").unwrap().as_deref(), Some("안녕하세요"));
        }

        // A fresh backend over the same directory sees the earlier write.
        let reopened = FileBackend::new(dir.path().to_path_buf()).unwrap();
        assert_eq!(reopened.get("greeting").unwrap().as_deref(), Some("안녕하세요"));

        reopened.remove("greeting").unwrap();
        assert_eq!(reopened.get("greeting").unwrap(), None);
        // Removing a missing key is fine.
        reopened.remove("greeting").unwrap();
    }

    #[test]
    fn script_collection_survives_reopen_on_the_file_backend() {
        let dir = tempdir().unwrap();
        let saved = {
            let backend = Arc::new(FileBackend::new(dir.path().to_path_buf()).unwrap());
            let store = ScriptStoreAdapter::new(backend);
            store.save(new_script("디스크 저장")).unwrap()
        };

        let backend = Arc::new(FileBackend::new(dir.path().to_path_buf()).unwrap());
        let store = ScriptStoreAdapter::new(backend);
        let listed = store.list_all().unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0], saved);
    }
}
