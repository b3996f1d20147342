use std::collections::HashMap;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard, RwLock};

use anyhow::{bail, Context, Result};

use esign_core::errors::WorkflowError;
use esign_core::notification::StatusNotification;
use esign_core::types::Signature;

use crate::apply::{apply_notification, NotificationOutcome};

/// Persisted signature store: one JSON state file per envelope.
///
/// Concurrency model: notifications for different envelopes are
/// independent; notifications for the same envelope are serialized by a
/// per-envelope mutex, so each ingest is lock → load → apply → atomic
/// write as one unit. Writes go through temp-file + rename.
pub struct SignatureStore {
    dir: PathBuf,
    /// Backend envelope id → per-envelope slot.
    slots: RwLock<HashMap<String, Arc<Slot>>>,
}

struct Slot {
    path: PathBuf,
    guard: Mutex<()>,
}

impl SignatureStore {
    /// Open (or create) a store directory and index the envelopes in it.
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        std::fs::create_dir_all(&dir)
            .with_context(|| format!("cannot create store directory {}", dir.display()))?;

        let mut slots = HashMap::new();
        for entry in std::fs::read_dir(&dir)
            .with_context(|| format!("cannot read store directory {}", dir.display()))?
        {
            let path = entry?.path();
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            let signature = load(&path)
                .with_context(|| format!("cannot index state file {}", path.display()))?;
            if signature.signature_backend_id.is_empty() {
                tracing::warn!(path = %path.display(), "state file has no backend id, skipping");
                continue;
            }
            slots.insert(
                signature.signature_backend_id,
                Arc::new(Slot {
                    path,
                    guard: Mutex::new(()),
                }),
            );
        }

        Ok(Self {
            dir,
            slots: RwLock::new(slots),
        })
    }

    /// Persist a newly created signature and index it by backend id.
    pub fn insert(&self, signature: &Signature) -> Result<()> {
        if signature.signature_backend_id.is_empty() {
            bail!("cannot persist a signature without a backend envelope id");
        }
        let path = self.dir.join(format!("{}.json", signature.id));
        save(&path, signature).context("cannot persist signature")?;

        let slot = Arc::new(Slot {
            path,
            guard: Mutex::new(()),
        });
        write_lock(&self.slots).insert(signature.signature_backend_id.clone(), slot);
        Ok(())
    }

    /// Read-side snapshot of one envelope by backend id.
    pub fn get(&self, envelope_id: &str) -> Result<Option<Signature>, WorkflowError> {
        let Some(slot) = self.slot(envelope_id) else {
            return Ok(None);
        };
        let _guard = lock(&slot.guard);
        load(&slot.path).map(Some)
    }

    /// Apply one notification as a single serialized unit.
    ///
    /// All of the notification's signer writes and the envelope status
    /// recomputation happen against one consistent snapshot, under the
    /// envelope's lock, and land in one atomic write.
    pub fn ingest(
        &self,
        notification: &StatusNotification,
    ) -> Result<NotificationOutcome, WorkflowError> {
        let Some(slot) = self.slot(&notification.envelope_id) else {
            return Err(WorkflowError::UnknownEnvelope(
                notification.envelope_id.clone(),
            ));
        };

        let _guard = lock(&slot.guard);
        let mut signature = load(&slot.path)?;
        let outcome = apply_notification(&mut signature, notification);
        save(&slot.path, &signature)?;

        tracing::info!(
            envelope_id = %outcome.envelope_id,
            signature_status = %outcome.signature_status,
            applied = outcome.applied.len(),
            skipped = outcome.skipped_recipients.len(),
            unrecognized = outcome.unrecognized_statuses.len(),
            "notification applied"
        );
        Ok(outcome)
    }

    fn slot(&self, envelope_id: &str) -> Option<Arc<Slot>> {
        read_lock(&self.slots).get(envelope_id).cloned()
    }
}

fn load(path: &Path) -> Result<Signature, WorkflowError> {
    let content = std::fs::read_to_string(path).map_err(WorkflowError::Read)?;
    Ok(serde_json::from_str(&content)?)
}

fn save(path: &Path, signature: &Signature) -> Result<(), WorkflowError> {
    let json = serde_json::to_string_pretty(signature)?;
    atomic_write(path, json.as_bytes()).map_err(WorkflowError::Write)
}

/// Write content atomically: write to a temp file, fsync, rename.
fn atomic_write(path: &Path, content: &[u8]) -> std::io::Result<()> {
    let dir = path.parent().unwrap_or(Path::new("."));
    let temp_path = dir.join(format!(".{}.tmp", uuid::Uuid::new_v4()));

    let mut file = std::fs::File::create(&temp_path)?;
    file.write_all(content)?;
    file.sync_all()?;
    drop(file);

    std::fs::rename(&temp_path, path)
}

// Lock helpers that survive poisoning: a panicked writer leaves the
// state file untouched (writes are atomic), so the data is still sound.
fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|e| e.into_inner())
}

fn read_lock<T>(rwlock: &RwLock<T>) -> std::sync::RwLockReadGuard<'_, T> {
    rwlock.read().unwrap_or_else(|e| e.into_inner())
}

fn write_lock<T>(rwlock: &RwLock<T>) -> std::sync::RwLockWriteGuard<'_, T> {
    rwlock.write().unwrap_or_else(|e| e.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use esign_core::notification::RecipientUpdate;
    use esign_core::status::Status;
    use esign_core::types::SignatureType;

    fn seeded_store() -> (tempfile::TempDir, SignatureStore, Signature) {
        let dir = tempfile::tempdir().unwrap();
        let store = SignatureStore::open(dir.path()).unwrap();

        let mut sig = Signature::new("Contract", SignatureType::document_based());
        sig.add_signer("john@example.com", "John", 1);
        sig.add_signer("paul@example.com", "Paul", 2);
        sig.assign_backend_id("env-1");
        store.insert(&sig).unwrap();
        (dir, store, sig)
    }

    fn sent_notification(sig: &Signature) -> StatusNotification {
        StatusNotification {
            envelope_id: sig.signature_backend_id.clone(),
            envelope_status: None,
            event_datetime: None,
            recipients: sig
                .signers
                .iter()
                .map(|s| RecipientUpdate {
                    recipient_id: s.id.to_string(),
                    status: "Sent".to_string(),
                    status_datetime: Utc::now(),
                    detail: None,
                })
                .collect(),
        }
    }

    #[test]
    fn ingest_persists_signer_and_envelope_status() {
        let (_dir, store, sig) = seeded_store();

        let outcome = store.ingest(&sent_notification(&sig)).unwrap();
        assert_eq!(outcome.signature_status, Status::Sent);

        let reloaded = store.get("env-1").unwrap().unwrap();
        assert_eq!(reloaded.status, Status::Sent);
        assert!(reloaded.signers.iter().all(|s| s.status == Status::Sent));
    }

    #[test]
    fn unknown_envelope_is_a_typed_error() {
        let (_dir, store, _sig) = seeded_store();
        let n = StatusNotification {
            envelope_id: "nobody-home".to_string(),
            envelope_status: None,
            event_datetime: None,
            recipients: vec![],
        };
        match store.ingest(&n) {
            Err(WorkflowError::UnknownEnvelope(id)) => assert_eq!(id, "nobody-home"),
            other => panic!("expected UnknownEnvelope, got {other:?}"),
        }
    }

    #[test]
    fn insert_requires_a_backend_id() {
        let dir = tempfile::tempdir().unwrap();
        let store = SignatureStore::open(dir.path()).unwrap();
        let sig = Signature::new("unsent", SignatureType::document_based());
        assert!(store.insert(&sig).is_err());
    }

    #[test]
    fn reopen_reindexes_existing_envelopes() {
        let (dir, store, sig) = seeded_store();
        store.ingest(&sent_notification(&sig)).unwrap();
        drop(store);

        let reopened = SignatureStore::open(dir.path()).unwrap();
        let reloaded = reopened.get("env-1").unwrap().unwrap();
        assert_eq!(reloaded.status, Status::Sent);
        assert_eq!(reloaded.signers.len(), 2);
    }

    #[test]
    fn concurrent_ingest_for_one_envelope_stays_consistent() {
        let (_dir, store, sig) = seeded_store();
        let store = Arc::new(store);

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let store = Arc::clone(&store);
                let n = sent_notification(&sig);
                std::thread::spawn(move || store.ingest(&n).unwrap())
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        let reloaded = store.get("env-1").unwrap().unwrap();
        assert_eq!(reloaded.status, Status::Sent);
        assert!(reloaded.signers.iter().all(|s| s.status == Status::Sent));
    }
}
