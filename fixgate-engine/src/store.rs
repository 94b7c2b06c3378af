/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 27/1/26
******************************************************************************/

//! Message stores.
//!
//! A store keeps the session's sequence numbers and every outgoing frame.
//! [`FileStore`] persists them under `FileStorePath` so a restarted initiator
//! resumes where it left off:
//!
//! - `<session>.seqnums`: `SSSSSSSSSS : TTTTTTTTTT` (next sender, next target)
//! - `<session>.body`: one `seq,len:` record per outgoing frame
//! - `<session>.session`: store creation time (RFC 3339)

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::SystemTime;

use async_trait::async_trait;
use bytes::Bytes;
use chrono::{DateTime, Utc};
use fixgate_core::SessionId;
use parking_lot::RwLock;
use tokio::io::AsyncWriteExt;

use crate::error::{SettingsError, StoreError};
use crate::settings::{self, SessionSettings};

/// Persistence for a session's sequence numbers and outgoing messages.
#[async_trait]
pub trait MessageStore: Send + Sync {
    /// Stores an outgoing frame.
    ///
    /// # Arguments
    /// * `seq_num` - The message sequence number
    /// * `message` - The encoded frame
    ///
    /// # Errors
    /// Returns `StoreError` if the message cannot be stored.
    async fn store(&self, seq_num: u64, message: &[u8]) -> Result<(), StoreError>;

    /// Returns the next sender sequence number.
    fn next_sender_seq(&self) -> u64;

    /// Returns the next expected target sequence number.
    fn next_target_seq(&self) -> u64;

    /// Sets the next sender sequence number.
    ///
    /// # Errors
    /// Returns `StoreError` if the value cannot be persisted.
    async fn set_next_sender_seq(&self, seq: u64) -> Result<(), StoreError>;

    /// Sets the next expected target sequence number.
    ///
    /// # Errors
    /// Returns `StoreError` if the value cannot be persisted.
    async fn set_next_target_seq(&self, seq: u64) -> Result<(), StoreError>;

    /// Clears stored messages and sets both sequence numbers back to 1.
    ///
    /// # Errors
    /// Returns `StoreError` if the reset fails.
    async fn reset(&self) -> Result<(), StoreError>;

    /// Returns the creation time of the store.
    fn creation_time(&self) -> SystemTime;
}

/// Creates the store for a session.
pub trait MessageStoreFactory: Send + Sync {
    /// Opens or creates the store for `session_id`.
    ///
    /// # Errors
    /// Returns `StoreError` if the backing storage cannot be opened.
    fn create(&self, session_id: &SessionId) -> Result<Arc<dyn MessageStore>, StoreError>;
}

/// In-memory message store.
///
/// Not persistent; all data is lost when the process exits.
#[derive(Debug)]
pub struct MemoryStore {
    messages: RwLock<BTreeMap<u64, Bytes>>,
    next_sender_seq: AtomicU64,
    next_target_seq: AtomicU64,
    creation_time: RwLock<SystemTime>,
}

impl MemoryStore {
    /// Creates an empty store with both sequence numbers at 1.
    #[must_use]
    pub fn new() -> Self {
        Self {
            messages: RwLock::new(BTreeMap::new()),
            next_sender_seq: AtomicU64::new(1),
            next_target_seq: AtomicU64::new(1),
            creation_time: RwLock::new(SystemTime::now()),
        }
    }

    /// Returns the number of stored messages.
    #[must_use]
    pub fn message_count(&self) -> usize {
        self.messages.read().len()
    }

    /// Returns the frame stored under `seq_num`.
    #[must_use]
    pub fn get(&self, seq_num: u64) -> Option<Bytes> {
        self.messages.read().get(&seq_num).cloned()
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl MessageStore for MemoryStore {
    async fn store(&self, seq_num: u64, message: &[u8]) -> Result<(), StoreError> {
        self.messages
            .write()
            .insert(seq_num, Bytes::copy_from_slice(message));
        Ok(())
    }

    fn next_sender_seq(&self) -> u64 {
        self.next_sender_seq.load(Ordering::SeqCst)
    }

    fn next_target_seq(&self) -> u64 {
        self.next_target_seq.load(Ordering::SeqCst)
    }

    async fn set_next_sender_seq(&self, seq: u64) -> Result<(), StoreError> {
        self.next_sender_seq.store(seq, Ordering::SeqCst);
        Ok(())
    }

    async fn set_next_target_seq(&self, seq: u64) -> Result<(), StoreError> {
        self.next_target_seq.store(seq, Ordering::SeqCst);
        Ok(())
    }

    async fn reset(&self) -> Result<(), StoreError> {
        self.messages.write().clear();
        self.next_sender_seq.store(1, Ordering::SeqCst);
        self.next_target_seq.store(1, Ordering::SeqCst);
        *self.creation_time.write() = SystemTime::now();
        Ok(())
    }

    fn creation_time(&self) -> SystemTime {
        *self.creation_time.read()
    }
}

/// Creates a fresh [`MemoryStore`] per session.
#[derive(Debug, Default, Clone, Copy)]
pub struct MemoryStoreFactory;

impl MessageStoreFactory for MemoryStoreFactory {
    fn create(&self, _session_id: &SessionId) -> Result<Arc<dyn MessageStore>, StoreError> {
        Ok(Arc::new(MemoryStore::new()))
    }
}

/// File-backed message store.
#[derive(Debug)]
pub struct FileStore {
    seqnums_path: PathBuf,
    body_path: PathBuf,
    session_path: PathBuf,
    next_sender_seq: AtomicU64,
    next_target_seq: AtomicU64,
    creation_time: RwLock<SystemTime>,
}

impl FileStore {
    /// Opens the store for `session_id` under `dir`, creating it if needed.
    ///
    /// # Errors
    /// Returns `StoreError` if the directory cannot be created or an existing
    /// store file cannot be read.
    pub fn open(dir: impl AsRef<Path>, session_id: &SessionId) -> Result<Self, StoreError> {
        let dir = dir.as_ref();
        std::fs::create_dir_all(dir).map_err(|source| StoreError::Io {
            path: dir.to_path_buf(),
            source,
        })?;

        let stem = session_id.file_stem();
        let seqnums_path = dir.join(format!("{stem}.seqnums"));
        let body_path = dir.join(format!("{stem}.body"));
        let session_path = dir.join(format!("{stem}.session"));

        let (sender, target) = match read_optional(&seqnums_path)? {
            Some(text) => parse_seqnums(&seqnums_path, &text)?,
            None => (1, 1),
        };
        let creation_time = match read_optional(&session_path)? {
            Some(text) => parse_creation_time(&session_path, &text)?,
            None => {
                let now = SystemTime::now();
                write_sync(&session_path, &format_creation_time(now))?;
                now
            }
        };

        let store = Self {
            seqnums_path,
            body_path,
            session_path,
            next_sender_seq: AtomicU64::new(sender),
            next_target_seq: AtomicU64::new(target),
            creation_time: RwLock::new(creation_time),
        };
        write_sync(&store.seqnums_path, &store.seqnums_line())?;
        Ok(store)
    }

    fn seqnums_line(&self) -> String {
        format!(
            "{:010} : {:010}",
            self.next_sender_seq.load(Ordering::SeqCst),
            self.next_target_seq.load(Ordering::SeqCst)
        )
    }

    async fn persist_seqnums(&self) -> Result<(), StoreError> {
        tokio::fs::write(&self.seqnums_path, self.seqnums_line())
            .await
            .map_err(|source| StoreError::Io {
                path: self.seqnums_path.clone(),
                source,
            })
    }
}

#[async_trait]
impl MessageStore for FileStore {
    async fn store(&self, seq_num: u64, message: &[u8]) -> Result<(), StoreError> {
        let io_err = |source| StoreError::Io {
            path: self.body_path.clone(),
            source,
        };
        let mut record = format!("{seq_num},{}:", message.len()).into_bytes();
        record.extend_from_slice(message);
        record.push(b'\n');

        let mut file = tokio::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.body_path)
            .await
            .map_err(io_err)?;
        file.write_all(&record).await.map_err(io_err)?;
        file.flush().await.map_err(io_err)
    }

    fn next_sender_seq(&self) -> u64 {
        self.next_sender_seq.load(Ordering::SeqCst)
    }

    fn next_target_seq(&self) -> u64 {
        self.next_target_seq.load(Ordering::SeqCst)
    }

    async fn set_next_sender_seq(&self, seq: u64) -> Result<(), StoreError> {
        self.next_sender_seq.store(seq, Ordering::SeqCst);
        self.persist_seqnums().await
    }

    async fn set_next_target_seq(&self, seq: u64) -> Result<(), StoreError> {
        self.next_target_seq.store(seq, Ordering::SeqCst);
        self.persist_seqnums().await
    }

    async fn reset(&self) -> Result<(), StoreError> {
        self.next_sender_seq.store(1, Ordering::SeqCst);
        self.next_target_seq.store(1, Ordering::SeqCst);
        self.persist_seqnums().await?;

        tokio::fs::write(&self.body_path, b"")
            .await
            .map_err(|source| StoreError::Io {
                path: self.body_path.clone(),
                source,
            })?;

        let now = SystemTime::now();
        *self.creation_time.write() = now;
        tokio::fs::write(&self.session_path, format_creation_time(now))
            .await
            .map_err(|source| StoreError::Io {
                path: self.session_path.clone(),
                source,
            })
    }

    fn creation_time(&self) -> SystemTime {
        *self.creation_time.read()
    }
}

/// Opens a [`FileStore`] per session under a fixed directory.
#[derive(Debug, Clone)]
pub struct FileStoreFactory {
    dir: PathBuf,
}

impl FileStoreFactory {
    /// Creates a factory rooted at `dir`.
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Creates a factory rooted at the `FileStorePath` setting.
    ///
    /// # Errors
    /// Returns [`SettingsError::MissingKey`] if `FileStorePath` is not set.
    pub fn from_settings(settings: &SessionSettings) -> Result<Self, SettingsError> {
        Ok(Self::new(settings.require(settings::FILE_STORE_PATH)?))
    }

    /// Directory holding the store files.
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

impl MessageStoreFactory for FileStoreFactory {
    fn create(&self, session_id: &SessionId) -> Result<Arc<dyn MessageStore>, StoreError> {
        Ok(Arc::new(FileStore::open(&self.dir, session_id)?))
    }
}

fn read_optional(path: &Path) -> Result<Option<String>, StoreError> {
    match std::fs::read_to_string(path) {
        Ok(text) => Ok(Some(text)),
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(source) => Err(StoreError::Io {
            path: path.to_path_buf(),
            source,
        }),
    }
}

fn write_sync(path: &Path, contents: &str) -> Result<(), StoreError> {
    std::fs::write(path, contents).map_err(|source| StoreError::Io {
        path: path.to_path_buf(),
        source,
    })
}

fn parse_seqnums(path: &Path, text: &str) -> Result<(u64, u64), StoreError> {
    let corrupted = || StoreError::Corrupted {
        path: path.to_path_buf(),
        reason: format!("expected 'sender : target', got '{}'", text.trim()),
    };
    let (sender, target) = text.split_once(':').ok_or_else(corrupted)?;
    let sender = sender.trim().parse().map_err(|_| corrupted())?;
    let target = target.trim().parse().map_err(|_| corrupted())?;
    Ok((sender, target))
}

fn format_creation_time(time: SystemTime) -> String {
    DateTime::<Utc>::from(time).to_rfc3339()
}

fn parse_creation_time(path: &Path, text: &str) -> Result<SystemTime, StoreError> {
    DateTime::parse_from_rfc3339(text.trim())
        .map(SystemTime::from)
        .map_err(|err| StoreError::Corrupted {
            path: path.to_path_buf(),
            reason: err.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session() -> SessionId {
        SessionId::new("FIX.4.4", "CLIENT", "BROKER")
    }

    #[tokio::test]
    async fn test_memory_store_sequences() {
        let store = MemoryStore::new();
        assert_eq!(store.next_sender_seq(), 1);
        assert_eq!(store.next_target_seq(), 1);

        store.store(1, b"frame").await.unwrap();
        store.set_next_sender_seq(2).await.unwrap();
        store.set_next_target_seq(5).await.unwrap();
        assert_eq!(store.next_sender_seq(), 2);
        assert_eq!(store.next_target_seq(), 5);
        assert_eq!(store.get(1).as_deref(), Some(&b"frame"[..]));

        store.reset().await.unwrap();
        assert_eq!(store.next_sender_seq(), 1);
        assert_eq!(store.next_target_seq(), 1);
        assert_eq!(store.message_count(), 0);
    }

    #[tokio::test]
    async fn test_file_store_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let created = {
            let store = FileStore::open(dir.path(), &session()).unwrap();
            store.store(1, b"8=FIX.4.4\x01").await.unwrap();
            store.set_next_sender_seq(2).await.unwrap();
            store.set_next_target_seq(7).await.unwrap();
            store.creation_time()
        };

        let reopened = FileStore::open(dir.path(), &session()).unwrap();
        assert_eq!(reopened.next_sender_seq(), 2);
        assert_eq!(reopened.next_target_seq(), 7);
        let drift = created
            .duration_since(reopened.creation_time())
            .unwrap_or_default();
        assert!(drift.as_secs() < 1);

        let seqnums =
            std::fs::read_to_string(dir.path().join("FIX.4.4-CLIENT-BROKER.seqnums")).unwrap();
        assert_eq!(seqnums, "0000000002 : 0000000007");
        let body = std::fs::read(dir.path().join("FIX.4.4-CLIENT-BROKER.body")).unwrap();
        assert_eq!(body, b"1,10:8=FIX.4.4\x01\n");
    }

    #[tokio::test]
    async fn test_file_store_reset() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::open(dir.path(), &session()).unwrap();
        store.store(1, b"x").await.unwrap();
        store.set_next_sender_seq(9).await.unwrap();
        store.reset().await.unwrap();

        assert_eq!(store.next_sender_seq(), 1);
        let body = std::fs::read(dir.path().join("FIX.4.4-CLIENT-BROKER.body")).unwrap();
        assert!(body.is_empty());
    }

    #[test]
    fn test_file_store_rejects_corrupted_seqnums() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("FIX.4.4-CLIENT-BROKER.seqnums"), "garbage").unwrap();
        let err = FileStore::open(dir.path(), &session()).unwrap_err();
        assert!(matches!(err, StoreError::Corrupted { .. }));
    }

    #[test]
    fn test_factory_from_settings() {
        let settings = SessionSettings::parse("[SESSION]\nFileStorePath=data/store\n").unwrap();
        let factory = FileStoreFactory::from_settings(&settings).unwrap();
        assert_eq!(factory.dir(), Path::new("data/store"));

        let missing = SessionSettings::parse("[SESSION]\nBeginString=FIX.4.4\n").unwrap();
        assert!(FileStoreFactory::from_settings(&missing).is_err());
    }
}
