//! Persistent weather record store on top of a fjall keyspace
//!
//! Rows are postcard-encoded [`WeatherRecord`]s keyed by their big-endian id,
//! so key order is id order and listing is a reverse scan. A second keyspace
//! holds the id counter, which is bumped in the same batch as the new row.

use std::path::Path;

use anyhow::anyhow;
use chrono::{DateTime, Utc};
use fjall::{Database, Keyspace};
use tokio::sync::Mutex;
use tokio::task;
use tracing::{debug, info, instrument};

use crate::Result;
use crate::models::{RecordDraft, WeatherRecord};

const NEXT_ID_KEY: &[u8] = b"next_id";

pub struct RecordStore {
    db: Database,
    rows: Keyspace,
    meta: Keyspace,
    /// Serialises read-modify-write sequences on the counter
    write_lock: Mutex<()>,
}

fn row_key(id: u64) -> Vec<u8> {
    id.to_be_bytes().to_vec()
}

fn id_from_key(key: &[u8]) -> anyhow::Result<u64> {
    let bytes: [u8; 8] = key
        .try_into()
        .map_err(|_| anyhow!("Unexpected record key length {}", key.len()))?;
    Ok(u64::from_be_bytes(bytes))
}

fn get_from_store(store: &Keyspace, key: Vec<u8>) -> anyhow::Result<Option<Vec<u8>>> {
    Ok(store.get(key)?.map(|v| v.to_vec()))
}

fn decode_row(id: u64, bytes: &[u8]) -> anyhow::Result<WeatherRecord> {
    postcard::from_bytes(bytes).map_err(|e| anyhow!("Corrupt record {id}: {e}"))
}

fn load_row(rows: &Keyspace, id: u64) -> anyhow::Result<Option<WeatherRecord>> {
    get_from_store(rows, row_key(id))?
        .map(|bytes| decode_row(id, &bytes))
        .transpose()
}

/// Next free id. Never at or below the highest stored row, even if the
/// counter lags behind.
fn next_id(rows: &Keyspace, meta: &Keyspace) -> anyhow::Result<u64> {
    let counter = match get_from_store(meta, NEXT_ID_KEY.to_vec())? {
        Some(bytes) => postcard::from_bytes(&bytes)?,
        None => 1,
    };
    let after_last = match rows.iter().next_back() {
        Some(guard) => {
            let (key, _) = guard.into_inner()?;
            id_from_key(&key)? + 1
        }
        None => 1,
    };
    Ok(counter.max(after_last))
}

/// Run a blocking storage closure off the async runtime
async fn run_blocking<T, F>(f: F) -> Result<T>
where
    F: FnOnce() -> anyhow::Result<T> + Send + 'static,
    T: Send + 'static,
{
    let value = task::spawn_blocking(f).await.map_err(anyhow::Error::from)??;
    Ok(value)
}

impl RecordStore {
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let open = || -> anyhow::Result<Self> {
            let db = Database::builder(path.as_ref()).open()?;
            let rows = db.keyspace("records", fjall::KeyspaceCreateOptions::default)?;
            let meta = db.keyspace("records_meta", fjall::KeyspaceCreateOptions::default)?;
            Ok(RecordStore {
                db,
                rows,
                meta,
                write_lock: Mutex::new(()),
            })
        };
        let store = open()?;
        info!("Opened record store at {}", path.as_ref().display());
        Ok(store)
    }

    /// Newest records first, at most `limit`
    #[instrument(level = "debug", skip(self))]
    pub async fn list(&self, limit: usize) -> Result<Vec<WeatherRecord>> {
        let rows = self.rows.clone();
        run_blocking(move || {
            let mut records = Vec::new();
            for guard in rows.iter().rev().take(limit) {
                let (key, value) = guard.into_inner()?;
                records.push(decode_row(id_from_key(&key)?, &value)?);
            }
            Ok(records)
        })
        .await
    }

    /// Every record, newest first
    pub async fn list_all(&self) -> Result<Vec<WeatherRecord>> {
        self.list(usize::MAX).await
    }

    #[instrument(level = "debug", skip(self))]
    pub async fn get(&self, id: u64) -> Result<Option<WeatherRecord>> {
        let rows = self.rows.clone();
        run_blocking(move || load_row(&rows, id)).await
    }

    /// Assign the next id and persist `draft` with both timestamps set to `now`
    #[instrument(level = "debug", skip(self, draft))]
    pub async fn create(&self, draft: RecordDraft, now: DateTime<Utc>) -> Result<WeatherRecord> {
        let _guard = self.write_lock.lock().await;
        let db = self.db.clone();
        let rows = self.rows.clone();
        let meta = self.meta.clone();

        let record = run_blocking(move || {
            let id = next_id(&rows, &meta)?;
            let record = draft.into_record(id, now, now);

            let mut batch = db.batch();
            batch.insert(&rows, row_key(id), postcard::to_stdvec(&record)?);
            batch.insert(&meta, NEXT_ID_KEY.to_vec(), postcard::to_stdvec(&(id + 1))?);
            batch.commit()?;
            Ok(record)
        })
        .await?;

        debug!("Created record {}", record.id);
        Ok(record)
    }

    /// Replace the stored fields of `id`, keeping its id and creation time.
    /// Returns `None` when no such record exists.
    #[instrument(level = "debug", skip(self, draft))]
    pub async fn update(
        &self,
        id: u64,
        draft: RecordDraft,
        updated_at: DateTime<Utc>,
    ) -> Result<Option<WeatherRecord>> {
        let _guard = self.write_lock.lock().await;
        let rows = self.rows.clone();

        run_blocking(move || {
            let Some(existing) = load_row(&rows, id)? else {
                return Ok(None);
            };
            let record = draft.into_record(id, existing.created_at, updated_at);
            rows.insert(row_key(id), postcard::to_stdvec(&record)?)?;
            Ok(Some(record))
        })
        .await
    }

    /// Returns whether a record was removed
    #[instrument(level = "debug", skip(self))]
    pub async fn delete(&self, id: u64) -> Result<bool> {
        let _guard = self.write_lock.lock().await;
        let rows = self.rows.clone();

        run_blocking(move || {
            if get_from_store(&rows, row_key(id))?.is_none() {
                return Ok(false);
            }
            rows.remove(row_key(id))?;
            Ok(true)
        })
        .await
    }
}
