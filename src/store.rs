//! Record store on top of the embedded database
//!
//! Lookups are exact-match only. Every read-modify-write runs inside a single
//! redb write transaction through [`RecordStore::write`]; redb admits one
//! writer at a time, so concurrent counter bumps on the same record cannot
//! lose updates.

use std::sync::Arc;

use redb::{Database, ReadTransaction, ReadableDatabase, ReadableTable, WriteTransaction};
use thiserror::Error;
use tracing::debug;
use uuid::Uuid;

use crate::database::{init_db, TABLE_RECORDS, TABLE_USER_URL_INDEX};
use crate::model::Record;

/// Infrastructure failures of the record store
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] redb::Error),
    #[error("database error: {0}")]
    Open(#[from] redb::DatabaseError),
    #[error("transaction error: {0}")]
    Transaction(#[from] redb::TransactionError),
    #[error("table error: {0}")]
    Table(#[from] redb::TableError),
    #[error("storage error: {0}")]
    Storage(#[from] redb::StorageError),
    #[error("commit error: {0}")]
    Commit(#[from] redb::CommitError),
    #[error("corrupt record: {0}")]
    Corrupt(#[from] serde_json::Error),
    #[error("index points to missing record {0}")]
    DanglingIndex(String),
}

/// Durable mapping from record id to [`Record`]
#[derive(Clone)]
pub struct RecordStore {
    db: Arc<Database>,
}

impl RecordStore {
    pub fn new(db: Database) -> Self {
        Self { db: Arc::new(db) }
    }

    /// Opens (or creates) the database file at `path`
    pub fn open(path: &str) -> Result<Self, StoreError> {
        Ok(Self::new(init_db(path)?))
    }

    /// Runs `f` inside one write transaction
    ///
    /// The transaction commits when `f` returns `Ok` and is aborted otherwise,
    /// so a failed closure leaves no partial writes behind.
    pub fn write<T, E, F>(&self, f: F) -> Result<T, E>
    where
        F: FnOnce(&RecordTxn<'_>) -> Result<T, E>,
        E: From<StoreError>,
    {
        let txn = self.db.begin_write().map_err(StoreError::from)?;
        let result = f(&RecordTxn { txn: &txn });
        match result {
            Ok(value) => {
                txn.commit().map_err(StoreError::from)?;
                Ok(value)
            }
            Err(err) => {
                txn.abort().map_err(StoreError::from)?;
                Err(err)
            }
        }
    }

    /// Opens a consistent read-only view of the store
    pub fn snapshot(&self) -> Result<RecordSnapshot, StoreError> {
        Ok(RecordSnapshot {
            txn: self.db.begin_read()?,
        })
    }
}

/// Operations available inside a write transaction
pub struct RecordTxn<'a> {
    txn: &'a WriteTransaction,
}

impl RecordTxn<'_> {
    pub fn find_by_user_and_url(
        &self,
        user_id: &str,
        url: &str,
    ) -> Result<Option<Record>, StoreError> {
        let index = self.txn.open_table(TABLE_USER_URL_INDEX)?;
        let Some(id) = index.get((user_id, url))?.map(|guard| guard.value().to_owned()) else {
            return Ok(None);
        };

        let records = self.txn.open_table(TABLE_RECORDS)?;
        match load(&records, &id)? {
            Some(record) => Ok(Some(record)),
            None => Err(StoreError::DanglingIndex(id)),
        }
    }

    /// Finds `id` only if it is owned by `user_id`
    pub fn find_by_user_and_id(
        &self,
        user_id: &str,
        id: &str,
    ) -> Result<Option<Record>, StoreError> {
        let records = self.txn.open_table(TABLE_RECORDS)?;
        Ok(load(&records, id)?.filter(|record| record.user_id == user_id))
    }

    /// Upserts `record` by id, assigning a fresh id when it has none
    pub fn save(&self, mut record: Record) -> Result<Record, StoreError> {
        if !record.is_persisted() {
            record.id = Uuid::new_v4().to_string();
            debug!(id = %record.id, user_id = %record.user_id, "assigned record id");
        }

        let record_json = serde_json::to_string(&record)?;
        {
            let mut records = self.txn.open_table(TABLE_RECORDS)?;
            records.insert(record.id.as_str(), record_json.as_str())?;

            let mut index = self.txn.open_table(TABLE_USER_URL_INDEX)?;
            index.insert(
                (record.user_id.as_str(), record.url.as_str()),
                record.id.as_str(),
            )?;
        }

        Ok(record)
    }
}

/// Read-only view of the store at one point in time
pub struct RecordSnapshot {
    txn: ReadTransaction,
}

impl RecordSnapshot {
    /// All records owned by `user_id`; empty when the user owns none
    pub fn find_all_by_user(&self, user_id: &str) -> Result<Vec<Record>, StoreError> {
        let index = self.txn.open_table(TABLE_USER_URL_INDEX)?;
        let records = self.txn.open_table(TABLE_RECORDS)?;

        let mut found = Vec::new();
        for entry in index.range((user_id, "")..)? {
            let (key, id) = entry?;
            if key.value().0 != user_id {
                break;
            }
            match load(&records, id.value())? {
                Some(record) => found.push(record),
                None => return Err(StoreError::DanglingIndex(id.value().to_owned())),
            }
        }

        Ok(found)
    }

    pub fn find_all(&self) -> Result<Vec<Record>, StoreError> {
        let records = self.txn.open_table(TABLE_RECORDS)?;

        records
            .iter()?
            .map(|entry| -> Result<Record, StoreError> {
                let (_, value) = entry?;
                Ok(serde_json::from_str(value.value())?)
            })
            .collect()
    }
}

fn load<T>(table: &T, id: &str) -> Result<Option<Record>, StoreError>
where
    T: ReadableTable<&'static str, &'static str>,
{
    match table.get(id)? {
        Some(guard) => Ok(Some(serde_json::from_str(guard.value())?)),
        None => Ok(None),
    }
}
