//! Link service: create, resolve and aggregate records
//!
//! The service accepts any non-blank URL; syntax checks belong to the HTTP
//! layer.

use std::collections::HashMap;

use tracing::{debug, info};

use crate::error::{Error, Result};
use crate::model::{Record, Statistics};
use crate::store::RecordStore;

#[derive(Clone)]
pub struct LinkService {
    store: RecordStore,
}

impl LinkService {
    pub fn new(store: RecordStore) -> Self {
        Self { store }
    }

    /// Creates the record for `(user_id, url)` or bumps its creation count
    pub fn create(&self, user_id: &str, url: &str) -> Result<Record> {
        require_text(user_id, || format!("Invalid user id {}", user_id))?;
        require_text(url, || format!("Invalid URL {}", url))?;

        let record = self.store.write(|txn| {
            let record = match txn.find_by_user_and_url(user_id, url)? {
                Some(mut existing) => {
                    existing.creation_count += 1;
                    existing
                }
                None => Record::new(user_id, url),
            };
            Ok::<_, Error>(txn.save(record)?)
        })?;

        info!(
            id = %record.id,
            user_id,
            creation_count = record.creation_count,
            "recorded creation"
        );
        Ok(record)
    }

    /// Returns the URL of `id` and bumps its call count
    ///
    /// Fails with `NotFound` when `id` does not exist or belongs to another user.
    pub fn resolve(&self, user_id: &str, id: &str) -> Result<String> {
        require_text(user_id, || format!("Invalid user id {}", user_id))?;
        require_text(id, || format!("Invalid id {}", id))?;

        let record = self.store.write(|txn| {
            let mut record = txn.find_by_user_and_id(user_id, id)?.ok_or_else(|| {
                Error::NotFound(format!(
                    "No URL available for the userid {} id {}",
                    user_id, id
                ))
            })?;
            record.call_count += 1;
            Ok::<_, Error>(txn.save(record)?)
        })?;

        debug!(id, user_id, call_count = record.call_count, "resolved");
        Ok(record.url)
    }

    /// Statistics over the records owned by `user_id`
    ///
    /// A user owning no records gets an empty list.
    pub fn user_statistics(&self, user_id: &str) -> Result<Vec<Statistics>> {
        require_text(user_id, || format!("Invalid user id {}", user_id))?;

        let records = self.store.snapshot()?.find_all_by_user(user_id)?;
        debug!(user_id, records = records.len(), "aggregating user statistics");
        Ok(aggregate(&records))
    }

    /// Statistics over every record in the store
    pub fn all_statistics(&self) -> Result<Vec<Statistics>> {
        let records = self.store.snapshot()?.find_all()?;
        debug!(records = records.len(), "aggregating statistics");
        Ok(aggregate(&records))
    }
}

fn require_text(value: &str, message: impl FnOnce() -> String) -> Result<()> {
    if value.trim().is_empty() {
        return Err(Error::InvalidArgument(message()));
    }
    Ok(())
}

/// Groups records by URL, summing both counters
///
/// Order of the result follows map iteration and is not stable.
fn aggregate(records: &[Record]) -> Vec<Statistics> {
    let mut creation_counts: HashMap<&str, u64> = HashMap::new();
    let mut call_counts: HashMap<&str, u64> = HashMap::new();

    for record in records {
        *creation_counts.entry(record.url.as_str()).or_default() += record.creation_count;
        *call_counts.entry(record.url.as_str()).or_default() += record.call_count;
    }

    creation_counts
        .into_iter()
        .map(|(url, creation_count)| Statistics {
            url: url.to_string(),
            creation_count,
            call_count: call_counts.get(url).copied().unwrap_or_default(),
        })
        .collect()
}
