//! Database initialization and table definitions
//!
//! This module handles the setup of the embedded redb database and defines
//! the tables backing the record store.

use redb::{Database, TableDefinition};

/// Main table for storing records
///
/// Key: Record id as string
/// Value: JSON-serialized Record as string
///
/// Example:
/// - Key: "e02a1c6b-9574-4178-b01a-88d9c2ccf1e2"
/// - Value: '{"id":"e02a1c6b-...","userId":"user","url":"http://a.com",...}'
pub const TABLE_RECORDS: TableDefinition<&str, &str> = TableDefinition::new("records_v1");

/// Index table for lookups by owner and URL
///
/// Key: `(user_id, url)` tuple
/// Value: Record id
///
/// Tuple keys order by `user_id` first, so every key of one user sits in one
/// contiguous run starting at `(user_id, "")`.
pub const TABLE_USER_URL_INDEX: TableDefinition<(&str, &str), &str> =
    TableDefinition::new("user_url_index_v2");

/// Initializes the embedded database and creates required tables
///
/// # Arguments
///
/// * `db_path` - File path where the database should be stored (e.g., "data.db")
///
/// # Example
///
/// ```no_run
/// # use tinyurl::database::init_db;
/// let db = init_db("data.db").expect("Failed to initialize database");
/// ```
pub fn init_db(db_path: &str) -> Result<Database, redb::Error> {
    let db = Database::create(db_path)?;

    let write_txn = db.begin_write()?;
    {
        write_txn.open_table(TABLE_RECORDS)?;
        write_txn.open_table(TABLE_USER_URL_INDEX)?;
    }
    write_txn.commit()?;

    Ok(db)
}
