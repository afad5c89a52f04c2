//! Data models for the URL shortener application
//!
//! This module defines the persisted record, the derived statistics view and
//! the error body returned by the API.

use serde::{Deserialize, Serialize};

/// One (user, URL) pairing ever created
///
/// At most one record exists per `(user_id, url)`. Repeated creation bumps
/// `creation_count` instead of inserting a duplicate.
///
/// # Example
/// ```json
/// {
///   "id": "e02a1c6b-9574-4178-b01a-88d9c2ccf1e2",
///   "userId": "user",
///   "url": "http://www.google.com/",
///   "creationCount": 1,
///   "callCount": 0
/// }
/// ```
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Record {
    /// Opaque identifier assigned by the store on first save
    ///
    /// Empty until the record has been persisted.
    #[serde(default)]
    pub id: String,

    /// Owner of the record
    pub user_id: String,

    /// The original long URL
    pub url: String,

    /// Number of `create` calls for this exact `(user_id, url)` pair
    pub creation_count: u64,

    /// Number of successful resolutions of `id`
    #[serde(default)]
    pub call_count: u64,
}

impl Record {
    /// Builds a record for a first creation, not yet persisted
    pub fn new(user_id: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            id: String::new(),
            user_id: user_id.into(),
            url: url.into(),
            creation_count: 1,
            call_count: 0,
        }
    }

    /// Whether the store has assigned an identifier yet
    pub fn is_persisted(&self) -> bool {
        !self.id.is_empty()
    }
}

/// Counters of every record sharing one URL, summed
///
/// Derived on read, never stored.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Hash)]
#[serde(rename_all = "camelCase")]
pub struct Statistics {
    pub url: String,
    pub creation_count: u64,
    pub call_count: u64,
}

/// Body of every error response
///
/// # Example
/// ```json
/// {
///   "error_code": 1804289383,
///   "error_type": "Bad Request",
///   "error_description": "Request has invalid parameters",
///   "more_info": "Invalid URL - abcde"
/// }
/// ```
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct ErrorDetails {
    /// Random non-negative number, also written to the log line of the failure
    #[serde(rename = "error_code")]
    pub code: u32,

    /// Reason phrase of the HTTP status
    #[serde(rename = "error_type")]
    pub kind: String,

    /// Fixed category string
    #[serde(rename = "error_description")]
    pub description: String,

    /// Message of the underlying failure
    pub more_info: String,
}
