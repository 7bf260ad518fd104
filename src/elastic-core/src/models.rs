use serde::{Deserialize, Deserializer, Serialize};
use std::num::ParseIntError;

/// Media type for ordinary JSON request bodies
pub const JSON_MEDIA_TYPE: &str = "application/json";

/// Media type the `_bulk` endpoint expects (newline-delimited JSON)
pub const NDJSON_MEDIA_TYPE: &str = "application/x-ndjson";

/// Catalog endpoint for cluster health, JSON formatted
pub const URI_HEALTH: &str = "/_cat/health?format=json";

/// Catalog endpoint for the index list, JSON formatted
pub const URI_INDICES: &str = "/_cat/indices?format=json";

/// Prefix the service uses for system indices (`.kibana`, `.security`, ...)
pub const RESERVED_INDEX_PREFIX: char = '.';

/// Header is a key/value pair attached to an outgoing request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Header {
    pub key: &'static str,
    pub value: &'static str,
}

impl Header {
    pub const fn new(key: &'static str, value: &'static str) -> Self {
        Self { key, value }
    }
}

/// Headers sent with every request except bulk operations
pub const STANDARD_HEADERS: &[Header] = &[Header::new("Content-Type", JSON_MEDIA_TYPE)];

/// Headers sent with bulk operations
pub const BULK_HEADERS: &[Header] = &[Header::new("Content-Type", NDJSON_MEDIA_TYPE)];

/// Health colour reported by the catalog endpoints
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Health {
    Green,
    Yellow,
    Red,
    #[default]
    #[serde(other)]
    Unknown,
}

/// Whether an index is open for reads and writes
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IndexStatus {
    Open,
    Close,
    #[default]
    #[serde(other)]
    Unknown,
}

/// IndexRecord is one row of `/_cat/indices`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexRecord {
    pub uuid: String,
    #[serde(rename = "index")]
    pub name: String,
    /// Closed indices may report no health
    #[serde(default, deserialize_with = "null_as_default")]
    pub health: Health,
    #[serde(default, deserialize_with = "null_as_default")]
    pub status: IndexStatus,
    /// Document count exactly as the service reported it. Closed indices
    /// report no count at all.
    #[serde(
        rename = "docs.count",
        alias = "docs.Count",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub count: Option<String>,
    /// Parsed form of `count`, filled in by the client after listing
    #[serde(skip)]
    pub docs: u64,
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

impl IndexRecord {
    /// True for system indices whose name starts with the reserved prefix
    pub fn is_hidden(&self) -> bool {
        self.name.starts_with(RESERVED_INDEX_PREFIX)
    }

    /// Parse the reported count. `Ok(None)` means the service sent no count.
    pub fn parse_doc_count(&self) -> Result<Option<u64>, ParseIntError> {
        self.count
            .as_deref()
            .map(|c| c.trim().parse::<u64>())
            .transpose()
    }
}
