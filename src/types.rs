use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use tabled::Tabled;

use crate::tile::{GranuleName, TilePosition};

/// One entry of an archive directory listing.
///
/// The well-known fields are typed; everything else the archive sends is
/// kept verbatim in `attributes`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    pub name: String,
    #[serde(
        rename = "last-modified",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub last_modified: Option<String>,
    #[serde(
        default,
        deserialize_with = "lenient_size",
        skip_serializing_if = "Option::is_none"
    )]
    pub size: Option<u64>,
    #[serde(flatten)]
    pub attributes: BTreeMap<String, Value>,
}

impl Record {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            last_modified: None,
            size: None,
            attributes: BTreeMap::new(),
        }
    }

    pub fn with_size(mut self, size: u64) -> Self {
        self.size = Some(size);
        self
    }

    pub fn with_last_modified(mut self, last_modified: impl Into<String>) -> Self {
        self.last_modified = Some(last_modified.into());
        self
    }

    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }

    /// Looks up any attribute by the name the archive uses for it.
    pub fn attribute(&self, key: &str) -> Option<Value> {
        match key {
            "name" => Some(Value::from(self.name.clone())),
            "last-modified" => self.last_modified.clone().map(Value::from),
            "size" => self.size.map(Value::from),
            _ => self.attributes.get(key).cloned(),
        }
    }
}

// The archive reports sizes as numbers for files and sometimes as strings.
fn lenient_size<'de, D>(deserializer: D) -> Result<Option<u64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::Number(n)) => n.as_u64(),
        Some(Value::String(s)) => s.trim().parse().ok(),
        _ => None,
    })
}

/// Payload shapes accepted from a listing endpoint.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum ListingPayload {
    Entries(Vec<Record>),
    Wrapped { content: Vec<Record> },
}

impl ListingPayload {
    pub fn into_records(self) -> Vec<Record> {
        match self {
            ListingPayload::Entries(records) => records,
            ListingPayload::Wrapped { content } => content,
        }
    }
}

/// A file inside a product day. Not a hierarchy node, just a record with
/// its resolved URL and whatever could be read from its name.
#[derive(Debug, Clone, PartialEq)]
pub struct Image {
    pub record: Record,
    pub url: String,
    pub position: Option<TilePosition>,
    pub granule: Option<GranuleName>,
}

impl Image {
    pub fn name(&self) -> &str {
        &self.record.name
    }
}

#[derive(Tabled)]
pub struct EntryTableRow {
    pub name: String,
    pub last_modified: String,
    pub size: String,
}

impl From<&Record> for EntryTableRow {
    fn from(record: &Record) -> Self {
        EntryTableRow {
            name: record.name.clone(),
            last_modified: record.last_modified.clone().unwrap_or_default(),
            size: record.size.map(|s| s.to_string()).unwrap_or_default(),
        }
    }
}

#[derive(Tabled)]
pub struct ImageTableRow {
    pub name: String,
    pub tile: String,
    pub size: String,
}

impl From<&Image> for ImageTableRow {
    fn from(image: &Image) -> Self {
        ImageTableRow {
            name: image.name().to_string(),
            tile: image.position.map(|p| p.to_string()).unwrap_or_default(),
            size: image.record.size.map(|s| s.to_string()).unwrap_or_default(),
        }
    }
}

#[derive(Tabled)]
pub struct MatchTableRow {
    pub date: String,
    pub day: String,
    pub name: String,
    pub url: String,
}
