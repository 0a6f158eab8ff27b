use crate::torrent::Metadata;
use crate::{Error, Result, CREATED_BY};
use chrono::{DateTime, Utc};
use std::fs;
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Value of the `created by` field.
    pub created_by: String,
    /// Fixed `creation date` in seconds since the epoch. The current time is
    /// used when unset.
    pub creation_date: Option<i64>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            created_by: CREATED_BY.to_string(),
            creation_date: None,
        }
    }
}

impl Config {
    pub fn load_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        let value = content.parse::<serde_json::Value>()?;

        let mut config = Self::default();
        config.merge_json(&value)?;
        Ok(config)
    }

    pub fn merge_json(&mut self, val: &serde_json::Value) -> Result<()> {
        let table = val
            .as_object()
            .ok_or_else(|| Error::Config("expect a json object".into()))?;
        if let Some(val) = table.get("created_by") {
            self.created_by = val
                .as_str()
                .ok_or_else(|| Error::Config("created_by must be a string".into()))?
                .to_string();
        }
        if let Some(val) = table.get("creation_date") {
            self.creation_date = match val {
                serde_json::Value::Null => None,
                val => Some(val.as_i64().ok_or_else(|| {
                    Error::Config("creation_date must be an integer".into())
                })?),
            };
        }
        Ok(())
    }

    /// Resolves the metadata handed to the assembler, falling back to `now`
    /// for the creation date.
    pub fn metadata(&self, now: DateTime<Utc>) -> Metadata {
        Metadata {
            created_by: self.created_by.clone(),
            creation_date: self.creation_date.unwrap_or_else(|| now.timestamp()),
        }
    }
}
