use crate::bencode::{self, Value};
use crate::Result;
use serde::Serialize;

use super::HashId;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileMeta {
    pub length: u64,
    pub path: Vec<String>,
}

#[derive(Clone, PartialEq, Eq, Serialize)]
pub struct TorrentInfo {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub files: Option<Vec<FileMeta>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub length: Option<u64>,

    pub name: String,

    #[serde(rename = "piece length")]
    pub piece_length: u64,

    #[serde(with = "serde_bytes")]
    pub pieces: Vec<u8>,

    pub private: u8,
}

impl std::fmt::Debug for TorrentInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TorrentInfo")
            .field("files", &self.files)
            .field("name", &self.name)
            .field("piece_length", &self.piece_length)
            .field("pieces_num", &self.pieces_num())
            .field("length", &self.length)
            .field("private", &self.private)
            .finish()
    }
}

impl TorrentInfo {
    pub fn get_files_meta(&self) -> Vec<FileMeta> {
        match self.files.as_ref() {
            Some(files) => files.clone(),
            None => vec![FileMeta {
                length: self.length.unwrap_or(0),
                path: vec![self.name.clone()],
            }],
        }
    }

    pub fn pieces_num(&self) -> usize {
        self.pieces.len() / super::hash::HASH_LEN
    }

    pub fn total_length(&self) -> u64 {
        if let Some(len) = self.length {
            return len;
        }
        if let Some(files) = self.files.as_ref() {
            return files.iter().map(|f| f.length).sum();
        }
        0
    }

    /// SHA-1 of the encoded info dictionary.
    pub fn info_hash(&self) -> Result<HashId> {
        let buf = bencode::to_bytes(self)?;
        Ok(HashId::sha1(&buf))
    }
}

/// A complete descriptor. It never carries an `announce` field; every
/// descriptor is private and tracker-less.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct TorrentFile {
    #[serde(rename = "created by")]
    pub created_by: String,

    #[serde(rename = "creation date")]
    pub creation_date: i64,

    pub info: TorrentInfo,
}

impl TorrentFile {
    pub fn to_value(&self) -> Result<Value> {
        bencode::to_value(self)
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        bencode::to_bytes(self)
    }

    pub fn info_hash(&self) -> Result<HashId> {
        self.info.info_hash()
    }
}
