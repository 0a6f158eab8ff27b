pub mod bencode;
pub mod config;
mod error;
pub mod torrent;
pub use error::{Error, Result};

pub const CREATED_BY: &str = concat!("TorrentGen ", env!("CARGO_PKG_VERSION"));
