mod builder;
mod file;
mod hash;
mod piece;
mod walk;
use crate::bencode;
use crate::{Error, Result};
pub use builder::{assemble, Metadata};
pub use file::{FileMeta, TorrentFile, TorrentInfo};
pub use hash::{HashId, HASH_LEN};
pub use piece::{calc_piece_num, hash_pieces, PieceAccumulator, PIECE_LENGTH};
pub use walk::{enumerate, Enumeration, FileDescriptor, PLACEHOLDER_NAME};

use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

#[derive(Debug, Clone)]
pub struct CreateSummary {
    pub info_hash: HashId,
    pub piece_count: usize,
    pub total_length: u64,
    pub file_count: usize,
    pub output: PathBuf,
}

/// Builds the descriptor for `input` without writing it anywhere.
pub fn build_torrent(input: impl AsRef<Path>, meta: &Metadata) -> Result<TorrentFile> {
    let enumeration = enumerate(input)?;
    let pieces = hash_pieces(&enumeration.files, PIECE_LENGTH)?;
    Ok(assemble(&enumeration, &pieces, PIECE_LENGTH, meta))
}

/// Runs the whole pipeline and writes the encoded descriptor to `output`.
///
/// The bytes go to a temporary file next to `output` which is renamed into
/// place only once fully written, so a failed run leaves nothing at `output`.
pub fn create_torrent(
    input: impl AsRef<Path>,
    output: impl AsRef<Path>,
    meta: &Metadata,
) -> Result<CreateSummary> {
    let (input, output) = (input.as_ref(), output.as_ref());
    debug!(?input, ?output, "create torrent");

    let torrent = build_torrent(input, meta)?;
    let written = write_atomic(output, &torrent)?;

    let summary = CreateSummary {
        info_hash: torrent.info_hash()?,
        piece_count: torrent.info.pieces_num(),
        total_length: torrent.info.total_length(),
        file_count: torrent.info.get_files_meta().len(),
        output: output.to_path_buf(),
    };
    info!(
        info_hash = %summary.info_hash,
        pieces = summary.piece_count,
        bytes = written,
        ?output,
        "torrent written"
    );
    Ok(summary)
}

// streams the encoding into a temp file beside `output`, returning its size
fn write_atomic(output: &Path, torrent: &TorrentFile) -> Result<u64> {
    let write_err = |err| Error::write(output, err);
    let dir = match output.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    let mut tmp = tempfile::NamedTempFile::new_in(dir).map_err(write_err)?;
    {
        let mut w = BufWriter::new(tmp.as_file_mut());
        bencode::to_writer(&mut w, torrent).map_err(|err| match err {
            Error::Io(err) => write_err(err),
            err => err,
        })?;
        w.flush().map_err(write_err)?;
    }
    let file = tmp.as_file();
    file.sync_all().map_err(write_err)?;
    let written = file.metadata().map_err(write_err)?.len();
    // on error the temporary file is dropped and removed
    tmp.persist(output).map_err(|err| write_err(err.error))?;
    Ok(written)
}

/// Recomputes the info hash of an encoded descriptor.
///
/// The hash covers the exact bytes of the stored `info` dictionary, which the
/// strict decoder guarantees re-encode identically.
pub fn info_hash_of(torrent: &[u8]) -> Result<HashId> {
    let v = bencode::from_bytes(torrent)?;
    let info = v
        .dict_get("info")
        .filter(|info| info.as_dict().is_some())
        .ok_or_else(|| Error::Decode("missing info dictionary".into()))?;
    Ok(HashId::sha1(&bencode::encode(info)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn meta() -> Metadata {
        Metadata {
            created_by: "tester".into(),
            creation_date: 42,
        }
    }

    #[test]
    fn info_hash_of_matches_written_torrent() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("data.bin");
        fs::write(&input, vec![1u8; 1000]).unwrap();
        let out = dir.path().join("data.torrent");

        let summary = create_torrent(&input, &out, &meta()).unwrap();
        let written = fs::read(&out).unwrap();
        assert_eq!(info_hash_of(&written).unwrap(), summary.info_hash);
        assert_eq!(summary.piece_count, 1);
        assert_eq!(summary.total_length, 1000);
        assert_eq!(summary.file_count, 1);
    }

    #[test]
    fn streamed_output_matches_buffered_encoding() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("set");
        fs::create_dir(&input).unwrap();
        fs::write(input.join("a"), vec![7u8; PIECE_LENGTH + 3]).unwrap();
        fs::write(input.join("b"), b"tail").unwrap();
        let out = dir.path().join("set.torrent");

        create_torrent(&input, &out, &meta()).unwrap();
        let expected = build_torrent(&input, &meta()).unwrap().to_bytes().unwrap();
        assert_eq!(fs::read(&out).unwrap(), expected);
    }

    #[test]
    fn info_hash_of_rejects_garbage() {
        assert!(info_hash_of(b"i1e").is_err());
        assert!(info_hash_of(b"d4:infoi1ee").is_err());
        assert!(info_hash_of(b"not bencode").is_err());
    }

    #[test]
    fn failed_run_leaves_no_output() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("missing.torrent");
        let err = create_torrent(dir.path().join("missing"), &out, &meta()).unwrap_err();
        assert!(matches!(err, Error::PathNotFound(_)));
        assert!(!out.exists());
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[test]
    fn unwritable_output() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("a");
        fs::write(&input, b"a").unwrap();
        let out = dir.path().join("no/such/dir/a.torrent");
        let err = create_torrent(&input, &out, &meta()).unwrap_err();
        assert!(matches!(err, Error::Write { .. }));
    }
}
