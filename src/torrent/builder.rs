use super::walk::{Enumeration, PLACEHOLDER_NAME};
use super::{FileMeta, HashId, TorrentFile, TorrentInfo};

/// Fields of the descriptor that do not come from the input files.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Metadata {
    pub created_by: String,
    pub creation_date: i64,
}

/// Combines the file list and its piece hashes into a descriptor.
///
/// `pieces` must have been computed from `enumeration.files` in the same
/// order, since readers rebuild file boundaries from the cumulative lengths.
pub fn assemble(
    enumeration: &Enumeration,
    pieces: &[HashId],
    piece_length: usize,
    meta: &Metadata,
) -> TorrentFile {
    let (name, files, length) = match enumeration.files.as_slice() {
        [file] if enumeration.is_single_file => {
            let name = file
                .path_segments()
                .first()
                .cloned()
                .unwrap_or_else(|| PLACEHOLDER_NAME.to_string());
            (name, None, Some(file.length()))
        }
        files => {
            let name = if enumeration.base_name.is_empty() {
                PLACEHOLDER_NAME.to_string()
            } else {
                enumeration.base_name.clone()
            };
            let files = files
                .iter()
                .map(|f| FileMeta {
                    length: f.length(),
                    path: f.path_segments().to_vec(),
                })
                .collect();
            (name, Some(files), None)
        }
    };

    let info = TorrentInfo {
        files,
        length,
        name,
        piece_length: piece_length as u64,
        pieces: pieces.iter().flat_map(|h| h.iter().copied()).collect(),
        private: 1,
    };

    TorrentFile {
        created_by: meta.created_by.clone(),
        creation_date: meta.creation_date,
        info,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bencode;
    use crate::torrent::walk::enumerate;
    use crate::torrent::PIECE_LENGTH;
    use std::fs;

    fn meta() -> Metadata {
        Metadata {
            created_by: "tester".into(),
            creation_date: 1234,
        }
    }

    #[test]
    fn single_file_shape() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("a.iso");
        fs::write(&path, b"hello").unwrap();
        let e = enumerate(&path).unwrap();

        let pieces = [HashId::sha1(b"hello")];
        let tf = assemble(&e, &pieces, PIECE_LENGTH, &meta());
        assert_eq!(tf.info.name, "a.iso");
        assert_eq!(tf.info.length, Some(5));
        assert!(tf.info.files.is_none());
        assert_eq!(tf.info.pieces, pieces[0].to_vec());

        let v = tf.to_value().unwrap();
        assert!(v["info"].dict_get("files").is_none());
        assert_eq!(v["info"]["length"].as_i64(), Some(5));
    }

    #[test]
    fn directory_with_one_file_uses_files() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("pack");
        fs::create_dir_all(root.join("sub")).unwrap();
        fs::write(root.join("sub/x.bin"), b"abc").unwrap();
        let e = enumerate(&root).unwrap();

        let tf = assemble(&e, &[HashId::sha1(b"abc")], PIECE_LENGTH, &meta());
        assert_eq!(tf.info.name, "pack");
        assert!(tf.info.length.is_none());
        assert_eq!(
            tf.info.files,
            Some(vec![FileMeta {
                length: 3,
                path: vec!["sub".into(), "x.bin".into()],
            }])
        );
    }

    #[test]
    fn empty_directory_is_multi_file() {
        let e = Enumeration {
            is_single_file: false,
            base_name: String::new(),
            files: vec![],
        };
        let tf = assemble(&e, &[], PIECE_LENGTH, &meta());
        assert_eq!(tf.info.name, PLACEHOLDER_NAME);
        assert_eq!(tf.info.files, Some(vec![]));
        assert!(tf.info.pieces.is_empty());
    }

    #[test]
    fn fixed_fields() {
        let e = Enumeration {
            is_single_file: false,
            base_name: "x".into(),
            files: vec![],
        };
        let tf = assemble(&e, &[], PIECE_LENGTH, &meta());
        let v = tf.to_value().unwrap();

        assert_eq!(v["info"]["private"].as_i64(), Some(1));
        assert_eq!(v["info"]["piece length"].as_i64(), Some(PIECE_LENGTH as i64));
        assert_eq!(v["created by"].as_str(), Some("tester"));
        assert_eq!(v["creation date"].as_i64(), Some(1234));
        assert!(v.dict_get("announce").is_none());
        assert!(v.dict_get("announce-list").is_none());

        let top: Vec<&[u8]> = v.as_dict().unwrap().keys().map(Vec::as_slice).collect();
        assert_eq!(top, vec![&b"created by"[..], &b"creation date"[..], &b"info"[..]]);
        assert!(bencode::encode(&v).starts_with(b"d10:created by6:tester13:creation datei1234e4:infod"));
    }
}
