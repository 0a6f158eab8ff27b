use crate::{Error, Result};
use std::fs;
use std::path::{Component, Path, PathBuf};
use tracing::{debug, trace};
use walkdir::WalkDir;

/// Name used when the input path has no usable final component.
pub const PLACEHOLDER_NAME: &str = "torrent";

/// One input file, as it will appear in the descriptor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileDescriptor {
    path_segments: Vec<String>,
    length: u64,
    source: PathBuf,
}

impl FileDescriptor {
    pub fn path_segments(&self) -> &[String] {
        &self.path_segments
    }

    pub fn length(&self) -> u64 {
        self.length
    }

    pub fn source(&self) -> &Path {
        &self.source
    }

    /// The relative path joined with `/`, whatever the host separator is.
    pub fn display_path(&self) -> String {
        self.path_segments.join("/")
    }
}

#[derive(Debug, Clone)]
pub struct Enumeration {
    pub is_single_file: bool,
    pub base_name: String,
    pub files: Vec<FileDescriptor>,
}

impl Enumeration {
    pub fn total_length(&self) -> u64 {
        self.files.iter().map(|f| f.length).sum()
    }
}

/// Lists the files below `input`.
///
/// A regular file yields itself. Other non-directories (sockets, fifos,
/// devices) are rejected with `NotReadable`. A directory yields every regular file
/// beneath it, sorted by relative path segments so the result only depends
/// on the tree's contents. Symlinks to files are included; symlinked
/// directories are not descended into.
pub fn enumerate(input: impl AsRef<Path>) -> Result<Enumeration> {
    let input = input.as_ref();
    let meta = match fs::metadata(input) {
        Ok(meta) => meta,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            return Err(Error::PathNotFound(input.to_path_buf()))
        }
        Err(err) => return Err(Error::not_readable(input, err)),
    };

    if !meta.is_dir() && !meta.is_file() {
        let err = std::io::Error::new(
            std::io::ErrorKind::InvalidInput,
            "not a regular file or directory",
        );
        return Err(Error::not_readable(input, err));
    }

    let base_name = base_name(input);

    if meta.is_file() {
        let file = describe(input, vec![base_name.clone()])?;
        debug!(path = ?input, length = file.length, "single file input");
        return Ok(Enumeration {
            is_single_file: true,
            base_name,
            files: vec![file],
        });
    }

    let mut files = vec![];
    for entry in WalkDir::new(input).min_depth(1) {
        let entry = entry.map_err(|err| {
            let path = err.path().unwrap_or(input).to_path_buf();
            Error::not_readable(path, err.into())
        })?;

        let is_file = entry.file_type().is_file()
            || (entry.path_is_symlink() && entry.path().is_file());
        if !is_file {
            continue;
        }

        let relative = entry
            .path()
            .strip_prefix(input)
            .map_err(|_| Error::InvalidPath(entry.path().to_path_buf()))?;
        let segments = segments(relative)?;
        trace!(path = %segments.join("/"), "found file");
        files.push(describe(entry.path(), segments)?);
    }

    files.sort_by(|a, b| a.path_segments.cmp(&b.path_segments));
    debug!(path = ?input, count = files.len(), "enumerated directory");

    Ok(Enumeration {
        is_single_file: false,
        base_name,
        files,
    })
}

fn describe(path: &Path, path_segments: Vec<String>) -> Result<FileDescriptor> {
    // opening proves readability; the handle is dropped right away
    let file = fs::File::open(path).map_err(|err| Error::not_readable(path, err))?;
    let length = file
        .metadata()
        .map_err(|err| Error::not_readable(path, err))?
        .len();
    Ok(FileDescriptor {
        path_segments,
        length,
        source: path.to_path_buf(),
    })
}

fn segments(relative: &Path) -> Result<Vec<String>> {
    relative
        .components()
        .map(|c| match c {
            Component::Normal(s) => s
                .to_str()
                .map(str::to_owned)
                .ok_or_else(|| Error::InvalidPath(relative.to_path_buf())),
            _ => Err(Error::InvalidPath(relative.to_path_buf())),
        })
        .collect()
}

fn base_name(input: &Path) -> String {
    input
        .file_name()
        .and_then(|s| s.to_str())
        .filter(|s| !s.is_empty())
        .unwrap_or(PLACEHOLDER_NAME)
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write(root: &Path, rel: &str, len: usize) {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, vec![7u8; len]).unwrap();
    }

    #[test]
    fn single_file() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "movie.mkv", 12);

        let e = enumerate(dir.path().join("movie.mkv")).unwrap();
        assert!(e.is_single_file);
        assert_eq!(e.base_name, "movie.mkv");
        assert_eq!(e.files.len(), 1);
        assert_eq!(e.files[0].path_segments(), ["movie.mkv"]);
        assert_eq!(e.files[0].length(), 12);
    }

    #[test]
    fn directory_is_sorted_by_segments() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("album");
        write(&root, "b.txt", 1);
        write(&root, "a/z.txt", 2);
        write(&root, "a.txt", 3);
        write(&root, "a/b/c.txt", 4);
        fs::create_dir_all(root.join("empty")).unwrap();

        let e = enumerate(&root).unwrap();
        assert!(!e.is_single_file);
        assert_eq!(e.base_name, "album");
        let paths: Vec<String> = e.files.iter().map(|f| f.display_path()).collect();
        assert_eq!(paths, ["a/b/c.txt", "a/z.txt", "a.txt", "b.txt"]);
        assert_eq!(e.total_length(), 10);
    }

    #[test]
    fn nested_segments_have_no_separators() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "x/y/z.bin", 1);

        let e = enumerate(dir.path()).unwrap();
        assert_eq!(e.files[0].path_segments(), ["x", "y", "z.bin"]);
        for seg in e.files[0].path_segments() {
            assert!(!seg.contains('/') && !seg.contains('\\'));
        }
    }

    #[test]
    fn directory_with_one_file_is_not_single() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "only.bin", 5);

        let e = enumerate(dir.path()).unwrap();
        assert!(!e.is_single_file);
        assert_eq!(e.files.len(), 1);
    }

    #[test]
    fn empty_directory() {
        let dir = tempfile::tempdir().unwrap();
        let e = enumerate(dir.path()).unwrap();
        assert!(e.files.is_empty());
        assert_eq!(e.total_length(), 0);
    }

    #[test]
    fn missing_path() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope");
        match enumerate(&missing) {
            Err(Error::PathNotFound(p)) => assert_eq!(p, missing),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[cfg(unix)]
    #[test]
    fn symlink_loop_is_not_readable() {
        let dir = tempfile::tempdir().unwrap();
        let link = dir.path().join("loop");
        std::os::unix::fs::symlink("loop", &link).unwrap();

        match enumerate(&link) {
            Err(Error::NotReadable { path, .. }) => assert_eq!(path, link),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[cfg(unix)]
    #[test]
    fn socket_input_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let sock = dir.path().join("ctl.sock");
        let _listener = std::os::unix::net::UnixListener::bind(&sock).unwrap();

        match enumerate(&sock) {
            Err(Error::NotReadable { path, source }) => {
                assert_eq!(path, sock);
                assert_eq!(source.kind(), std::io::ErrorKind::InvalidInput);
            }
            other => panic!("unexpected {other:?}"),
        }

        // inside a directory, non-regular entries are skipped
        write(dir.path(), "data.bin", 3);
        let e = enumerate(dir.path()).unwrap();
        let paths: Vec<String> = e.files.iter().map(|f| f.display_path()).collect();
        assert_eq!(paths, ["data.bin"]);
    }

    #[test]
    fn base_name_placeholder() {
        assert_eq!(base_name(Path::new("/")), PLACEHOLDER_NAME);
        assert_eq!(base_name(Path::new(".")), PLACEHOLDER_NAME);
        assert_eq!(base_name(Path::new("dir/")), "dir");
        assert_eq!(base_name(Path::new("a/b.iso")), "b.iso");
    }
}
