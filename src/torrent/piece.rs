use super::walk::FileDescriptor;
use super::HashId;
use crate::{Error, Result};
use bytes::BytesMut;
use std::cmp;
use std::fs;
use std::io::{self, Read};
use tracing::{debug, trace};

/// Piece size used for every descriptor this crate produces (256 KiB).
pub const PIECE_LENGTH: usize = 262144;

const READ_BUF_LEN: usize = 64 << 10;

/// Number of pieces covering `total_len` bytes. An empty stream has none.
/// `piece_len` must be non-zero.
pub fn calc_piece_num(total_len: u64, piece_len: usize) -> u64 {
    total_len.div_ceil(piece_len as u64)
}

/// Collects bytes into fixed-size pieces and hashes each one as it fills.
pub struct PieceAccumulator {
    buf: BytesMut,
    piece_len: usize,
}

impl PieceAccumulator {
    pub fn new(piece_len: usize) -> Result<Self> {
        if piece_len == 0 {
            return Err(Error::InvalidInput("piece length must be positive".into()));
        }
        Ok(Self {
            buf: BytesMut::with_capacity(piece_len),
            piece_len,
        })
    }

    /// Takes as many bytes from `data` as fit in the current piece.
    ///
    /// Returns the hash of the piece if it just became full, together with
    /// the bytes that were not consumed.
    pub fn feed<'a>(&mut self, data: &'a [u8]) -> (Option<HashId>, &'a [u8]) {
        let take = cmp::min(self.piece_len - self.buf.len(), data.len());
        let (head, rest) = data.split_at(take);
        self.buf.extend_from_slice(head);

        if self.buf.len() == self.piece_len {
            let hash = HashId::sha1(&self.buf);
            self.buf.clear();
            (Some(hash), rest)
        } else {
            (None, rest)
        }
    }

    /// Feeds all of `data`, appending every completed piece to `out`.
    pub fn feed_all(&mut self, mut data: &[u8], out: &mut Vec<HashId>) {
        while !data.is_empty() {
            let (piece, rest) = self.feed(data);
            out.extend(piece);
            data = rest;
        }
    }

    /// Bytes waiting in the unfinished piece.
    pub fn pending(&self) -> usize {
        self.buf.len()
    }

    /// Hashes the short trailing piece, if any bytes are left over.
    pub fn finish(self) -> Option<HashId> {
        if self.buf.is_empty() {
            None
        } else {
            Some(HashId::sha1(&self.buf))
        }
    }
}

/// Hashes the concatenation of `files` in order, `piece_len` bytes at a time.
///
/// Pieces cross file boundaries. Each file is streamed in small chunks and
/// closed before the next one is opened.
pub fn hash_pieces(files: &[FileDescriptor], piece_len: usize) -> Result<Vec<HashId>> {
    let mut acc = PieceAccumulator::new(piece_len)?;
    let total: u64 = files.iter().map(|f| f.length()).sum();
    let mut pieces = Vec::with_capacity(calc_piece_num(total, piece_len) as usize);
    let mut read_buf = vec![0u8; cmp::min(READ_BUF_LEN, piece_len)];

    for file in files {
        let hashed_before = pieces.len();
        hash_file(file, &mut acc, &mut read_buf, &mut pieces)?;
        trace!(
            path = %file.display_path(),
            pieces = pieces.len() - hashed_before,
            pending = acc.pending(),
            "hashed file"
        );
    }
    pieces.extend(acc.finish());

    debug!(total, count = pieces.len(), piece_len, "hashed pieces");
    Ok(pieces)
}

fn hash_file(
    file: &FileDescriptor,
    acc: &mut PieceAccumulator,
    read_buf: &mut [u8],
    pieces: &mut Vec<HashId>,
) -> Result<()> {
    let path = file.source();
    let mut f = fs::File::open(path).map_err(|err| Error::read(path, err))?;
    let mut remaining = file.length();

    loop {
        let n = match f.read(read_buf) {
            Ok(0) => break,
            Ok(n) => n,
            Err(err) if err.kind() == io::ErrorKind::Interrupted => continue,
            Err(err) => return Err(Error::read(path, err)),
        };
        remaining = remaining.checked_sub(n as u64).ok_or_else(|| changed(file))?;
        acc.feed_all(&read_buf[..n], pieces);
    }

    if remaining != 0 {
        return Err(changed(file));
    }
    Ok(())
}

fn changed(file: &FileDescriptor) -> Error {
    Error::read(
        file.source(),
        io::Error::new(
            io::ErrorKind::UnexpectedEof,
            format!("file changed during hashing, expected {} bytes", file.length()),
        ),
    )
}
