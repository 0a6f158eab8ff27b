use std::{
    convert,
    fmt::{Debug, Display},
    ops,
};

pub const HASH_LEN: usize = 20;

/// A SHA-1 digest, used for piece hashes and the info hash.
#[derive(Default, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct HashId([u8; HASH_LEN]);

impl HashId {
    pub fn sha1(data: &[u8]) -> Self {
        let digest = ring::digest::digest(&ring::digest::SHA1_FOR_LEGACY_USE_ONLY, data);
        Self::from_digest(digest)
    }

    fn from_digest(digest: ring::digest::Digest) -> Self {
        let mut id = [0u8; HASH_LEN];
        id.copy_from_slice(digest.as_ref());
        Self(id)
    }
}

impl Debug for HashId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        Display::fmt(&self, f)
    }
}

impl Display for HashId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", hex::encode(self))
    }
}

impl ops::Deref for HashId {
    type Target = [u8; HASH_LEN];
    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl convert::AsRef<[u8]> for HashId {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}
