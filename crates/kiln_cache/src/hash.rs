//! 128-bit content hashes.

use std::fmt;
use std::io::Read;

use serde::{Deserialize, Serialize};
use xxhash_rust::xxh3::Xxh3;

/// Size of the read buffer used when hashing a stream.
const CHUNK: usize = 64 * 1024;

/// A 128-bit XXH3 content hash.
///
/// Two files with the same `ContentHash` are assumed to have identical content.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ContentHash([u8; 16]);

impl ContentHash {
    /// Hashes an in-memory byte slice.
    pub fn from_bytes(data: &[u8]) -> Self {
        Self(xxhash_rust::xxh3::xxh3_128(data).to_le_bytes())
    }

    /// Hashes everything readable from `reader` without buffering it whole.
    ///
    /// Produces the same value as [`ContentHash::from_bytes`] over the same bytes.
    pub fn from_reader<R: Read>(mut reader: R) -> std::io::Result<Self> {
        let mut state = Xxh3::new();
        let mut buf = vec![0u8; CHUNK];
        loop {
            let n = reader.read(&mut buf)?;
            if n == 0 {
                break;
            }
            state.update(&buf[..n]);
        }
        Ok(Self(state.digest128().to_le_bytes()))
    }
}

impl fmt::Display for ContentHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.iter().try_for_each(|byte| write!(f, "{byte:02x}"))
    }
}

impl fmt::Debug for ContentHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ContentHash({:02x}{:02x}..)", self.0[0], self.0[1])
    }
}
