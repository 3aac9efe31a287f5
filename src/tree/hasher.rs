//! Content hashing for snapshot files

use crate::types::Digest;
use data_encoding::BASE32_NOPAD;
use std::io::{self, Read};

/// Read buffer size for hashing
pub const CHUNK_SIZE: usize = 4096;

/// Default number of base-32 characters kept in a short hash
pub const DEFAULT_SHORT_HASH_LEN: usize = 15;

/// Length of a full base-32 encoded digest
pub const MAX_SHORT_HASH_LEN: usize = 52;

/// Compute the BLAKE3 digest of everything `reader` yields.
///
/// Only a zero-length read ends the loop; a full buffer says nothing about EOF.
pub fn hash_reader<R: Read + ?Sized>(reader: &mut R) -> io::Result<Digest> {
    let mut hasher = blake3::Hasher::new();
    let mut buf = [0u8; CHUNK_SIZE];
    loop {
        let len = match reader.read(&mut buf) {
            Ok(0) => break,
            Ok(len) => len,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        };
        hasher.update(&buf[..len]);
    }
    Ok(*hasher.finalize().as_bytes())
}

/// Printable short form of a digest: the first `len` base-32 characters.
///
/// Distinct files may share a short hash; grouping by it is a convenience.
pub fn short_hash(digest: &Digest, len: usize) -> String {
    let mut encoded = BASE32_NOPAD.encode(digest);
    encoded.truncate(len.min(MAX_SHORT_HASH_LEN));
    encoded
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Reader that hands out at most `step` bytes per call.
    struct Trickle<'a> {
        data: &'a [u8],
        step: usize,
    }

    impl Read for Trickle<'_> {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            let n = self.step.min(buf.len()).min(self.data.len());
            buf[..n].copy_from_slice(&self.data[..n]);
            self.data = &self.data[n..];
            Ok(n)
        }
    }

    #[test]
    fn test_hash_matches_blake3() {
        let data = b"hello world";
        let digest = hash_reader(&mut &data[..]).unwrap();
        assert_eq!(digest, *blake3::hash(data).as_bytes());
    }

    #[test]
    fn test_exact_chunk_multiple_is_fully_read() {
        let data = vec![7u8; CHUNK_SIZE * 2];
        let digest = hash_reader(&mut &data[..]).unwrap();
        assert_eq!(digest, *blake3::hash(&data).as_bytes());
    }

    #[test]
    fn test_short_reads_do_not_end_hashing() {
        let data: Vec<u8> = (0..10_000u32).map(|i| (i % 251) as u8).collect();
        let mut reader = Trickle {
            data: &data,
            step: 100,
        };
        let digest = hash_reader(&mut reader).unwrap();
        assert_eq!(digest, *blake3::hash(&data).as_bytes());
    }

    #[test]
    fn test_short_hash_is_base32_prefix() {
        let digest = *blake3::hash(b"foobar").as_bytes();
        let full = BASE32_NOPAD.encode(&digest);
        assert!(full
            .bytes()
            .all(|c| c.is_ascii_uppercase() || (b'2'..=b'7').contains(&c)));
        assert_eq!(short_hash(&digest, 15), &full[..15]);
    }

    #[test]
    fn test_short_hash_length() {
        let digest = [0xabu8; 32];
        assert_eq!(BASE32_NOPAD.encode(&digest).len(), MAX_SHORT_HASH_LEN);
        assert_eq!(short_hash(&digest, DEFAULT_SHORT_HASH_LEN).len(), 15);
        assert_eq!(short_hash(&digest, 500).len(), MAX_SHORT_HASH_LEN);
    }
}
