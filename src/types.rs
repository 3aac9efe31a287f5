//! Core types shared by the snapshot, index, script and pipeline layers.

/// NodeId: arena index of a snapshot node, assigned in build order
pub type NodeId = usize;

/// Inode: filesystem identity of a node, populated by the stat pass
pub type Inode = u64;

/// Digest: full 256-bit content hash of a file
pub type Digest = [u8; 32];

/// DirChain: destination or source path split into raw name segments
pub type DirChain = Vec<Vec<u8>>;

/// Join a chain into a single `/`-separated byte path.
pub fn join_chain(chain: &[Vec<u8>]) -> Vec<u8> {
    let mut out = Vec::new();
    for (i, segment) in chain.iter().enumerate() {
        if i > 0 {
            out.push(b'/');
        }
        out.extend_from_slice(segment);
    }
    out
}

/// Lossy display form of a chain, for logs and diagnostics.
pub fn display_chain(chain: &[Vec<u8>]) -> String {
    String::from_utf8_lossy(&join_chain(chain)).into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_join_chain() {
        let chain: DirChain = vec![b"a".to_vec(), b"b c".to_vec(), b"d.txt".to_vec()];
        assert_eq!(join_chain(&chain), b"a/b c/d.txt".to_vec());
        assert!(join_chain(&[]).is_empty());
        assert_eq!(display_chain(&chain), "a/b c/d.txt");
    }
}
