use crate::hasher::ContentDigest;

/// An entry in a per-organization snapshot version chain.
pub trait ChainLink {
    /// Version number, starting at 1.
    fn version(&self) -> u64;
    /// The entry's own content hash.
    fn content_hash(&self) -> ContentDigest;
    /// Hash of the previous version (None for version 1).
    fn prev_hash(&self) -> Option<ContentDigest>;
}

/// Version chain verifier.
///
/// Verifies that a version-ordered sequence of snapshots forms a valid chain:
/// versions run 1, 2, 3, ... with no gaps or reuse, and each entry's
/// `prev_hash` matches the previous entry's content hash.
///
/// Content hashes themselves are not recomputed here; that is the job of the
/// integrity verifier, which has access to the stored payloads.
pub struct VersionChainVerifier;

impl VersionChainVerifier {
    /// Verify a chain, stopping at the first broken link.
    pub fn verify_chain(links: &[impl ChainLink]) -> Result<(), ChainError> {
        match Self::violations(links).into_iter().next() {
            Some(first) => Err(first),
            None => Ok(()),
        }
    }

    /// Collect every violation in the chain.
    pub fn violations(links: &[impl ChainLink]) -> Vec<ChainError> {
        let mut found = Vec::new();
        let mut previous: Option<ContentDigest> = None;

        for (index, link) in links.iter().enumerate() {
            let expected_version = (index as u64) + 1;
            if link.version() != expected_version {
                found.push(ChainError::VersionGap {
                    expected: expected_version,
                    found: link.version(),
                });
            }

            match (previous, link.prev_hash()) {
                (None, None) => {}
                (None, Some(_)) => found.push(ChainError::GenesisHasPrevHash {
                    version: link.version(),
                }),
                (Some(_), None) => found.push(ChainError::MissingPrevHash {
                    version: link.version(),
                }),
                (Some(prev), Some(hash)) if hash != prev => {
                    found.push(ChainError::BrokenLink {
                        version: link.version(),
                    })
                }
                (Some(_), Some(_)) => {}
            }

            previous = Some(link.content_hash());
        }

        found
    }
}

/// Errors from chain verification.
#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
pub enum ChainError {
    #[error("version gap: expected version {expected}, found {found}")]
    VersionGap { expected: u64, found: u64 },

    #[error("version {version} is the first entry but carries a previous hash")]
    GenesisHasPrevHash { version: u64 },

    #[error("version {version} is missing its previous hash")]
    MissingPrevHash { version: u64 },

    #[error("version {version} does not link to the previous version's hash")]
    BrokenLink { version: u64 },
}
