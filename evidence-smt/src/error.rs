use crate::{Key, NodeIndex};

/// Alias for `core::result::Result<T, Error>`.
pub type Result<T> = core::result::Result<T, Error>;

/// Broad classes of failure, shared by every layer built on the tree.
///
/// Callers that only care about what went wrong, and not about the exact
/// variant, branch on this instead of matching error enums.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Double initialization, zero initial depth, use before initialization.
    Initialization,
    /// Depth not increasing, depth above the hard cap, hasher swap on a
    /// non-empty tree.
    Configuration,
    /// Mutation attempted by a caller that is not the authorized mutator.
    Authorization,
    /// Insertion of a key that is already present.
    Duplicate,
    /// The key or node looked up does not exist.
    NotFound,
    /// The search path ended on a leaf holding a different key.
    Mismatch,
    /// Insertion would exceed the maximum depth.
    Capacity,
    /// A key or value lies outside the accepted numeric range.
    Range,
    /// A proof failed to verify or could not be decoded.
    InvalidProof,
    /// The hash primitive itself failed.
    Hash,
}

/// Errors from sparse Merkle tree operations.
///
/// A failed mutation never leaves a partial effect behind: the node table,
/// key index, node count and root are exactly what they were before the
/// call.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// `initialize` called on a tree that already has a depth.
    #[error("tree is already initialized")]
    AlreadyInitialized,
    /// Mutation of a tree that was never initialized.
    #[error("tree is not initialized")]
    NotInitialized,
    /// A max depth of zero was requested.
    #[error("max depth must be greater than zero")]
    InvalidDepth,
    /// The max depth may only grow.
    #[error("new max depth {requested} must be larger than current max depth {current}")]
    DepthNotIncreasing {
        /// Depth in force.
        current: u32,
        /// Depth asked for.
        requested: u32,
    },
    /// Requested depth above [`MAX_DEPTH_HARD_CAP`](crate::MAX_DEPTH_HARD_CAP).
    #[error("max depth {0} exceeds the hard cap")]
    DepthExceedsCap(u32),
    /// Hash function swap on a tree holding nodes.
    #[error("hash function can only be changed on an empty tree")]
    TreeNotEmpty,
    /// Insertion of a key that is already present.
    #[error("key {} already exists", hex::encode(.0))]
    KeyAlreadyExists(Key),
    /// Telling the new key apart would need a leaf below the max depth.
    #[error("max depth reached")]
    MaxDepthReached,
    /// The search path ended on an empty subtree.
    #[error("node {0} does not exist")]
    NodeDoesNotExist(NodeIndex),
    /// The search path ended on a leaf holding another key.
    #[error(
        "leaf does not match: found key {}, requested key {}",
        hex::encode(.existing),
        hex::encode(.requested)
    )]
    LeafDoesNotMatch {
        /// Key of the leaf found on the path.
        existing: Key,
        /// Key that was looked up.
        requested: Key,
    },
    /// A proof failed verification or decoding.
    #[error("invalid proof: {0}")]
    InvalidProof(String),
    /// The hash primitive failed.
    #[error("hash function error: {0}")]
    HashFunction(String),
}

impl Error {
    /// The failure class this error belongs to.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::AlreadyInitialized | Error::NotInitialized | Error::InvalidDepth => {
                ErrorKind::Initialization
            }
            Error::DepthNotIncreasing { .. } | Error::DepthExceedsCap(_) | Error::TreeNotEmpty => {
                ErrorKind::Configuration
            }
            Error::KeyAlreadyExists(_) => ErrorKind::Duplicate,
            Error::MaxDepthReached => ErrorKind::Capacity,
            Error::NodeDoesNotExist(_) => ErrorKind::NotFound,
            Error::LeafDoesNotMatch { .. } => ErrorKind::Mismatch,
            Error::InvalidProof(_) => ErrorKind::InvalidProof,
            Error::HashFunction(_) => ErrorKind::Hash,
        }
    }
}
