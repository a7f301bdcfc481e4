use evidence_smt::{ErrorKind, Key};

use crate::Identity;

/// Alias for `core::result::Result<T, Error>`.
pub type Result<T> = core::result::Result<T, Error>;

/// Errors from the key-value store and the registry.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// Mutation by an identity other than the authorized one.
    #[error("caller {0} is not the authorized mutator")]
    NotAuthorized(Identity),
    /// Second initialization.
    #[error("already initialized")]
    AlreadyInitialized,
    /// Use before initialization.
    #[error("not initialized")]
    NotInitialized,
    /// Statement key or value not below the field modulus.
    #[error("number {} is not in the prime field", hex::encode(.0))]
    NotInPrimeField(Key),
    /// The caller already holds a statement under this key.
    #[error("key {} already exists", hex::encode(.0))]
    KeyAlreadyExists(Key),
    /// The caller holds no statement under this key.
    #[error("key {} does not exist", hex::encode(.0))]
    KeyDoesNotExist(Key),
    /// Failure of the underlying tree.
    #[error(transparent)]
    Tree(#[from] evidence_smt::Error),
}

impl Error {
    /// The failure class this error belongs to.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::NotAuthorized(_) => ErrorKind::Authorization,
            Error::AlreadyInitialized | Error::NotInitialized => ErrorKind::Initialization,
            Error::NotInPrimeField(_) => ErrorKind::Range,
            Error::KeyAlreadyExists(_) => ErrorKind::Duplicate,
            Error::KeyDoesNotExist(_) => ErrorKind::NotFound,
            Error::Tree(e) => e.kind(),
        }
    }
}
