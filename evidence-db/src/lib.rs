//! Evidence storage on top of a canonical sparse Merkle tree.
//!
//! [`KeyValueStore`] wraps one tree and lets a single authorized identity
//! mutate it. [`IdentityRegistry`] is that identity: it namespaces every
//! caller's keys with a keyed hash, keeps keys and values inside the BN254
//! scalar field so proofs can be fed to circuits, and remembers when each
//! root became current.

#![warn(missing_docs)]

mod clock;
mod config;
mod db;
mod error;
mod field;
mod identity;
mod registry;

pub use clock::{Clock, ManualClock, SystemClock};
pub use config::RegistryConfig;
pub use db::KeyValueStore;
pub use error::{Error, Result};
pub use evidence_smt::ErrorKind;
pub use field::{FIELD_MODULUS, in_field};
pub use identity::Identity;
pub use registry::{ISOLATION_DOMAIN, IdentityRegistry, isolated_key};
