use crate::FIELD_MODULUS;

/// Parameters of a registry deployment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RegistryConfig {
    /// Maximum depth of the backing tree.
    pub max_depth: u32,
    /// Exclusive upper bound for statement keys and values, big-endian.
    pub field_modulus: [u8; 32],
}

impl Default for RegistryConfig {
    fn default() -> Self {
        RegistryConfig {
            max_depth: 80,
            field_modulus: FIELD_MODULUS,
        }
    }
}
