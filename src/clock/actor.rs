use crate::error::SyncdbError;
use serde::{Deserialize, Serialize};

/// Identity of an editing actor, compared byte-wise when breaking ticket ties.
///
/// Rendered as 32 lowercase hex characters; the all-zero actor is reserved for
/// the initial ticket sentinel.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
pub struct ActorId([u8; 16]);

impl ActorId {
    pub fn nil() -> ActorId {
        ActorId([0u8; 16])
    }

    pub fn from_bytes(bytes: [u8; 16]) -> ActorId {
        ActorId(bytes)
    }

    pub fn from_hex(hex: &str) -> Result<ActorId, SyncdbError> {
        if !hex.is_ascii() || hex.len() != 32 {
            return Err(SyncdbError::Validation(format!(
                "actor id must be 32 hex characters, got '{hex}'"
            )));
        }
        let mut bytes = [0u8; 16];
        for (i, out) in bytes.iter_mut().enumerate() {
            *out = u8::from_str_radix(&hex[i * 2..i * 2 + 2], 16)
                .map_err(|_| SyncdbError::Validation(format!("invalid actor id: {hex}")))?;
        }
        Ok(ActorId(bytes))
    }

    pub fn as_bytes(&self) -> &[u8; 16] {
        &self.0
    }
}

impl std::fmt::Display for ActorId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for byte in &self.0 {
            write!(f, "{byte:02x}")?;
        }
        Ok(())
    }
}
