use std::fmt;
use std::str::FromStr;

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::TypeError;

const DIGEST_LEN: usize = 32;

/// Address of a stored component.
///
/// Only a [`ContentHasher`](crate::ContentHasher) produces new hashes, so
/// every hash in circulation is domain-separated by component kind. Outside
/// this crate a hash is obtained by hashing a component or by parsing the
/// 64-character hex form that every backend persists.
///
/// Serializes as lowercase hex, the same text used for file names, document
/// ids and child references in canonical forms.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ComponentHash([u8; DIGEST_LEN]);

impl ComponentHash {
    pub(crate) const fn from_digest(digest: [u8; DIGEST_LEN]) -> Self {
        Self(digest)
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// First 8 hex characters, for log lines and error messages.
    pub fn short_hex(&self) -> String {
        hex::encode(&self.0[..4])
    }

    /// Split the hex form into a 2-character fan-out directory and the
    /// 62-character remainder.
    pub fn fan_out(&self) -> (String, String) {
        let mut hex = self.to_hex();
        let rest = hex.split_off(2);
        (hex, rest)
    }

    pub fn from_hex(s: &str) -> Result<Self, TypeError> {
        let bytes = hex::decode(s).map_err(|e| TypeError::InvalidHex(e.to_string()))?;
        let digest: [u8; DIGEST_LEN] =
            bytes
                .as_slice()
                .try_into()
                .map_err(|_| TypeError::InvalidLength {
                    expected: DIGEST_LEN,
                    actual: bytes.len(),
                })?;
        Ok(Self(digest))
    }
}

impl fmt::Debug for ComponentHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ComponentHash({})", self.short_hex())
    }
}

impl fmt::Display for ComponentHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl FromStr for ComponentHash {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_hex(s)
    }
}

impl Serialize for ComponentHash {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for ComponentHash {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let hex = String::deserialize(deserializer)?;
        Self::from_hex(&hex).map_err(D::Error::custom)
    }
}
