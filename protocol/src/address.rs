use std::fmt::{Display, Formatter};
use std::str::FromStr;

use data_encoding::{HEXLOWER, HEXLOWER_PERMISSIVE};
use serde::{de::Error as _, Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

use crate::{hex::strip_prefix, message::keccak256};

/// Number of bytes in an account identifier.
pub const ADDRESS_LEN: usize = 20;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AddressError {
    #[error("address must start with `0x`")]
    MissingPrefix,
    #[error("address must have 40 hex digits, found {0}")]
    Length(usize),
    #[error("address contains non-hex characters")]
    Hex,
}

/// An account identifier.
///
/// Two addresses are equal iff their bytes are equal, which makes comparing
/// parsed addresses insensitive to the letter case of their textual form.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Address([u8; ADDRESS_LEN]);

impl Address {
    pub fn as_bytes(&self) -> &[u8; ADDRESS_LEN] {
        &self.0
    }

    /// Lowercase `0x`-prefixed hex.
    pub fn to_lower_hex(&self) -> String {
        format!("0x{}", HEXLOWER.encode(&self.0))
    }

    /// The EIP-55 mixed-case checksum encoding: a hex letter is uppercased
    /// when the matching nibble of `keccak256(lowercase hex)` is 8 or more.
    pub fn to_checksum(&self) -> String {
        let lower = HEXLOWER.encode(&self.0);
        let hash = keccak256(lower.as_bytes());
        let mut out = String::with_capacity(2 + lower.len());
        out.push_str("0x");
        for (i, c) in lower.chars().enumerate() {
            let byte = hash[i / 2];
            let nibble = if i % 2 == 0 { byte >> 4 } else { byte & 0x0f };
            if c.is_ascii_alphabetic() && nibble >= 8 {
                out.push(c.to_ascii_uppercase());
            } else {
                out.push(c);
            }
        }
        out
    }
}

impl FromStr for Address {
    type Err = AddressError;

    fn from_str(text: &str) -> Result<Self, Self::Err> {
        let digits = strip_prefix(text).ok_or(AddressError::MissingPrefix)?;
        if digits.len() != ADDRESS_LEN * 2 {
            return Err(AddressError::Length(digits.len()));
        }
        let decoded = HEXLOWER_PERMISSIVE
            .decode(digits.as_bytes())
            .map_err(|_| AddressError::Hex)?;
        let mut bytes = [0; ADDRESS_LEN];
        bytes.copy_from_slice(&decoded);
        Ok(Self(bytes))
    }
}

impl Display for Address {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_checksum())
    }
}

impl Serialize for Address {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_checksum())
    }
}

impl<'de> Deserialize<'de> for Address {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        text.parse().map_err(D::Error::custom)
    }
}
