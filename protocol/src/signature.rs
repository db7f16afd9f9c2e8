use std::fmt::{Display, Formatter};
use std::str::FromStr;

use serde::{de::Error as _, Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

use crate::hex::{self, HexError};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SignatureError {
    #[error(transparent)]
    Hex(#[from] HexError),
    #[error("signature is empty")]
    Empty,
}

/// A wallet signature. Opaque to the client: it is produced by the wallet and
/// checked by the verifier, so only its presence is checked here.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Signature(Vec<u8>);

impl Signature {
    pub fn new(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromStr for Signature {
    type Err = SignatureError;

    fn from_str(text: &str) -> Result<Self, Self::Err> {
        let bytes = hex::decode(text)?;
        if bytes.is_empty() {
            return Err(SignatureError::Empty);
        }
        Ok(Self(bytes))
    }
}

impl Display for Signature {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&hex::encode(&self.0))
    }
}

impl Serialize for Signature {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for Signature {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        text.parse().map_err(D::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hex_form() {
        let signature: Signature = "0xAB01".parse().unwrap();
        assert_eq!(signature.as_bytes(), &[0xab, 0x01]);
        assert_eq!(signature.to_string(), "0xab01");
        assert_eq!(
            serde_json::to_value(&signature).unwrap(),
            serde_json::json!("0xab01")
        );
        assert!("ab01".parse::<Signature>().is_err());
    }

    #[test]
    fn empty_is_rejected() {
        assert_eq!("0x".parse::<Signature>(), Err(SignatureError::Empty));
        assert!(serde_json::from_str::<Signature>("\"0x\"").is_err());
        assert!(matches!(
            "0x1".parse::<Signature>(),
            Err(SignatureError::Hex(HexError::Invalid(_)))
        ));
    }
}
