use std::fmt::{Display, Formatter};

use serde::{de::Error as _, Deserialize, Deserializer, Serialize, Serializer};
use sha3::{Digest as _, Keccak256};

use crate::{address::ADDRESS_LEN, hex, Address};

/// Length of a tightly packed vote message: two uint256 words and an address.
pub const PACKED_LEN: usize = 32 + 32 + ADDRESS_LEN;

/// Header prepended by the personal-message signing convention.
const PERSONAL_MESSAGE_PREFIX: &[u8] = b"\x19Ethereum Signed Message:\n";

/// Keccak-256 (the pre-standard padding, not SHA3-256).
pub fn keccak256(data: &[u8]) -> [u8; 32] {
    let mut out = [0; 32];
    out.copy_from_slice(&Keccak256::digest(data));
    out
}

/// A uint256 as 32 big-endian bytes.
pub fn uint256(value: u64) -> [u8; 32] {
    let mut word = [0; 32];
    word[24..].copy_from_slice(&value.to_be_bytes());
    word
}

/// Wrap `message` in the length-prefixed "signed message" envelope.
pub fn envelope(message: &[u8]) -> Vec<u8> {
    let length = message.len().to_string();
    let mut out = Vec::with_capacity(PERSONAL_MESSAGE_PREFIX.len() + length.len() + message.len());
    out.extend_from_slice(PERSONAL_MESSAGE_PREFIX);
    out.extend_from_slice(length.as_bytes());
    out.extend_from_slice(message);
    out
}

/// The hash a wallet actually signs when asked to personal-sign `message`.
pub fn personal_message_hash(message: &[u8]) -> Digest {
    Digest(keccak256(&envelope(message)))
}

/// A 32-byte Keccak-256 digest.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct Digest(pub [u8; 32]);

impl Digest {
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

impl Display for Digest {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&hex::encode(&self.0))
    }
}

impl Serialize for Digest {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for Digest {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        let bytes = hex::decode(&text).map_err(D::Error::custom)?;
        let bytes: [u8; 32] = bytes
            .try_into()
            .map_err(|b: Vec<u8>| D::Error::invalid_length(b.len(), &"32 bytes"))?;
        Ok(Self(bytes))
    }
}

/// The vote parameters exactly as the verifier re-derives them.
///
/// Field order and widths are fixed: `uint256 election_id`,
/// `uint256 candidate_id`, then the raw 20-byte voter address, packed with
/// no padding between them.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct VoteMessage {
    pub election_id: u64,
    pub candidate_id: u64,
    pub voter: Address,
}

impl VoteMessage {
    pub fn new(election_id: u64, candidate_id: u64, voter: Address) -> Self {
        Self {
            election_id,
            candidate_id,
            voter,
        }
    }

    /// The tightly packed byte encoding.
    pub fn packed(&self) -> [u8; PACKED_LEN] {
        let mut out = [0; PACKED_LEN];
        out[..32].copy_from_slice(&uint256(self.election_id));
        out[32..64].copy_from_slice(&uint256(self.candidate_id));
        out[64..].copy_from_slice(self.voter.as_bytes());
        out
    }

    /// `keccak256(packed())`; this is what the wallet is asked to sign.
    pub fn digest(&self) -> Digest {
        Digest(keccak256(&self.packed()))
    }

    /// The hash the wallet's signature will actually commit to.
    pub fn signed_hash(&self) -> Digest {
        personal_message_hash(self.digest().as_bytes())
    }
}
