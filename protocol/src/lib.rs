//! The canonical encoding of a UniVote ballot.
//!
//! Everything in this crate must be reproduced bit-for-bit by whoever verifies
//! a vote signature (the backend and the election contract), so nothing here
//! performs I/O or depends on configuration.

pub mod address;
pub mod hex;
pub mod message;
pub mod signature;

pub use address::{Address, AddressError};
pub use message::{
    envelope, keccak256, personal_message_hash, uint256, Digest, VoteMessage, PACKED_LEN,
};
pub use signature::{Signature, SignatureError};
