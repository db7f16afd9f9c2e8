//! API-compatible types.
//!
//! The types in this module are serialised the way the election backend
//! expects them, e.g.:
//!
//! - Field names are camelCase.
//! - Byte strings (signatures, hashes) are `0x`-prefixed hex.
//! - Datetimes are RFC 3339 strings.

pub mod election;
pub mod user;
pub mod vote;

pub use election::{
    Candidate, CandidateAdded, Election, ElectionCreated, ElectionKind, ElectionStatus,
    ElectionUpdate, VoterInfo, Winner,
};
pub use user::{Registration, User, UserLookup};
pub use vote::{SignedVote, SubmissionResult, VoteIntent};
