use serde::{Deserialize, Serialize};
use univote_protocol::{Address, Signature, VoteMessage};

use crate::error::{Error, Result};

/// A user's choice, before anything has been signed. Never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VoteIntent {
    pub election_id: u64,
    pub candidate_id: u64,
    /// The address the voter registered with, exactly as stored.
    pub voter_address: String,
}

impl VoteIntent {
    pub fn new(election_id: u64, candidate_id: u64, voter_address: impl Into<String>) -> Self {
        Self {
            election_id,
            candidate_id,
            voter_address: voter_address.into(),
        }
    }

    /// Check the preconditions of a vote, returning the parsed voter address.
    pub fn validate(&self) -> Result<Address> {
        if self.election_id == 0 {
            return Err(Error::BadRequest("election ID must be positive".to_string()));
        }
        if self.candidate_id == 0 {
            return Err(Error::BadRequest("candidate ID must be positive".to_string()));
        }
        self.voter_address.parse().map_err(|e| {
            Error::BadRequest(format!("invalid voter address {:?}: {e}", self.voter_address))
        })
    }

    /// The canonical message for this intent.
    pub fn message(&self) -> Result<VoteMessage> {
        let voter = self.validate()?;
        Ok(VoteMessage::new(self.election_id, self.candidate_id, voter))
    }
}

/// The body of `POST /vote`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignedVote {
    pub election_id: u64,
    pub candidate_id: u64,
    pub address: String,
    pub signature: Signature,
}

impl SignedVote {
    pub fn new(intent: &VoteIntent, signature: Signature) -> Self {
        Self {
            election_id: intent.election_id,
            candidate_id: intent.candidate_id,
            address: intent.voter_address.clone(),
            signature,
        }
    }
}

/// The backend's acknowledgement of an accepted vote.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmissionResult {
    pub message: String,
    #[serde(rename = "txHash")]
    pub tx_hash: String,
}
