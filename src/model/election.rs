use std::fmt::{Display, Formatter};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Who may vote in an election.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ElectionKind {
    /// Open to every registered student.
    General,
    /// Restricted to the listed departments.
    Department,
    /// Restricted to the listed programmes.
    Program,
}

impl ElectionKind {
    /// Whether voters are filtered by `allowed_values`.
    pub fn is_restricted(&self) -> bool {
        !matches!(self, Self::General)
    }
}

/// An election as listed by the backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Election {
    pub id: u64,
    pub title: String,
    /// Free text; the backend's own labels ("General", "Departmental", ...)
    /// are not normalised.
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub is_started: bool,
    #[serde(default)]
    pub is_ended: bool,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub total_votes: u64,
    /// Departments or programmes allowed to vote; empty means everyone.
    #[serde(default)]
    pub allowed_values: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_date: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_date: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub banner_image: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transaction_hash: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Election {
    /// Votes are accepted only between start and end.
    pub fn is_active(&self) -> bool {
        self.is_started && !self.is_ended
    }

    pub fn status_text(&self) -> &'static str {
        if self.is_ended {
            "Ended"
        } else if self.is_started {
            "Active"
        } else {
            "Not Started"
        }
    }

    /// Whether a voter from `department` / `program` may take part.
    pub fn admits(&self, department: Option<&str>, program: Option<&str>) -> bool {
        if self.allowed_values.is_empty() {
            return true;
        }
        [department, program]
            .into_iter()
            .flatten()
            .any(|value| self.allowed_values.iter().any(|allowed| allowed == value))
    }
}

impl Display for Election {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "#{} {} [{}] {} ({} vote{})",
            self.id,
            self.title,
            self.kind,
            self.status_text(),
            self.total_votes,
            if self.total_votes != 1 { "s" } else { "" }
        )
    }
}

/// Response of `POST /status/<id>`.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ElectionStatus {
    pub started: bool,
    pub ended: bool,
}

impl ElectionStatus {
    pub fn is_active(&self) -> bool {
        self.started && !self.ended
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Candidate {
    pub id: u64,
    pub name: String,
    pub election_id: u64,
    #[serde(default)]
    pub vote_count: u64,
    #[serde(default)]
    pub position: String,
    #[serde(default)]
    pub department: String,
    #[serde(default)]
    pub year: String,
    #[serde(default)]
    pub manifesto: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wallet_address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub candidate_address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transaction_hash: Option<String>,
}

impl Display for Candidate {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "#{} {}: {} vote{}",
            self.id,
            self.name,
            self.vote_count,
            if self.vote_count != 1 { "s" } else { "" }
        )
    }
}

/// Response of `POST /winner/<id>`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Winner {
    pub winner_name: String,
    pub highest_votes: u64,
}

/// Response of `POST /voters/<id>/<address>`.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VoterInfo {
    pub has_voted: bool,
    #[serde(default)]
    pub voted_candidate_id: Option<u64>,
}

/// Response of `POST /admin/elections`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ElectionCreated {
    #[serde(default)]
    pub message: String,
    pub election: Election,
    #[serde(rename = "txHash")]
    pub tx_hash: String,
}

/// Response of `POST /admin/candidates`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CandidateAdded {
    pub candidate: Candidate,
}

/// Response of `POST /admin/start` and `POST /admin/end`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ElectionUpdate {
    pub message: String,
    #[serde(default)]
    pub election_id: Option<u64>,
    #[serde(rename = "txHash")]
    pub tx_hash: String,
}
