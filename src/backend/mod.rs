//! The election backend: records votes and serves election state.

use async_trait::async_trait;

use crate::{
    error::Result,
    model::{SignedVote, SubmissionResult},
};

pub mod http;
#[cfg(test)]
pub mod mock;

pub use http::HttpBackend;

/// Where signed votes are sent for verification and recording.
///
/// Implementations report a refusal as `Error::SubmissionRejected` with the
/// backend's own reason, and a failure to reach the backend as
/// `Error::NetworkError`.
#[async_trait]
pub trait ElectionBackend: Send + Sync {
    async fn submit_vote(&self, vote: &SignedVote) -> Result<SubmissionResult>;
}
