//! An in-memory backend that records every submission.

use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;

use super::ElectionBackend;
use crate::{
    error::{Error, Result},
    model::{SignedVote, SubmissionResult},
};

#[derive(Debug, Default)]
struct State {
    submissions: Vec<SignedVote>,
    rejection: Option<String>,
    offline: bool,
}

/// Clones share state.
#[derive(Debug, Clone, Default)]
pub struct MockBackend {
    state: Arc<Mutex<State>>,
}

impl MockBackend {
    fn state(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap()
    }

    /// Refuse every vote with `reason`.
    pub fn reject_with(&self, reason: impl Into<String>) {
        self.state().rejection = Some(reason.into());
    }

    pub fn go_offline(&self) {
        self.state().offline = true;
    }

    pub fn submissions(&self) -> Vec<SignedVote> {
        self.state().submissions.clone()
    }
}

#[async_trait]
impl ElectionBackend for MockBackend {
    async fn submit_vote(&self, vote: &SignedVote) -> Result<SubmissionResult> {
        let mut state = self.state();
        if state.offline {
            return Err(Error::NetworkError("connection refused".to_string()));
        }
        state.submissions.push(vote.clone());
        match &state.rejection {
            Some(reason) => Err(Error::SubmissionRejected {
                reason: reason.clone(),
            }),
            None => Ok(SubmissionResult::example()),
        }
    }
}
