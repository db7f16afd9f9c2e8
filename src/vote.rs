//! Casting a vote: build the canonical message, have the wallet sign it, and
//! hand the signed vote to the backend.

use std::fmt::{Display, Formatter};
use std::sync::atomic::{AtomicBool, Ordering};

use crate::{
    backend::ElectionBackend,
    error::{Error, Result},
    model::{Election, SignedVote, SubmissionResult, User, VoteIntent, VoterInfo},
    wallet::{WalletError, WalletSigner},
};

/// Signs and submits votes on behalf of one client.
///
/// The wallet is optional so that a client without one can still be built;
/// voting then fails with [`Error::WalletUnavailable`].
#[derive(Debug)]
pub struct VoteSigningProtocol<W, B> {
    wallet: Option<W>,
    backend: B,
    in_flight: AtomicBool,
}

/// Holds the in-flight flag for one attempt and clears it when dropped,
/// whatever the outcome.
#[derive(Debug)]
pub struct InFlight<'a>(&'a AtomicBool);

impl<'a> InFlight<'a> {
    fn acquire(flag: &'a AtomicBool) -> Result<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .map(|_| Self(flag))
            .map_err(|_| Error::VoteInFlight)
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

impl<W: WalletSigner, B: ElectionBackend> VoteSigningProtocol<W, B> {
    pub fn new(wallet: Option<W>, backend: B) -> Self {
        Self {
            wallet,
            backend,
            in_flight: AtomicBool::new(false),
        }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Whether an attempt is currently running; the vote action should be
    /// disabled while it is.
    pub fn is_in_flight(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }

    /// Mark an attempt as started, failing if one already is.
    pub fn begin(&self) -> Result<InFlight<'_>> {
        InFlight::acquire(&self.in_flight)
    }

    /// Cast `intent`.
    ///
    /// The steps run strictly in order: authorize, resolve and compare the
    /// active address, sign, submit. Any failure ends the attempt; nothing is
    /// retried.
    pub async fn prepare_and_submit_vote(&self, intent: &VoteIntent) -> Result<SubmissionResult> {
        let _in_flight = self.begin()?;

        let message = intent.message()?;
        let wallet = self
            .wallet
            .as_ref()
            .ok_or_else(|| Error::WalletUnavailable("no wallet configured".to_string()))?;
        info!(
            "Casting vote in election {} for candidate {}",
            intent.election_id, intent.candidate_id
        );

        // Authorize.
        let accounts = wallet.authorized_accounts().await.map_err(unavailable)?;
        if accounts.is_empty() {
            debug!("No authorized accounts, requesting permission");
            wallet.request_permission().await.map_err(|e| {
                warn!("Wallet permission request failed: {e}");
                match e {
                    WalletError::Rejected => Error::WalletPermissionDenied,
                    other => unavailable(other),
                }
            })?;
        }

        // The signer must be the voter.
        let active = wallet.active_address().await.map_err(|e| match e {
            WalletError::Rejected => Error::WalletPermissionDenied,
            other => unavailable(other),
        })?;
        if active != message.voter {
            warn!(
                "Refusing to sign: active wallet {active} is not voter {}",
                intent.voter_address
            );
            return Err(Error::AddressMismatch {
                active,
                intended: intent.voter_address.clone(),
            });
        }

        // Sign.
        let digest = message.digest();
        debug!("Vote digest {digest}, signed hash {}", message.signed_hash());
        let signature = wallet
            .sign_personal_message(&active, digest.as_bytes())
            .await
            .map_err(|e| match e {
                WalletError::Rejected => Error::SignatureDenied,
                other => unavailable(other),
            })?;
        if signature.is_empty() {
            warn!("Wallet returned an empty signature");
            return Err(unavailable(WalletError::Malformed(
                "empty signature".to_string(),
            )));
        }
        debug!("Wallet returned signature {signature}");

        // Submit.
        let vote = SignedVote::new(intent, signature);
        let result = self.backend.submit_vote(&vote).await.map_err(|e| {
            warn!("Vote submission failed: {e}");
            e
        })?;
        info!("Vote recorded in transaction {}", result.tx_hash);
        Ok(result)
    }
}

fn unavailable(err: WalletError) -> Error {
    Error::WalletUnavailable(err.to_string())
}

/// Why the vote action is disabled for a user.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum VoteBlocker {
    NotSignedIn,
    ElectionNotActive,
    AlreadyVoted,
    NotEligible,
}

impl Display for VoteBlocker {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::NotSignedIn => "Please connect your wallet to vote in this election",
            Self::ElectionNotActive => "This election is not accepting votes",
            Self::AlreadyVoted => {
                "You have already voted in this election. Each wallet can only vote once."
            }
            Self::NotEligible => "You are not eligible to vote in this election",
        })
    }
}

/// The client-side guard on the vote action. Best effort only: the backend
/// and contract are what actually refuse a second vote.
pub fn vote_blocker(
    election: &Election,
    voter: Option<&VoterInfo>,
    user: Option<&User>,
) -> Option<VoteBlocker> {
    let Some(user) = user else {
        return Some(VoteBlocker::NotSignedIn);
    };
    if !election.is_active() {
        Some(VoteBlocker::ElectionNotActive)
    } else if voter.map_or(false, |info| info.has_voted) {
        Some(VoteBlocker::AlreadyVoted)
    } else if !election.admits(user.department.as_deref(), user.program.as_deref()) {
        Some(VoteBlocker::NotEligible)
    } else {
        None
    }
}
