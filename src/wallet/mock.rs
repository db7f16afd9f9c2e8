//! An in-memory wallet that records every request made of it.

use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use univote_protocol::{keccak256, Address, Signature};

use super::{WalletError, WalletSigner, UNAUTHORIZED};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WalletCall {
    AuthorizedAccounts,
    RequestPermission,
    ActiveAddress,
    SignPersonalMessage(Vec<u8>),
}

#[derive(Debug, Default)]
struct State {
    authorized: Vec<Address>,
    /// Account the user approves when prompted; `None` declines.
    grant: Option<Address>,
    decline_signatures: bool,
    empty_signatures: bool,
    permission_error: Option<WalletError>,
    offline: bool,
    calls: Vec<WalletCall>,
}

/// Clones share state, so a test can keep a handle on a wallet it has given away.
#[derive(Debug, Clone, Default)]
pub struct MockWallet {
    state: Arc<Mutex<State>>,
}

impl MockWallet {
    pub const EXAMPLE_ADDRESS: &'static str = "0xABCdef0000000000000000000000000000001234";

    pub fn example_address() -> Address {
        Self::EXAMPLE_ADDRESS.parse().unwrap()
    }

    fn state(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap()
    }

    /// Authorize `address` as if the user had connected it earlier.
    pub fn authorize(&self, address: Address) {
        self.state().authorized.insert(0, address);
    }

    pub fn connect_example(&self) {
        self.authorize(Self::example_address());
    }

    /// Approve the next permission prompt with `address`.
    pub fn grant_on_request(&self, address: Address) {
        self.state().grant = Some(address);
    }

    pub fn decline_signatures(&self) {
        self.state().decline_signatures = true;
    }

    /// Answer signature requests with no bytes at all.
    pub fn return_empty_signatures(&self) {
        self.state().empty_signatures = true;
    }

    /// Fail permission prompts with `err` instead of asking the user.
    pub fn fail_permission_with(&self, err: WalletError) {
        self.state().permission_error = Some(err);
    }

    /// Make every request fail as if the wallet were not installed.
    pub fn go_offline(&self) {
        self.state().offline = true;
    }

    pub fn calls(&self) -> Vec<WalletCall> {
        self.state().calls.clone()
    }

    pub fn sign_requests(&self) -> usize {
        self.state()
            .calls
            .iter()
            .filter(|call| matches!(call, WalletCall::SignPersonalMessage(_)))
            .count()
    }

    /// What this wallet returns when `signer` is asked to sign `message`.
    pub fn expected_signature(signer: &Address, message: &[u8]) -> Signature {
        fake_signature(signer, message)
    }

    fn record(&self, call: WalletCall) -> Result<MutexGuard<'_, State>, WalletError> {
        let mut state = self.state();
        state.calls.push(call);
        if state.offline {
            return Err(WalletError::Unavailable("wallet is offline".to_string()));
        }
        Ok(state)
    }
}

/// Stand-in for a real signature: deterministic, distinct per signer and
/// message, 65 bytes like a recoverable secp256k1 signature.
fn fake_signature(signer: &Address, message: &[u8]) -> Signature {
    let mut preimage = signer.as_bytes().to_vec();
    preimage.extend_from_slice(message);
    let hash = keccak256(&preimage);
    let mut bytes = Vec::with_capacity(65);
    bytes.extend_from_slice(&hash);
    bytes.extend_from_slice(&keccak256(&hash));
    bytes.push(27);
    Signature::new(bytes)
}

#[async_trait]
impl WalletSigner for MockWallet {
    async fn authorized_accounts(&self) -> Result<Vec<Address>, WalletError> {
        let state = self.record(WalletCall::AuthorizedAccounts)?;
        Ok(state.authorized.clone())
    }

    async fn request_permission(&self) -> Result<(), WalletError> {
        let mut state = self.record(WalletCall::RequestPermission)?;
        if let Some(err) = state.permission_error.clone() {
            return Err(err);
        }
        let address = state.grant.ok_or(WalletError::Rejected)?;
        state.authorized.retain(|a| *a != address);
        state.authorized.insert(0, address);
        Ok(())
    }

    async fn active_address(&self) -> Result<Address, WalletError> {
        let state = self.record(WalletCall::ActiveAddress)?;
        state
            .authorized
            .first()
            .copied()
            .ok_or_else(|| WalletError::Unavailable("no authorized accounts".to_string()))
    }

    async fn sign_personal_message(
        &self,
        signer: &Address,
        message: &[u8],
    ) -> Result<Signature, WalletError> {
        let state = self.record(WalletCall::SignPersonalMessage(message.to_vec()))?;
        if !state.authorized.contains(signer) {
            return Err(WalletError::Rpc {
                code: UNAUTHORIZED,
                message: format!("{signer} is not authorized"),
            });
        }
        if state.decline_signatures {
            return Err(WalletError::Rejected);
        }
        if state.empty_signatures {
            return Ok(Signature::new(Vec::new()));
        }
        Ok(fake_signature(signer, message))
    }
}
