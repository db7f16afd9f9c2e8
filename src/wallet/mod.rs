//! The wallet capability: the only component that holds key material.

use async_trait::async_trait;
use thiserror::Error;
use univote_protocol::{Address, Signature};

#[cfg(test)]
pub mod mock;
pub mod rpc;

pub use rpc::RpcWallet;

/// EIP-1193 error code for a request the user declined.
pub const USER_REJECTED: i64 = 4001;

/// EIP-1193 error code for an account the client is not authorized to use.
pub const UNAUTHORIZED: i64 = 4100;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WalletError {
    #[error("request rejected by the user")]
    Rejected,
    #[error("wallet unavailable: {0}")]
    Unavailable(String),
    #[error("wallet error {code}: {message}")]
    Rpc { code: i64, message: String },
    #[error("malformed wallet response: {0}")]
    Malformed(String),
}

/// An external signer that can report its accounts and sign on request
/// without ever exposing the private key.
#[async_trait]
pub trait WalletSigner: Send + Sync {
    /// Accounts this client is already allowed to see. Never prompts.
    async fn authorized_accounts(&self) -> Result<Vec<Address>, WalletError>;

    /// Ask the user to authorize this client. May prompt.
    async fn request_permission(&self) -> Result<(), WalletError>;

    /// The account that will sign.
    async fn active_address(&self) -> Result<Address, WalletError>;

    /// Sign `message` as `signer` under the personal-message convention; the
    /// wallet applies the signed-message envelope itself.
    async fn sign_personal_message(
        &self,
        signer: &Address,
        message: &[u8],
    ) -> Result<Signature, WalletError>;
}

/// Connect to the wallet for sign-in and return the chosen account.
///
/// When accounts are already authorized, permission is requested again so the
/// user can switch to a different account.
pub async fn connect<W: WalletSigner + ?Sized>(wallet: &W) -> Result<Address, WalletError> {
    let accounts = wallet.authorized_accounts().await?;
    debug!("Wallet reports {} authorized account(s)", accounts.len());
    wallet.request_permission().await?;
    let address = wallet.active_address().await?;
    info!("Connected wallet {address}");
    Ok(address)
}
