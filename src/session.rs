//! Who is signed in. Passed explicitly to whatever needs the caller's address.

use univote_protocol::Address;

use crate::{
    backend::HttpBackend,
    error::{Error, Result},
    model::{User, UserLookup},
    wallet::{self, WalletError, WalletSigner},
};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Session {
    user: Option<User>,
}

impl Session {
    pub fn signed_in(user: User) -> Self {
        Self { user: Some(user) }
    }

    /// A session from the backend's answer about `wallet`.
    pub fn from_lookup(wallet: &Address, lookup: UserLookup) -> Result<Self> {
        lookup
            .into_user()
            .map(Self::signed_in)
            .ok_or_else(|| Error::NotRegistered(wallet.to_string()))
    }

    pub fn user(&self) -> Option<&User> {
        self.user.as_ref()
    }

    /// The signed-in user's registered wallet address.
    pub fn address(&self) -> Option<&str> {
        self.user.as_ref().map(|user| user.wallet_address.as_str())
    }

    pub fn is_admin(&self) -> bool {
        self.user.as_ref().map_or(false, |user| user.is_admin)
    }

    pub fn sign_out(&mut self) {
        if let Some(user) = self.user.take() {
            info!("Signed out {}", user.matric_number);
        }
    }

    /// Connect the wallet and sign in as the user registered for it.
    pub async fn sign_in<W: WalletSigner + ?Sized>(wallet: &W, backend: &HttpBackend) -> Result<Self> {
        let address = connect(wallet).await?;
        let lookup = backend.user(&address.to_string()).await?;
        let session = Self::from_lookup(&address, lookup)?;
        info!("Signed in as {address}");
        Ok(session)
    }

    /// Connect the wallet and register it under `matric_number`.
    pub async fn register<W: WalletSigner + ?Sized>(
        wallet: &W,
        backend: &HttpBackend,
        matric_number: &str,
    ) -> Result<Self> {
        let matric_number = matric_number.trim();
        if matric_number.is_empty() {
            return Err(Error::BadRequest("Please enter a matric number".to_string()));
        }
        let address = connect(wallet).await?;
        let lookup = backend.register(&address.to_string(), matric_number).await?;
        let session = Self::from_lookup(&address, lookup)?;
        info!("Registered {matric_number} with wallet {address}");
        Ok(session)
    }
}

/// The wallet connection step of sign-in, with wallet errors classified.
async fn connect<W: WalletSigner + ?Sized>(wallet: &W) -> Result<Address> {
    wallet::connect(wallet).await.map_err(|e| match e {
        WalletError::Rejected => Error::WalletPermissionDenied,
        other => Error::WalletUnavailable(other.to_string()),
    })
}
