use thiserror::Error;
use univote_protocol::Address;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("No wallet available: {0}")]
    WalletUnavailable(String),
    #[error("Wallet connection request was not approved")]
    WalletPermissionDenied,
    /// The connected account is not the one the vote would be cast for.
    /// Never bypassed.
    #[error("Connected wallet {active} does not match the voter address {intended}")]
    AddressMismatch { active: Address, intended: String },
    #[error("Signature request was not approved")]
    SignatureDenied,
    /// The backend answered with a non-success status. `reason` is passed on
    /// exactly as the backend phrased it.
    #[error("Rejected by the election backend: {reason}")]
    SubmissionRejected { reason: String },
    #[error("Network error: {0}")]
    NetworkError(String),
    #[error("Malformed response from the election backend: {0}")]
    MalformedResponse(String),
    #[error("A vote is already being submitted")]
    VoteInFlight,
    #[error("No user is registered for wallet {0}")]
    NotRegistered(String),
    #[error("Bad request: {0}")]
    BadRequest(String),
    #[error("Unauthorized: {0}")]
    Unauthorized(String),
    #[error(transparent)]
    Config(#[from] figment::Error),
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            Self::MalformedResponse(err.to_string())
        } else {
            Self::NetworkError(err.to_string())
        }
    }
}
