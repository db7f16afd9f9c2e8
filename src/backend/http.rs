use async_trait::async_trait;
use reqwest::{Client, Method, RequestBuilder, StatusCode};
use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;

use super::ElectionBackend;
use crate::{
    config::Config,
    error::{Error, Result},
    logging::{log_failure, log_request, log_response},
    model::{
        Candidate, CandidateAdded, Election, ElectionCreated, ElectionKind, ElectionStatus,
        ElectionUpdate, Registration, SignedVote, SubmissionResult, UserLookup, VoterInfo, Winner,
    },
};

/// The REST API of the election backend.
#[derive(Debug, Clone)]
pub struct HttpBackend {
    client: Client,
    election_api: String,
    user_api: String,
}

/// Body of the read endpoints: the caller's own address, if signed in.
#[derive(Debug, Serialize)]
struct Caller<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    address: Option<&'a str>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct NewElection<'a> {
    title: &'a str,
    #[serde(rename = "type")]
    kind: ElectionKind,
    allowed_values: &'a [String],
    address: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct NewCandidate<'a> {
    election_id: u64,
    name: &'a str,
    address: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ElectionAction<'a> {
    election_id: u64,
    address: &'a str,
}

impl HttpBackend {
    pub fn new(config: &Config) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.request_timeout())
            .build()?;
        Ok(Self {
            client,
            election_api: config.election_api(),
            user_api: config.user_api(),
        })
    }

    async fn post<B, T>(&self, url: String, body: &B) -> Result<T>
    where
        B: Serialize + ?Sized + Sync,
        T: DeserializeOwned,
    {
        let request = self.client.post(&url).json(body);
        self.send(Method::POST, url, request).await
    }

    async fn get<T: DeserializeOwned>(&self, url: String) -> Result<T> {
        let request = self.client.get(&url);
        self.send(Method::GET, url, request).await
    }

    async fn send<T: DeserializeOwned>(
        &self,
        method: Method,
        url: String,
        request: RequestBuilder,
    ) -> Result<T> {
        let id = log_request(method.as_str(), &url);
        let response = match request.send().await {
            Ok(response) => response,
            Err(e) => {
                log_failure(id, &url, &e);
                return Err(e.into());
            }
        };
        let status = response.status();
        log_response(id, status, &url);
        let body = response.text().await?;
        decode(status, &body)
    }

    pub async fn elections(&self, caller: Option<&str>) -> Result<Vec<Election>> {
        let url = format!("{}/all", self.election_api);
        self.post(url, &Caller { address: caller }).await
    }

    pub async fn status(&self, election_id: u64, caller: Option<&str>) -> Result<ElectionStatus> {
        let url = format!("{}/status/{election_id}", self.election_api);
        self.post(url, &Caller { address: caller }).await
    }

    pub async fn candidates(&self, election_id: u64, caller: Option<&str>) -> Result<Vec<Candidate>> {
        let url = format!("{}/candidates/{election_id}", self.election_api);
        self.post(url, &Caller { address: caller }).await
    }

    pub async fn winner(&self, election_id: u64, caller: Option<&str>) -> Result<Winner> {
        let url = format!("{}/winner/{election_id}", self.election_api);
        self.post(url, &Caller { address: caller }).await
    }

    /// Whether `wallet` has already voted in the election.
    pub async fn voter_info(
        &self,
        election_id: u64,
        wallet: &str,
        caller: Option<&str>,
    ) -> Result<VoterInfo> {
        let url = format!("{}/voters/{election_id}/{wallet}", self.election_api);
        self.post(url, &Caller { address: caller }).await
    }

    pub async fn create_election(
        &self,
        title: &str,
        kind: ElectionKind,
        allowed_values: &[String],
        admin: &str,
    ) -> Result<ElectionCreated> {
        let url = format!("{}/admin/elections", self.election_api);
        let body = NewElection {
            title,
            kind,
            allowed_values,
            address: admin,
        };
        self.post(url, &body).await
    }

    pub async fn add_candidate(&self, election_id: u64, name: &str, admin: &str) -> Result<Candidate> {
        let url = format!("{}/admin/candidates", self.election_api);
        let body = NewCandidate {
            election_id,
            name,
            address: admin,
        };
        let added: CandidateAdded = self.post(url, &body).await?;
        Ok(added.candidate)
    }

    pub async fn start_election(&self, election_id: u64, admin: &str) -> Result<ElectionUpdate> {
        let url = format!("{}/admin/start", self.election_api);
        self.post(url, &ElectionAction { election_id, address: admin }).await
    }

    pub async fn end_election(&self, election_id: u64, admin: &str) -> Result<ElectionUpdate> {
        let url = format!("{}/admin/end", self.election_api);
        self.post(url, &ElectionAction { election_id, address: admin }).await
    }

    pub async fn register(&self, wallet: &str, matric_number: &str) -> Result<UserLookup> {
        let url = format!("{}/register", self.user_api);
        let body = Registration {
            wallet_address: wallet,
            matric_number,
        };
        self.post(url, &body).await
    }

    pub async fn user(&self, wallet: &str) -> Result<UserLookup> {
        self.get(format!("{}/{wallet}", self.user_api)).await
    }
}

#[async_trait]
impl ElectionBackend for HttpBackend {
    async fn submit_vote(&self, vote: &SignedVote) -> Result<SubmissionResult> {
        let url = format!("{}/vote", self.election_api);
        self.post(url, vote).await
    }
}

/// Turn a response into either its decoded body or a rejection.
fn decode<T: DeserializeOwned>(status: StatusCode, body: &str) -> Result<T> {
    if !status.is_success() {
        return Err(Error::SubmissionRejected {
            reason: rejection_reason(status, body),
        });
    }
    serde_json::from_str(body).map_err(|e| Error::MalformedResponse(e.to_string()))
}

/// The backend's own explanation of a refusal: an `error` or `message` field
/// of a JSON body, else the body text, else the status line.
fn rejection_reason(status: StatusCode, body: &str) -> String {
    if let Ok(Value::Object(fields)) = serde_json::from_str::<Value>(body) {
        for key in ["error", "message"] {
            if let Some(Value::String(reason)) = fields.get(key) {
                return reason.clone();
            }
        }
    }
    let body = body.trim();
    if body.is_empty() {
        status.to_string()
    } else {
        body.to_string()
    }
}
