use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A registered student.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub matric_number: String,
    pub wallet_address: String,
    #[serde(default)]
    pub is_admin: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub department: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub program: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

/// Body of `POST /api/user/register`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Registration<'a> {
    pub wallet_address: &'a str,
    pub matric_number: &'a str,
}

/// Response of `GET /api/user/<address>` and `POST /api/user/register`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserLookup {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub user: Option<User>,
}

impl UserLookup {
    /// The user, if the backend knows them.
    pub fn into_user(self) -> Option<User> {
        // Registration answers carry only `user`; lookups also set `success`.
        self.user
    }
}
