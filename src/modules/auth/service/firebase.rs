use super::identity::{Identity, IdentityError, IdentityProvider};
use async_trait::async_trait;
use reqwest::StatusCode;
use serde::Deserialize;
use serde_json::json;

pub const DEFAULT_LOOKUP_ENDPOINT: &str =
    "https://identitytoolkit.googleapis.com/v1/accounts:lookup";

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct LookupUser {
    local_id: String,
    email: Option<String>,
    display_name: Option<String>,
    photo_url: Option<String>,
    #[serde(default)]
    email_verified: bool,
}

#[derive(Deserialize)]
struct LookupResponse {
    #[serde(default)]
    users: Vec<LookupUser>,
}

#[derive(Deserialize)]
struct LookupErrorBody {
    message: String,
}

#[derive(Deserialize)]
struct LookupErrorResponse {
    error: LookupErrorBody,
}

/// Checks ID tokens against the identity toolkit `accounts:lookup` endpoint,
/// which only answers with a user for a valid, unexpired token.
pub struct FirebaseIdentityProvider {
    client: reqwest::Client,
    endpoint: String,
    api_key: String,
}

impl FirebaseIdentityProvider {
    pub fn new(endpoint: String, api_key: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint,
            api_key,
        }
    }
}

fn identity_from_lookup(status: StatusCode, body: &str) -> Result<Identity, IdentityError> {
    if !status.is_success() {
        let reason = serde_json::from_str::<LookupErrorResponse>(body)
            .map(|response| response.error.message)
            .unwrap_or_else(|_| status.to_string());

        // Only a 400 speaks about the token; anything else is the provider or our key.
        return Err(match status {
            StatusCode::BAD_REQUEST => IdentityError::Rejected(reason),
            _ => IdentityError::Unavailable(format!("lookup answered {status}: {reason}")),
        });
    }

    let response = serde_json::from_str::<LookupResponse>(body)
        .map_err(|err| IdentityError::Unavailable(format!("malformed lookup response: {err}")))?;

    response
        .users
        .into_iter()
        .next()
        .map(|user| Identity {
            id: user.local_id,
            email: user.email,
            display_name: user.display_name,
            photo_url: user.photo_url,
            email_verified: user.email_verified,
        })
        .ok_or_else(|| IdentityError::Rejected(String::from("USER_NOT_FOUND")))
}

#[async_trait]
impl IdentityProvider for FirebaseIdentityProvider {
    async fn verify(&self, token: &str) -> Result<Identity, IdentityError> {
        let response = self
            .client
            .post(&self.endpoint)
            .query(&[("key", self.api_key.as_str())])
            .json(&json!({ "idToken": token }))
            .send()
            .await
            .map_err(|err| IdentityError::Unavailable(err.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|err| IdentityError::Unavailable(err.to_string()))?;

        identity_from_lookup(status, &body)
    }
}
