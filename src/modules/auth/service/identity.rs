use crate::utils::error::Error;
use async_trait::async_trait;
use axum::http::HeaderMap;
use axum_extra::headers::{authorization::Bearer, Authorization, HeaderMapExt};
use serde::Serialize;
use std::sync::Arc;

pub const USER_ID_HEADER: &str = "x-user-id";

#[derive(Serialize, Clone, Debug, PartialEq)]
pub struct Identity {
    pub id: String,
    pub email: Option<String>,
    pub display_name: Option<String>,
    pub photo_url: Option<String>,
    pub email_verified: bool,
}

impl Identity {
    pub fn from_id(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            email: None,
            display_name: None,
            photo_url: None,
            email_verified: false,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum IdentityError {
    #[error("credential rejected: {0}")]
    Rejected(String),
    #[error("identity provider unavailable: {0}")]
    Unavailable(String),
}

/// Turns a bearer credential into the user it was issued to.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    async fn verify(&self, token: &str) -> Result<Identity, IdentityError>;
}

#[derive(Clone)]
pub enum IdentityStrategy {
    /// Bearer token checked by the identity provider.
    Verified(Arc<dyn IdentityProvider>),
    /// Trusts the `x-user-id` header. Development only.
    Asserted,
}

pub async fn resolve(strategy: &IdentityStrategy, headers: &HeaderMap) -> Result<Identity, Error> {
    match strategy {
        IdentityStrategy::Verified(provider) => {
            let Authorization(bearer) = headers
                .typed_get::<Authorization<Bearer>>()
                .ok_or(Error::Unauthenticated)?;

            provider.verify(bearer.token()).await.map_err(|err| {
                match &err {
                    IdentityError::Rejected(_) => tracing::warn!("Authentication error: {}", err),
                    IdentityError::Unavailable(_) => {
                        tracing::error!("Authentication error: {}", err)
                    }
                }
                Error::Unauthenticated
            })
        }
        IdentityStrategy::Asserted => headers
            .get(USER_ID_HEADER)
            .and_then(|header| header.to_str().ok())
            .map(str::trim)
            .filter(|user_id| !user_id.is_empty())
            .map(Identity::from_id)
            .ok_or(Error::MissingIdentity),
    }
}

#[cfg(test)]
pub mod testing {
    use super::*;
    use std::collections::HashMap;

    /// Accepts a fixed set of tokens, each bound to one user id.
    pub struct StaticIdentityProvider {
        tokens: HashMap<String, String>,
    }

    impl StaticIdentityProvider {
        pub fn new(tokens: &[(&str, &str)]) -> Self {
            Self {
                tokens: tokens
                    .iter()
                    .map(|(token, user_id)| (token.to_string(), user_id.to_string()))
                    .collect(),
            }
        }
    }

    #[async_trait]
    impl IdentityProvider for StaticIdentityProvider {
        async fn verify(&self, token: &str) -> Result<Identity, IdentityError> {
            self.tokens
                .get(token)
                .map(Identity::from_id)
                .ok_or_else(|| IdentityError::Rejected(String::from("INVALID_ID_TOKEN")))
        }
    }
}
