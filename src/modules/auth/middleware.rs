use super::service::identity::{self, Identity};
use crate::{types::Context, utils::error::Error};
use axum::{
    async_trait,
    extract::{Extension, FromRequestParts},
    http::request::Parts,
    RequestPartsExt,
};
use serde::Serialize;
use std::sync::Arc;

/// The caller of the current request, resolved before anything else runs.
#[derive(Serialize, Clone, Debug)]
pub struct Auth {
    pub user: Identity,
}

#[async_trait]
impl<S: Send + Sync> FromRequestParts<S> for Auth {
    type Rejection = Error;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let Extension(ctx) = parts
            .extract::<Extension<Arc<Context>>>()
            .await
            .map_err(|err| {
                tracing::error!("Request context missing: {}", err);
                Error::Unexpected
            })?;

        identity::resolve(&ctx.identity, &parts.headers)
            .await
            .map(|user| Self { user })
    }
}
