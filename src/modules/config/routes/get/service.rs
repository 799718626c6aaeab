use super::types::response;
use crate::types::Context;
use std::sync::Arc;

pub async fn service(ctx: Arc<Context>) -> response::Response {
    Ok(response::Success::Config(ctx.client.clone()))
}
