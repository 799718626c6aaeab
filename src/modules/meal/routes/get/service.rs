use super::types::{request, response};
use crate::{
    modules::meal::ownership::{self, Operation},
    types::Context,
    utils::error::Error,
};
use std::sync::Arc;

pub async fn service(ctx: Arc<Context>, payload: request::Payload) -> response::Response {
    let meal = ctx
        .meals
        .find_by_id(&payload.id)
        .await?
        .ok_or(Error::NotFound)?;

    ownership::authorize(Operation::Get, &payload.auth.user.id, Some(&meal)).into_result()?;

    Ok(response::Success::Meal(meal))
}
