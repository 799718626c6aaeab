use super::types::{request, response};
use crate::{
    modules::meal::ownership::{self, Operation},
    types::Context,
};
use std::sync::Arc;

pub async fn service(ctx: Arc<Context>, payload: request::Payload) -> response::Response {
    let user_id = payload.auth.user.id;

    ownership::authorize(Operation::List, &user_id, None).into_result()?;

    let meals = ctx
        .meals
        .find_many_by_owner_id(&user_id)
        .await
        .map_err(|err| {
            tracing::error!("Failed to fetch meals for user {}: {}", user_id, err);
            err
        })?;

    Ok(response::Success::Meals(meals))
}
