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

    ownership::authorize(Operation::Delete, &payload.auth.user.id, Some(&meal)).into_result()?;

    ctx.meals.delete_by_id(&meal.id).await.map_err(|err| {
        tracing::error!("Failed to delete meal {}: {}", meal.id, err);
        err
    })?;

    tracing::info!("User {} deleted meal {}", payload.auth.user.id, meal.id);

    Ok(response::Success::MealDeleted)
}
