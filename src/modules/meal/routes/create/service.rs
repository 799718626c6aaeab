use super::types::{request, response};
use crate::{
    modules::meal::{
        ownership::{self, Operation},
        repository::{self, CreateMealPayload},
        validation,
    },
    types::Context,
    utils::error::Error,
};
use std::sync::Arc;

pub async fn service(ctx: Arc<Context>, payload: request::Payload) -> response::Response {
    let owner_id = payload.auth.user.id;

    ownership::authorize(Operation::Create, &owner_id, None).into_result()?;

    let body = payload.body.map_err(|err| Error::Invalid(vec![err]))?;
    let fields = validation::validate(&body).map_err(Error::Invalid)?;

    let now = repository::timestamp();
    let meal = ctx
        .meals
        .create(CreateMealPayload {
            owner_id: owner_id.clone(),
            fields,
            created_at: now,
            updated_at: now,
        })
        .await
        .map_err(|err| {
            tracing::error!("Failed to create meal for user {}: {}", owner_id, err);
            err
        })?;

    tracing::info!("User {} created meal {}", owner_id, meal.id);

    Ok(response::Success::MealCreated(meal))
}
