use super::types::{request, response};
use crate::{
    modules::meal::{
        ownership::{self, Operation},
        repository::UpdateMealPayload,
        validation,
    },
    types::Context,
    utils::error::Error,
};
use std::sync::Arc;

pub async fn service(ctx: Arc<Context>, payload: request::Payload) -> response::Response {
    let user_id = payload.auth.user.id;

    let mut meal = ctx
        .meals
        .find_by_id(&payload.id)
        .await?
        .ok_or(Error::NotFound)?;

    ownership::authorize(Operation::Update, &user_id, Some(&meal)).into_result()?;

    let body = payload.body.map_err(|err| Error::Invalid(vec![err]))?;
    let fields = validation::validate(&body).map_err(Error::Invalid)?;

    let update = UpdateMealPayload {
        fields,
        updated_at: meal.next_updated_at(),
    };

    ctx.meals
        .update_by_id(&meal.id, update.clone())
        .await
        .map_err(|err| {
            tracing::error!("Failed to update meal {}: {}", meal.id, err);
            err
        })?;

    meal.apply(update);
    tracing::info!("User {} updated meal {}", user_id, meal.id);

    Ok(response::Success::MealUpdated(meal))
}
