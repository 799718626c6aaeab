use super::{service::service, types::request};
use crate::{
    modules::{auth::middleware::Auth, meal::validation::MealBody},
    types::Context,
};
use axum::{
    extract::{rejection::JsonRejection, State},
    response::IntoResponse,
    Json,
};
use std::sync::Arc;

pub async fn handler(
    State(ctx): State<Arc<Context>>,
    auth: Auth,
    body: Result<Json<MealBody>, JsonRejection>,
) -> impl IntoResponse {
    service(
        ctx,
        request::Payload {
            auth,
            body: body
                .map(|Json(body)| body)
                .map_err(|rejection| rejection.body_text()),
        },
    )
    .await
}
