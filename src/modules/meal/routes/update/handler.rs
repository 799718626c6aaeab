use super::{service::service, types::request};
use crate::{
    modules::{auth::middleware::Auth, meal::validation::MealBody},
    types::Context,
};
use axum::{
    extract::{rejection::JsonRejection, Path, State},
    response::IntoResponse,
    Json,
};
use std::sync::Arc;

pub async fn handler(
    State(ctx): State<Arc<Context>>,
    auth: Auth,
    Path(id): Path<String>,
    body: Result<Json<MealBody>, JsonRejection>,
) -> impl IntoResponse {
    service(
        ctx,
        request::Payload {
            id,
            auth,
            body: body
                .map(|Json(body)| body)
                .map_err(|rejection| rejection.body_text()),
        },
    )
    .await
}
