use super::{auth, config, meal};
use crate::types::Context;
use axum::routing::Router;
use std::sync::Arc;

pub fn get_router() -> Router<Arc<Context>> {
    Router::new()
        .nest("/auth", auth::routes::get_router())
        .nest("/config", config::routes::get_router())
        .nest("/meals", meal::routes::get_router())
}
