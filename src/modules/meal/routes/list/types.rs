pub mod request {
    use crate::modules::auth::middleware::Auth;

    pub struct Payload {
        pub auth: Auth,
    }
}

pub mod response {
    use crate::{modules::meal::repository::Meal, utils::error::Error};
    use axum::{extract::Json, http::StatusCode, response::IntoResponse};
    use serde_json::json;

    pub enum Success {
        Meals(Vec<Meal>),
    }

    impl IntoResponse for Success {
        fn into_response(self) -> axum::response::Response {
            match self {
                Self::Meals(meals) => (StatusCode::OK, Json(json!(meals))).into_response(),
            }
        }
    }

    pub type Response = Result<Success, Error>;
}
