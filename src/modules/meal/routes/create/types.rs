pub mod request {
    use crate::modules::{auth::middleware::Auth, meal::validation::MealBody};

    pub struct Payload {
        pub auth: Auth,
        /// Undecodable bodies are carried through so they fail at validation.
        pub body: Result<MealBody, String>,
    }
}

pub mod response {
    use crate::{modules::meal::repository::Meal, utils::error::Error};
    use axum::{extract::Json, http::StatusCode, response::IntoResponse};
    use serde_json::json;

    pub enum Success {
        MealCreated(Meal),
    }

    impl IntoResponse for Success {
        fn into_response(self) -> axum::response::Response {
            match self {
                Self::MealCreated(meal) => (StatusCode::CREATED, Json(json!(meal))).into_response(),
            }
        }
    }

    pub type Response = Result<Success, Error>;
}
