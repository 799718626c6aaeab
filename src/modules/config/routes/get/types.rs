pub mod response {
    use crate::{types::ClientConfig, utils::error::Error};
    use axum::{extract::Json, http::StatusCode, response::IntoResponse};
    use serde_json::json;

    pub enum Success {
        Config(ClientConfig),
    }

    impl IntoResponse for Success {
        fn into_response(self) -> axum::response::Response {
            match self {
                Self::Config(client) => (
                    StatusCode::OK,
                    Json(json!({
                        "firebase": {
                            "apiKey": client.api_key,
                            "authDomain": client.auth_domain,
                            "projectId": client.project_id,
                            "storageBucket": client.storage_bucket,
                            "messagingSenderId": client.messaging_sender_id,
                            "appId": client.app_id,
                            "measurementId": client.measurement_id,
                        }
                    })),
                )
                    .into_response(),
            }
        }
    }

    pub type Response = Result<Success, Error>;
}
