pub mod request {
    use crate::modules::auth::middleware::Auth;

    pub struct Payload {
        pub auth: Auth,
    }
}

pub mod response {
    use crate::{modules::auth::service::identity::Identity, utils::error::Error};
    use axum::{extract::Json, http::StatusCode, response::IntoResponse};
    use serde_json::json;

    pub enum Success {
        Verified(Identity),
    }

    impl IntoResponse for Success {
        fn into_response(self) -> axum::response::Response {
            match self {
                Self::Verified(user) => (
                    StatusCode::OK,
                    Json(json!({
                        "uid": user.id,
                        "email": user.email,
                        "displayName": user.display_name,
                        "photoURL": user.photo_url,
                        "emailVerified": user.email_verified,
                    })),
                )
                    .into_response(),
            }
        }
    }

    pub type Response = Result<Success, Error>;
}
