use super::types::{request, response};

pub async fn service(payload: request::Payload) -> response::Response {
    Ok(response::Success::Verified(payload.auth.user))
}
