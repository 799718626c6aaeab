use crate::{
    modules::{self, auth::service::identity::USER_ID_HEADER},
    types::Context,
};
use axum::{
    extract::DefaultBodyLimit,
    http::{header, HeaderName, HeaderValue, Method},
    Extension, Router,
};
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::{cors, set_header::SetResponseHeaderLayer, trace};

pub struct App {
    ctx: Arc<Context>,
    router: Router,
}

impl App {
    pub fn new(ctx: Arc<Context>) -> Self {
        let router = Router::new()
            .nest("/api", modules::get_router())
            .with_state(ctx.clone())
            .layer(Extension(ctx.clone()))
            .layer(DefaultBodyLimit::max(1024 * 1024))
            .layer(trace::TraceLayer::new_for_http())
            .layer(SetResponseHeaderLayer::overriding(
                header::X_CONTENT_TYPE_OPTIONS,
                HeaderValue::from_static("nosniff"),
            ))
            .layer(SetResponseHeaderLayer::overriding(
                header::X_FRAME_OPTIONS,
                HeaderValue::from_static("DENY"),
            ))
            .layer(SetResponseHeaderLayer::overriding(
                header::REFERRER_POLICY,
                HeaderValue::from_static("no-referrer"),
            ))
            .layer(
                cors::CorsLayer::new()
                    .allow_methods([
                        Method::OPTIONS,
                        Method::GET,
                        Method::POST,
                        Method::PUT,
                        Method::DELETE,
                    ])
                    .allow_headers([
                        header::AUTHORIZATION,
                        header::CONTENT_TYPE,
                        HeaderName::from_static(USER_ID_HEADER),
                    ])
                    .allow_origin(cors::Any),
            );

        Self { ctx, router }
    }

    pub async fn serve(self) -> Result<(), std::io::Error> {
        let address = format!("{}:{}", self.ctx.app.host, self.ctx.app.port);
        let listener = TcpListener::bind(&address).await?;

        tracing::info!("App is running on {}", address);

        axum::serve(listener, self.router).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        modules::{
            auth::service::identity::{testing::StaticIdentityProvider, IdentityStrategy},
            meal::repository::testing::{FailingMealRepository, Failure},
        },
        types::testing,
    };
    use axum::{
        body::{to_bytes, Body},
        http::{Request, Response, StatusCode},
    };
    use serde_json::{json, Value};
    use tower::ServiceExt;

    fn app() -> App {
        App::new(testing::context(IdentityStrategy::Verified(Arc::new(
            StaticIdentityProvider::new(&[("alice-token", "alice"), ("bob-token", "bob")]),
        ))))
    }

    fn request(method: &str, uri: &str, token: Option<&str>, body: Option<Value>) -> Request<Body> {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }

        match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        }
    }

    async fn send(app: &App, request: Request<Body>) -> Response<Body> {
        app.router.clone().oneshot(request).await.unwrap()
    }

    async fn json_body(response: Response<Body>) -> Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    fn tacos() -> Value {
        json!({
            "name": "Tacos",
            "date": "2024-01-01",
            "difficulty": "MEDIUM",
            "nutrition": "HEALTHY",
            "cuisine": "Mexican",
            "rating": 4.5
        })
    }

    #[tokio::test]
    async fn meal_lifecycle() {
        let app = app();

        let response = send(&app, request("POST", "/api/meals", Some("alice-token"), Some(tacos()))).await;
        assert_eq!(response.status(), StatusCode::CREATED);
        let created = json_body(response).await;
        let id = created["id"].as_str().unwrap().to_string();
        assert_eq!(created["ownerId"], "alice");
        assert_eq!(created["difficulty"], "MEDIUM");
        assert_eq!(created["notes"], "");
        assert_eq!(created["createdAt"], created["updatedAt"]);

        let response = send(&app, request("GET", "/api/meals", Some("alice-token"), None)).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(json_body(response).await, json!([created.clone()]));

        let mut changed = tacos();
        changed["notes"] = json!("extra salsa");
        let uri = format!("/api/meals/{id}");
        let response = send(&app, request("PUT", &uri, Some("alice-token"), Some(changed))).await;
        assert_eq!(response.status(), StatusCode::OK);
        let updated = json_body(response).await;
        assert_eq!(updated["id"], created["id"]);
        assert_eq!(updated["notes"], "extra salsa");
        assert_eq!(updated["createdAt"], created["createdAt"]);
        assert_ne!(updated["updatedAt"], created["updatedAt"]);

        let response = send(&app, request("GET", &uri, Some("alice-token"), None)).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(json_body(response).await, updated);

        let response = send(&app, request("DELETE", &uri, Some("alice-token"), None)).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            json_body(response).await,
            json!({ "message": "Meal deleted successfully" })
        );

        let response = send(&app, request("DELETE", &uri, Some("alice-token"), None)).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(json_body(response).await, json!({ "error": "Meal not found" }));
    }

    #[tokio::test]
    async fn requests_without_valid_credentials_are_unauthorized() {
        let app = app();

        for token in [None, Some("forged-token")] {
            let response = send(&app, request("GET", "/api/meals", token, None)).await;
            assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
            assert_eq!(
                json_body(response).await,
                json!({ "error": "Unauthorized: Invalid token" })
            );
        }

        let response = send(&app, request("POST", "/api/meals", None, Some(json!({})))).await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn asserted_identity_requires_the_user_id_header() {
        let app = App::new(testing::context(IdentityStrategy::Asserted));

        let response = send(&app, request("GET", "/api/meals", None, None)).await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(json_body(response).await, json!({ "error": "User ID is required" }));

        let response = send(
            &app,
            Request::builder()
                .uri("/api/meals")
                .header(USER_ID_HEADER, "carol")
                .body(Body::empty())
                .unwrap(),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(json_body(response).await, json!([]));
    }

    #[tokio::test]
    async fn other_users_meals_are_forbidden() {
        let app = app();

        let response = send(&app, request("POST", "/api/meals", Some("alice-token"), Some(tacos()))).await;
        let id = json_body(response).await["id"].as_str().unwrap().to_string();
        let uri = format!("/api/meals/{id}");

        for (method, body) in [("GET", None), ("PUT", Some(tacos())), ("DELETE", None)] {
            let response = send(&app, request(method, &uri, Some("bob-token"), body)).await;
            assert_eq!(response.status(), StatusCode::FORBIDDEN, "{method}");
            assert_eq!(
                json_body(response).await,
                json!({ "error": "Access denied. You can only access your own meals." })
            );
        }

        let response = send(&app, request("GET", "/api/meals", Some("bob-token"), None)).await;
        assert_eq!(json_body(response).await, json!([]));

        let response = send(&app, request("GET", &uri, Some("alice-token"), None)).await;
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn invalid_payloads_are_bad_requests() {
        let app = app();

        let response = send(
            &app,
            request(
                "POST",
                "/api/meals",
                Some("alice-token"),
                Some(json!({ "name": "Tacos", "rating": 9 })),
            ),
        )
        .await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = json_body(response).await;
        assert_eq!(
            body["errors"],
            json!([
                "date is required",
                "difficulty is required",
                "nutrition is required",
                "cuisine is required",
                "rating must be between 0 and 5 with 0.5 increments"
            ])
        );

        let response = send(
            &app,
            Request::builder()
                .method("POST")
                .uri("/api/meals")
                .header(header::AUTHORIZATION, "Bearer alice-token")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from("{not json"))
                .unwrap(),
        )
        .await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let response = send(&app, request("GET", "/api/meals", Some("alice-token"), None)).await;
        assert_eq!(json_body(response).await, json!([]));
    }

    #[tokio::test]
    async fn missing_meals_are_not_found() {
        let app = app();

        let response = send(&app, request("GET", "/api/meals/missing", Some("alice-token"), None)).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let response = send(&app, request("PUT", "/api/meals/missing", Some("alice-token"), Some(json!({})))).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn store_outages_are_retryable_and_denials_are_not() {
        let cases = [
            (Failure::Unavailable, StatusCode::SERVICE_UNAVAILABLE, true),
            (Failure::Denied, StatusCode::INTERNAL_SERVER_ERROR, false),
        ];

        for (failure, status, retry) in cases {
            let app = App::new(testing::context_with(
                Arc::new(FailingMealRepository::new(failure)),
                IdentityStrategy::Asserted,
            ));

            for method in ["GET", "DELETE"] {
                let response = send(
                    &app,
                    Request::builder()
                        .method(method)
                        .uri("/api/meals/m1")
                        .header(USER_ID_HEADER, "carol")
                        .body(Body::empty())
                        .unwrap(),
                )
                .await;

                assert_eq!(response.status(), status, "{method}");
                assert_eq!(
                    response.headers().contains_key(header::RETRY_AFTER),
                    retry,
                    "{method}"
                );
            }
        }
    }

    #[tokio::test]
    async fn verify_echoes_the_caller() {
        let app = app();

        let response = send(&app, request("GET", "/api/auth/verify", Some("alice-token"), None)).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            json_body(response).await,
            json!({
                "uid": "alice",
                "email": null,
                "displayName": null,
                "photoURL": null,
                "emailVerified": false
            })
        );

        let response = send(&app, request("GET", "/api/auth/verify", None, None)).await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn config_is_public() {
        let app = app();

        let response = send(&app, request("GET", "/api/config", None, None)).await;
        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert!(body["firebase"].is_object());
        assert_eq!(body["firebase"]["apiKey"], Value::Null);
    }

    #[tokio::test]
    async fn responses_carry_security_headers() {
        let app = app();

        let response = send(&app, request("GET", "/api/meals", None, None)).await;
        let headers = response.headers();

        assert_eq!(headers[header::X_CONTENT_TYPE_OPTIONS], "nosniff");
        assert_eq!(headers[header::X_FRAME_OPTIONS], "DENY");
        assert_eq!(headers[header::REFERRER_POLICY], "no-referrer");
    }

    #[tokio::test]
    async fn preflight_allows_any_origin() {
        let app = app();

        let response = send(
            &app,
            Request::builder()
                .method("OPTIONS")
                .uri("/api/meals")
                .header(header::ORIGIN, "https://grublog.example")
                .header(header::ACCESS_CONTROL_REQUEST_METHOD, "POST")
                .body(Body::empty())
                .unwrap(),
        )
        .await;

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN], "*");
    }
}
