#[cfg(test)]
mod tests {
    use super::super::*;
    use async_trait::async_trait;
    use axum::body::{to_bytes, Body};
    use axum::http::{header, Method, Request, StatusCode};
    use inference_client::{InferenceResult, NormalizeOptions};
    use serde_json::{json, Value};
    use std::sync::Mutex;
    use std::time::Duration;
    use survival_core::{encode, PassengerAttributes, PredictionResult, Verdict};
    use tower::ServiceExt;

    /// Returns a canned outcome and records the attributes it was asked about.
    struct StubProvider {
        outcome: fn() -> InferenceResult<PredictionResult>,
        seen: Mutex<Vec<PassengerAttributes>>,
    }

    impl StubProvider {
        fn new(outcome: fn() -> InferenceResult<PredictionResult>) -> Arc<Self> {
            Arc::new(Self {
                outcome,
                seen: Mutex::new(Vec::new()),
            })
        }

        fn calls(&self) -> usize {
            self.seen.lock().unwrap().len()
        }
    }

    #[async_trait]
    impl InferenceProvider for StubProvider {
        async fn predict(&self, attrs: &PassengerAttributes) -> InferenceResult<PredictionResult> {
            self.seen.lock().unwrap().push(*attrs);
            (self.outcome)()
        }

        fn backend_name(&self) -> &'static str {
            "stub"
        }
    }

    fn survived() -> InferenceResult<PredictionResult> {
        Ok(PredictionResult::from_label("SURVIVED", 0.87))
    }

    fn undetermined() -> InferenceResult<PredictionResult> {
        Ok(PredictionResult::undetermined())
    }

    fn timed_out() -> InferenceResult<PredictionResult> {
        Err(InferenceError::Timeout)
    }

    fn app(provider: Arc<StubProvider>) -> Router {
        build_router(AppState::new(provider))
    }

    fn predict_request(body: Value) -> Request<Body> {
        Request::builder()
            .method(Method::POST)
            .uri("/predict")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn form_values() -> Value {
        json!({
            "age": 30,
            "sex": "male",
            "passengerClass": "2",
            "siblings": 0,
            "parents": 0
        })
    }

    async fn json_body(response: Response) -> Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    fn assert_cors(response: &Response) {
        let headers = response.headers();
        assert_eq!(headers["access-control-allow-origin"], "*");
        assert_eq!(
            headers["access-control-allow-headers"],
            "authorization, x-client-info, apikey, content-type"
        );
    }

    #[tokio::test]
    async fn test_predict_success() {
        let provider = StubProvider::new(survived);
        let response = app(provider.clone())
            .oneshot(predict_request(form_values()))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_cors(&response);
        assert!(response.headers().contains_key("x-request-id"));
        assert_eq!(
            json_body(response).await,
            json!({ "prediction": "Survived", "probability": 0.87 })
        );

        let seen = provider.seen.lock().unwrap();
        assert_eq!(seen.len(), 1);
        assert_eq!(encode(&seen[0]).to_payload(), "0.3 1 2 0 0");
    }

    #[tokio::test]
    async fn test_undetermined_is_a_successful_response() {
        let response = app(StubProvider::new(undetermined))
            .oneshot(predict_request(form_values()))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            json_body(response).await,
            json!({ "prediction": "Unable to determine", "probability": 0.5 })
        );
    }

    #[tokio::test]
    async fn test_out_of_range_rejected_before_inference() {
        let provider = StubProvider::new(survived);

        for body in [
            json!({ "age": 150, "sex": "male", "passengerClass": "2", "siblings": 0, "parents": 0 }),
            json!({ "age": 30, "sex": "male", "passengerClass": "2", "siblings": 11, "parents": 0 }),
            json!({ "age": 30, "sex": "other", "passengerClass": "2", "siblings": 0, "parents": 0 }),
            json!({ "age": 30, "sex": "male", "passengerClass": "5", "siblings": 0, "parents": 0 }),
        ] {
            let response = app(provider.clone())
                .oneshot(predict_request(body))
                .await
                .unwrap();

            assert_eq!(response.status(), StatusCode::BAD_REQUEST);
            assert_cors(&response);
            let body = json_body(response).await;
            assert_eq!(body["error"], "Invalid passenger attributes");
            assert!(body["details"].as_str().is_some());
        }

        assert_eq!(provider.calls(), 0);
    }

    #[tokio::test]
    async fn test_validation_details_name_the_field() {
        let provider = StubProvider::new(survived);
        let mut body = form_values();
        body["age"] = json!(150);

        let response = app(provider.clone())
            .oneshot(predict_request(body))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            json_body(response).await,
            json!({
                "error": "Invalid passenger attributes",
                "details": "age: must be between 0 and 100"
            })
        );
        assert_eq!(provider.calls(), 0);
    }

    #[tokio::test]
    async fn test_malformed_body_rejected() {
        let provider = StubProvider::new(survived);
        let request = Request::builder()
            .method(Method::POST)
            .uri("/predict")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from("{\"age\": "))
            .unwrap();

        let response = app(provider.clone()).oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(json_body(response).await["error"], "Invalid passenger attributes");
        assert_eq!(provider.calls(), 0);
    }

    #[tokio::test]
    async fn test_transport_failure_is_terminal_error() {
        let response = app(StubProvider::new(timed_out))
            .oneshot(predict_request(form_values()))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_cors(&response);
        assert_eq!(
            json_body(response).await,
            json!({
                "error": "Failed to make prediction",
                "details": "Request to inference endpoint timed out"
            })
        );
    }

    #[tokio::test]
    async fn test_preflight() {
        let provider = StubProvider::new(survived);
        let request = Request::builder()
            .method(Method::OPTIONS)
            .uri("/predict")
            .header("origin", "https://form.example")
            .header("access-control-request-method", "POST")
            .body(Body::empty())
            .unwrap();

        let response = app(provider.clone()).oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_cors(&response);
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert!(bytes.is_empty());
        assert_eq!(provider.calls(), 0);
    }

    #[tokio::test]
    async fn test_request_id_is_propagated() {
        let mut request = predict_request(form_values());
        request
            .headers_mut()
            .insert("x-request-id", "req-123".parse().unwrap());

        let response = app(StubProvider::new(survived)).oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()["x-request-id"], "req-123");
    }

    #[tokio::test]
    async fn test_predict_requires_request_id_layer() {
        // Without the middleware the handler has no RequestId to read.
        let bare = predict_routes::predict_routes().with_state(AppState::new(StubProvider::new(survived)));
        let response = bare.oneshot(predict_request(form_values())).await.unwrap();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[tokio::test]
    async fn test_health_and_openapi() {
        let provider = StubProvider::new(survived);

        let response = app(provider.clone())
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(json_body(response).await, json!({ "status": "ok", "backend": "stub" }));

        let response = app(provider)
            .oneshot(Request::get("/api-docs/openapi.json").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let doc = json_body(response).await;
        assert!(doc["paths"]["/predict"]["post"].is_object());
    }

    #[test]
    fn test_inference_error_mapping() {
        let err = AppError::from(InferenceError::Timeout);
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let core = survival_core::CoreError::validation("age", "must be between 0 and 100");
        let err = AppError::from(InferenceError::Validation(core));
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
    }

    /// Full path through the real HTTP provider against a local fake model.
    #[tokio::test]
    async fn test_end_to_end_against_fake_model() {
        let model = Router::new().route(
            "/model",
            axum::routing::post(|Json(payload): Json<Value>| async move {
                assert_eq!(payload, json!("0.45 0 1 0.1 0"));
                Json(json!({ "label": "NOT_SURVIVED", "score": 0.6 }))
            }),
        );
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, model).await.unwrap();
        });

        let client = InferenceClient::new(InferenceConfig {
            endpoint: format!("http://{addr}/model"),
            api_token: None,
            timeout: Duration::from_secs(5),
            normalize: NormalizeOptions::default(),
        })
        .unwrap();
        let gateway = build_router(AppState::new(Arc::new(HttpInferenceProvider::from(client))));

        let response = gateway
            .oneshot(predict_request(json!({
                "age": 45,
                "sex": "female",
                "passengerClass": "1",
                "siblings": 1,
                "parents": 0
            })))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert_eq!(body["prediction"], json!(Verdict::DidNotSurvive.as_str()));
        assert_eq!(body["probability"], 0.6);
    }
}
