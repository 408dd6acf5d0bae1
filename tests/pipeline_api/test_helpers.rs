//! Shared test helpers for pipeline API tests.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use actix_web::{App, dev::ServiceResponse, test, web};
use async_trait::async_trait;
use casegen_lib::auth::AdminKey;
use casegen_lib::db::DbPool;
use casegen_lib::services::PipelineSettings;
use casegen_lib::services::api_key;
use casegen_lib::services::generator::{GeneratorError, PromptPart, TextGenerator};
use serde_json::Value;

/// Admin key used in tests.
pub const TEST_ADMIN_KEY: &str = "test-admin-key-for-pipeline-api";

/// Generator that replays canned responses in order and records every prompt.
#[derive(Default)]
pub struct ScriptedGenerator {
    responses: Mutex<VecDeque<Result<String, GeneratorError>>>,
    prompts: Mutex<Vec<Vec<PromptPart>>>,
}

impl ScriptedGenerator {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Queue a raw text response.
    pub fn push(&self, raw: &str) {
        self.responses.lock().unwrap().push_back(Ok(raw.to_string()));
    }

    /// Queue a transport failure.
    pub fn push_error(&self, err: GeneratorError) {
        self.responses.lock().unwrap().push_back(Err(err));
    }

    pub fn calls(&self) -> usize {
        self.prompts.lock().unwrap().len()
    }

    /// Text segments of the most recent prompt, joined.
    pub fn last_prompt_text(&self) -> String {
        self.prompts
            .lock()
            .unwrap()
            .last()
            .map(|parts| {
                parts
                    .iter()
                    .filter_map(|p| match p {
                        PromptPart::Text(s) => Some(s.as_str()),
                        PromptPart::Image { .. } => None,
                    })
                    .collect::<Vec<_>>()
                    .join("\n")
            })
            .unwrap_or_default()
    }

    /// Number of image segments in the most recent prompt.
    pub fn last_prompt_images(&self) -> usize {
        self.prompts
            .lock()
            .unwrap()
            .last()
            .map(|parts| {
                parts
                    .iter()
                    .filter(|p| matches!(p, PromptPart::Image { .. }))
                    .count()
            })
            .unwrap_or(0)
    }
}

#[async_trait]
impl TextGenerator for ScriptedGenerator {
    async fn generate(&self, parts: &[PromptPart]) -> Result<String, GeneratorError> {
        self.prompts.lock().unwrap().push(parts.to_vec());
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(GeneratorError::Request("no scripted response".to_string())))
    }
}

/// Create a fresh in-memory database with all migrations applied.
pub async fn create_test_pool() -> DbPool {
    let pool = DbPool::connect("sqlite::memory:", 1)
        .await
        .expect("Failed to open in-memory database");
    pool.run_migrations()
        .await
        .expect("Failed to run migrations");
    pool
}

/// Create an API key (principal) directly in the store.
pub async fn create_principal(pool: &DbPool, name: &str) -> String {
    let (key, _) = api_key::create_key(pool, name, None)
        .await
        .expect("Failed to create API key");
    key
}

/// Create a test app wired like the server.
pub async fn create_test_app(
    pool: &DbPool,
    generator: Arc<ScriptedGenerator>,
) -> impl actix_web::dev::Service<
    actix_http::Request,
    Response = ServiceResponse,
    Error = actix_web::Error,
> {
    let generator: Arc<dyn TextGenerator> = generator;
    let settings = PipelineSettings {
        generator_timeout: Duration::from_secs(5),
        max_input_chars: 18_000,
    };

    test::init_service(
        App::new()
            .app_data(web::Data::new(pool.clone()))
            .app_data(web::Data::new(AdminKey::new(Some(TEST_ADMIN_KEY.to_string()))))
            .app_data(web::Data::new(settings))
            .app_data(web::Data::from(generator))
            .service(
                web::scope("/api/v1")
                    .configure(casegen_lib::api::configure_health_routes)
                    .configure(casegen_lib::api::configure_project_routes)
                    .configure(casegen_lib::api::configure_generation_routes)
                    .configure(casegen_lib::api::configure_test_case_routes)
                    .configure(casegen_lib::api::configure_analysis_routes)
                    .configure(casegen_lib::services::configure_auth_routes),
            ),
    )
    .await
}

/// Send a request and return the status with the JSON body (`Null` when empty).
pub async fn send<S>(app: &S, req: test::TestRequest) -> (u16, Value)
where
    S: actix_web::dev::Service<
            actix_http::Request,
            Response = ServiceResponse,
            Error = actix_web::Error,
        >,
{
    let resp = test::call_service(app, req.to_request()).await;
    let status = resp.status().as_u16();
    let bytes = test::read_body(resp).await;
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).expect("Response body is not JSON")
    };
    (status, body)
}

/// GET with an API key.
pub async fn get<S>(app: &S, key: &str, uri: &str) -> (u16, Value)
where
    S: actix_web::dev::Service<
            actix_http::Request,
            Response = ServiceResponse,
            Error = actix_web::Error,
        >,
{
    send(
        app,
        test::TestRequest::get()
            .uri(uri)
            .insert_header(("X-API-Key", key)),
    )
    .await
}

/// POST a JSON body with an API key.
pub async fn post<S>(app: &S, key: &str, uri: &str, body: Value) -> (u16, Value)
where
    S: actix_web::dev::Service<
            actix_http::Request,
            Response = ServiceResponse,
            Error = actix_web::Error,
        >,
{
    send(
        app,
        test::TestRequest::post()
            .uri(uri)
            .insert_header(("X-API-Key", key))
            .set_json(body),
    )
    .await
}

/// PUT a JSON body with an API key.
pub async fn put<S>(app: &S, key: &str, uri: &str, body: Value) -> (u16, Value)
where
    S: actix_web::dev::Service<
            actix_http::Request,
            Response = ServiceResponse,
            Error = actix_web::Error,
        >,
{
    send(
        app,
        test::TestRequest::put()
            .uri(uri)
            .insert_header(("X-API-Key", key))
            .set_json(body),
    )
    .await
}

/// DELETE with an API key.
pub async fn delete<S>(app: &S, key: &str, uri: &str) -> (u16, Value)
where
    S: actix_web::dev::Service<
            actix_http::Request,
            Response = ServiceResponse,
            Error = actix_web::Error,
        >,
{
    send(
        app,
        test::TestRequest::delete()
            .uri(uri)
            .insert_header(("X-API-Key", key)),
    )
    .await
}

/// Create a project via the API and return its id.
pub async fn create_project<S>(app: &S, key: &str, name: &str) -> String
where
    S: actix_web::dev::Service<
            actix_http::Request,
            Response = ServiceResponse,
            Error = actix_web::Error,
        >,
{
    let (status, body) = post(
        app,
        key,
        "/api/v1/projects",
        serde_json::json!({ "name": name }),
    )
    .await;
    assert_eq!(status, 201, "Failed to create project: {}", body);
    body["id"].as_str().unwrap().to_string()
}

/// Generate from requirement text and return the response.
pub async fn generate_text<S>(app: &S, key: &str, project_id: &str, requirements: &str) -> (u16, Value)
where
    S: actix_web::dev::Service<
            actix_http::Request,
            Response = ServiceResponse,
            Error = actix_web::Error,
        >,
{
    post(
        app,
        key,
        &format!("/api/v1/projects/{}/generations/text", project_id),
        serde_json::json!({ "requirements": requirements }),
    )
    .await
}

/// Raw grouped generator output with one scenario: two positive, one negative.
pub const GROUPED_RAW: &str = r#"Here you go:
```json
[
  {
    "scenario_id": "TS-01",
    "scenario_title": "Login",
    "positive_test_cases": [
      {"test_case_id": "TC-01", "test_case_summary": "Valid login", "test_steps": ["Open", "Submit"], "severity": "High"},
      {"test_case_id": "TC-02", "test_case_summary": "Remember me", "severity": "Low"}
    ],
    "negative_test_cases": [
      {"test_case_id": "TC-03", "test_case_summary": "Wrong password", "test_data": {"password": "bad"}, "severity": "High"}
    ]
  }
]
```"#;

/// Raw flat generator output with two test cases.
pub const FLAT_RAW: &str = r#"[
  {"test_case_id": "TC-1", "test_case_summary": "Create order", "test_steps": ["Add item", "Checkout"], "expected_result": "Order placed", "priority": "P1", "severity": "Critical"},
  {"test_case_id": "TC-2", "test_case_summary": "Cancel order", "test_data": ["order-1", "order-2"], "severity": "Medium"}
]"#;
