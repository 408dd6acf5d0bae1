//! Generation endpoints: shapes, fallbacks, failures and batch bookkeeping.

use super::test_helpers::*;
use casegen_lib::services::generator::GeneratorError;
use serde_json::json;

/// A flat array becomes one batch whose children match the records in order.
#[actix_rt::test]
async fn test_flat_generation_persists_batch() {
    let pool = create_test_pool().await;
    let generator = ScriptedGenerator::new();
    generator.push(FLAT_RAW);
    let app = create_test_app(&pool, generator.clone()).await;
    let key = create_principal(&pool, "qa").await;
    let project = create_project(&app, &key, "Shop").await;

    let (status, body) = generate_text(&app, &key, &project, "Users can order items").await;

    assert_eq!(status, 201, "Generation should persist: {}", body);
    assert_eq!(body["source"], "Text Input");
    assert_eq!(body["count"], 2);
    let records = body["records"].as_array().unwrap();
    assert_eq!(records.len(), 2);
    assert_eq!(records[0]["case_ref"], "TC-1");
    assert_eq!(records[0]["summary"], "Create order");
    assert_eq!(records[0]["steps"], json!(["Add item", "Checkout"]));
    assert_eq!(records[0]["expected_result"], "Order placed");
    assert_eq!(records[0]["priority"], "P1");
    assert!(records[0]["classification"].is_null());
    assert_eq!(records[1]["example_data"]["kind"], "list");
    assert_eq!(records[1]["sequence"], 1);

    let batch_id = body["batch_id"].as_str().unwrap();
    let (status, batch) = get(
        &app,
        &key,
        &format!("/api/v1/projects/{}/batches/{}", project, batch_id),
    )
    .await;
    assert_eq!(status, 200);
    assert_eq!(batch["test_case_count"], 2);
    assert_eq!(batch["source"], "Text Input");
    let ids: Vec<&str> = batch["test_case_ids"]
        .as_array()
        .unwrap()
        .iter()
        .map(|v| v.as_str().unwrap())
        .collect();
    let child_ids: Vec<&str> = batch["test_cases"]
        .as_array()
        .unwrap()
        .iter()
        .map(|c| c["id"].as_str().unwrap())
        .collect();
    assert_eq!(ids, child_ids);
    assert_eq!(ids[0], records[0]["id"].as_str().unwrap());

    assert!(generator.last_prompt_text().contains("Users can order items"));
}

/// Grouped scenarios flatten into positive then negative children.
#[actix_rt::test]
async fn test_grouped_generation_flattens_with_classification() {
    let pool = create_test_pool().await;
    let generator = ScriptedGenerator::new();
    generator.push(GROUPED_RAW);
    let app = create_test_app(&pool, generator).await;
    let key = create_principal(&pool, "qa").await;
    let project = create_project(&app, &key, "Auth").await;

    let (status, body) = generate_text(&app, &key, &project, "Login with password").await;

    assert_eq!(status, 201, "{}", body);
    assert_eq!(body["count"], 3);
    let classes: Vec<&str> = body["records"]
        .as_array()
        .unwrap()
        .iter()
        .map(|r| r["classification"].as_str().unwrap())
        .collect();
    assert_eq!(classes, vec!["positive", "positive", "negative"]);
    assert!(
        body["records"]
            .as_array()
            .unwrap()
            .iter()
            .all(|r| r["scenario"] == "Login")
    );
    assert_eq!(body["records"][2]["example_data"]["kind"], "structured");
    assert_eq!(body["records"][2]["example_data"]["value"]["password"], "bad");
}

/// A fenced empty array is a valid, empty result: no batch is written.
#[actix_rt::test]
async fn test_empty_array_writes_nothing() {
    let pool = create_test_pool().await;
    let generator = ScriptedGenerator::new();
    generator.push("No cases apply.\n```json\n[]\n```");
    let app = create_test_app(&pool, generator).await;
    let key = create_principal(&pool, "qa").await;
    let project = create_project(&app, &key, "Empty").await;

    let (status, body) = generate_text(&app, &key, &project, "Nothing testable").await;

    assert_eq!(status, 200, "{}", body);
    assert!(body["batch_id"].is_null());
    assert_eq!(body["count"], 0);
    assert!(body.get("warning").is_none());

    let (_, stats) = get(&app, &key, &format!("/api/v1/projects/{}/stats", project)).await;
    assert_eq!(stats["batch_count"], 0);
    assert_eq!(stats["test_case_count"], 0);
}

/// Unparseable output comes back verbatim with a warning and is not stored.
#[actix_rt::test]
async fn test_unrecognized_output_falls_back_without_persisting() {
    let pool = create_test_pool().await;
    let generator = ScriptedGenerator::new();
    let prose = "1. Open the login page\n2. Enter credentials";
    generator.push(prose);
    let app = create_test_app(&pool, generator).await;
    let key = create_principal(&pool, "qa").await;
    let project = create_project(&app, &key, "Prose").await;

    let (status, body) = generate_text(&app, &key, &project, "Login").await;

    assert_eq!(status, 200, "{}", body);
    assert_eq!(body["raw_text"], prose);
    assert!(!body["warning"].as_str().unwrap().is_empty());
    assert!(body.get("batch_id").is_none());

    let (_, stats) = get(&app, &key, &format!("/api/v1/projects/{}/stats", project)).await;
    assert_eq!(stats["batch_count"], 0);
}

/// A partially malformed array is rejected as a whole.
#[actix_rt::test]
async fn test_malformed_element_rejects_whole_array() {
    let pool = create_test_pool().await;
    let generator = ScriptedGenerator::new();
    generator.push(r#"[{"test_case_summary": "ok"}, "not an object"]"#);
    let app = create_test_app(&pool, generator).await;
    let key = create_principal(&pool, "qa").await;
    let project = create_project(&app, &key, "Mixed").await;

    let (status, body) = generate_text(&app, &key, &project, "Anything").await;

    assert_eq!(status, 200);
    assert!(body["warning"].is_string());
    let (_, list) = get(&app, &key, &format!("/api/v1/projects/{}/test-cases", project)).await;
    assert_eq!(list["total"], 0);
}

/// In-band generator errors are surfaced as 502 and nothing is stored.
#[actix_rt::test]
async fn test_sentinel_response_is_gateway_error() {
    let pool = create_test_pool().await;
    let generator = ScriptedGenerator::new();
    generator.push("Error: Content generation blocked due to SAFETY.");
    let app = create_test_app(&pool, generator).await;
    let key = create_principal(&pool, "qa").await;
    let project = create_project(&app, &key, "Blocked").await;

    let (status, body) = generate_text(&app, &key, &project, "Something").await;

    assert_eq!(status, 502, "{}", body);
    assert_eq!(body["error"], "GENERATION_ERROR");
    assert_eq!(
        body["message"],
        "Error: Content generation blocked due to SAFETY."
    );

    let (_, stats) = get(&app, &key, &format!("/api/v1/projects/{}/stats", project)).await;
    assert_eq!(stats["batch_count"], 0);
}

/// Transport failures map to 502 with the sentinel-prefixed message.
#[actix_rt::test]
async fn test_generator_failure_is_gateway_error() {
    let pool = create_test_pool().await;
    let generator = ScriptedGenerator::new();
    generator.push_error(GeneratorError::Api {
        status: 429,
        body: "quota".to_string(),
    });
    let app = create_test_app(&pool, generator).await;
    let key = create_principal(&pool, "qa").await;
    let project = create_project(&app, &key, "Quota").await;

    let (status, body) = generate_text(&app, &key, &project, "Something").await;

    assert_eq!(status, 502);
    assert!(body["message"].as_str().unwrap().starts_with("Error:"));
}

/// Input is validated before the generator is called.
#[actix_rt::test]
async fn test_invalid_input_never_reaches_generator() {
    let pool = create_test_pool().await;
    let generator = ScriptedGenerator::new();
    let app = create_test_app(&pool, generator.clone()).await;
    let key = create_principal(&pool, "qa").await;
    let project = create_project(&app, &key, "Validation").await;

    let (status, _) = generate_text(&app, &key, &project, "   ").await;
    assert_eq!(status, 400);

    let (status, body) = post(
        &app,
        &key,
        &format!("/api/v1/projects/{}/generations/document", project),
        json!({ "file_name": "notes.txt", "extracted_text": "hello" }),
    )
    .await;
    assert_eq!(status, 400);
    assert!(body["message"].as_str().unwrap().contains("PDF or DOCX"));

    let (status, _) = post(
        &app,
        &key,
        &format!("/api/v1/projects/{}/generations/design", project),
        json!({ "file_key": "../etc", "extracted_text": "Button" }),
    )
    .await;
    assert_eq!(status, 400);

    let (status, _) = post(
        &app,
        &key,
        &format!("/api/v1/projects/{}/generations/images", project),
        json!({ "images": [] }),
    )
    .await;
    assert_eq!(status, 400);

    let (status, _) = post(
        &app,
        &key,
        &format!("/api/v1/projects/{}/generations/images", project),
        json!({ "images": [{ "file_name": "a.gif", "mime_type": "image/gif", "data_base64": "R0lG" }] }),
    )
    .await;
    assert_eq!(status, 400);

    assert_eq!(generator.calls(), 0);
}

/// Document and design sources are labelled from the request.
#[actix_rt::test]
async fn test_document_and_design_sources() {
    let pool = create_test_pool().await;
    let generator = ScriptedGenerator::new();
    generator.push(FLAT_RAW);
    generator.push(FLAT_RAW);
    let app = create_test_app(&pool, generator.clone()).await;
    let key = create_principal(&pool, "qa").await;
    let project = create_project(&app, &key, "Sources").await;

    let (status, body) = post(
        &app,
        &key,
        &format!("/api/v1/projects/{}/generations/document", project),
        json!({ "file_name": "Spec.PDF", "extracted_text": "The cart keeps items for 7 days." }),
    )
    .await;
    assert_eq!(status, 201, "{}", body);
    assert_eq!(body["source"], "File: Spec.PDF");
    assert!(generator.last_prompt_text().contains("7 days"));

    let (status, body) = post(
        &app,
        &key,
        &format!("/api/v1/projects/{}/generations/design", project),
        json!({ "file_key": "AbC-123_x", "extracted_text": "Checkout button" }),
    )
    .await;
    assert_eq!(status, 201, "{}", body);
    assert_eq!(body["source"], "Figma File (AbC-123_x)");
}

/// Screenshots are forwarded to the generator as image segments.
#[actix_rt::test]
async fn test_image_generation_forwards_images() {
    let pool = create_test_pool().await;
    let generator = ScriptedGenerator::new();
    generator.push(FLAT_RAW);
    let app = create_test_app(&pool, generator.clone()).await;
    let key = create_principal(&pool, "qa").await;
    let project = create_project(&app, &key, "Screens").await;

    let (status, body) = post(
        &app,
        &key,
        &format!("/api/v1/projects/{}/generations/images", project),
        json!({
            "images": [
                { "file_name": "login.png", "mime_type": "image/png", "data_base64": "iVBORw0KGgo=" },
                { "file_name": "home.jpg", "mime_type": "image/jpeg", "data_base64": "/9j/4AAQ" }
            ],
            "context": "Mobile banking app"
        }),
    )
    .await;

    assert_eq!(status, 201, "{}", body);
    assert_eq!(body["source"], "Images: login.png, home.jpg");
    assert_eq!(generator.last_prompt_images(), 2);
    assert!(generator.last_prompt_text().contains("Mobile banking app"));
}

/// Deleting a batch removes every child; other batches are untouched.
#[actix_rt::test]
async fn test_delete_batch_cascades_to_children() {
    let pool = create_test_pool().await;
    let generator = ScriptedGenerator::new();
    generator.push(FLAT_RAW);
    generator.push(GROUPED_RAW);
    let app = create_test_app(&pool, generator).await;
    let key = create_principal(&pool, "qa").await;
    let project = create_project(&app, &key, "Cascade").await;

    let (_, first) = generate_text(&app, &key, &project, "Orders").await;
    let (_, second) = generate_text(&app, &key, &project, "Login").await;
    let first_batch = first["batch_id"].as_str().unwrap();

    let (_, batches) = get(&app, &key, &format!("/api/v1/projects/{}/batches", project)).await;
    let listed = batches["batches"].as_array().unwrap();
    assert_eq!(listed.len(), 2);
    assert_eq!(listed[0]["id"], second["batch_id"]);

    let (status, _) = delete(
        &app,
        &key,
        &format!("/api/v1/projects/{}/batches/{}", project, first_batch),
    )
    .await;
    assert_eq!(status, 204);

    let (_, list) = get(&app, &key, &format!("/api/v1/projects/{}/test-cases", project)).await;
    assert_eq!(list["total"], 3);
    assert!(
        list["test_cases"]
            .as_array()
            .unwrap()
            .iter()
            .all(|c| c["batch_id"] == second["batch_id"])
    );

    let (status, _) = get(
        &app,
        &key,
        &format!("/api/v1/projects/{}/batches/{}", project, first_batch),
    )
    .await;
    assert_eq!(status, 404);
}

/// Long generated fields and source labels are stored as given.
#[actix_rt::test]
async fn test_long_fields_persist_verbatim() {
    let pool = create_test_pool().await;
    let generator = ScriptedGenerator::new();
    let summary = "Checkout keeps the basket intact. ".repeat(60);
    let priority = format!("High, because {}", "payment flows are revenue critical ".repeat(5));
    let case_ref = "TC-".repeat(100);
    let raw = json!([{
        "test_case_id": case_ref,
        "scenario": "Checkout ".repeat(80),
        "test_case_summary": summary,
        "test_steps": ["Open cart", null, "Pay"],
        "priority": priority,
        "severity": "Critical, blocks every purchase for all customers in every region",
    }])
    .to_string();
    generator.push(&raw);
    let app = create_test_app(&pool, generator).await;
    let key = create_principal(&pool, "qa").await;
    let project = create_project(&app, &key, "Long").await;

    let file_name = format!("{}.pdf", "requirements-".repeat(50));
    let (status, body) = post(
        &app,
        &key,
        &format!("/api/v1/projects/{}/generations/document", project),
        json!({ "file_name": file_name, "extracted_text": "Checkout rules." }),
    )
    .await;
    assert_eq!(status, 201, "{}", body);
    assert_eq!(body["source"], format!("File: {}", file_name));

    let id = body["records"][0]["id"].as_str().unwrap();
    let (status, case) = get(
        &app,
        &key,
        &format!("/api/v1/projects/{}/test-cases/{}", project, id),
    )
    .await;
    assert_eq!(status, 200);
    assert_eq!(case["summary"], summary.as_str());
    assert_eq!(case["priority"], priority.as_str());
    assert_eq!(case["case_ref"], case_ref.as_str());
    assert_eq!(case["steps"], json!(["Open cart", null, "Pay"]));
}
