//! Analysis endpoints: normalized payloads, persisted fallbacks and validation.

use super::test_helpers::*;
use serde_json::json;

#[actix_rt::test]
async fn test_defect_triage_normalizes_aliases() {
    let pool = create_test_pool().await;
    let generator = ScriptedGenerator::new();
    generator.push(
        "```json\n{\"potential_root_cause\": \"Null session\", \"suggested_severity\": \"High\", \
         \"justification\": \"Blocks login\", \"defect_summary_draft\": \"Login crashes\"}\n```",
    );
    let app = create_test_app(&pool, generator.clone()).await;
    let key = create_principal(&pool, "qa").await;
    let project = create_project(&app, &key, "Defects").await;

    let (status, body) = post(
        &app,
        &key,
        &format!("/api/v1/projects/{}/analyses/defect", project),
        json!({
            "failed_test": "TC-7 Login",
            "error_logs": "NullPointerException at Session.get",
            "steps_reproduced": "Open app; log in"
        }),
    )
    .await;

    assert_eq!(status, 201, "{}", body);
    assert_eq!(body["kind"], "defect_triage");
    assert_eq!(body["source"], "Defect: TC-7 Login");
    assert_eq!(body["payload"]["root_cause"], "Null session");
    assert_eq!(body["payload"]["severity"], "High");
    assert_eq!(body["payload"]["severity_justification"], "Blocks login");
    assert_eq!(body["payload"]["summary"], "Login crashes");
    assert!(body["raw_text"].is_null());
    assert!(generator.last_prompt_text().contains("NullPointerException"));

    let id = body["id"].as_str().unwrap();
    let (status, fetched) = get(
        &app,
        &key,
        &format!("/api/v1/projects/{}/analyses/{}", project, id),
    )
    .await;
    assert_eq!(status, 200);
    assert_eq!(fetched["payload"], body["payload"]);
}

/// Output that is not a recognizable object is still stored, as raw text.
#[actix_rt::test]
async fn test_unrecognized_analysis_is_persisted_as_fallback() {
    let pool = create_test_pool().await;
    let generator = ScriptedGenerator::new();
    generator.push("Recommendation: Yes, automate it.");
    generator.push(r#"{"verdict": "maybe"}"#);
    let app = create_test_app(&pool, generator).await;
    let key = create_principal(&pool, "qa").await;
    let project = create_project(&app, &key, "Automation").await;
    let uri = format!("/api/v1/projects/{}/analyses/automation", project);
    let request = json!({
        "test_case_description": "Checkout with saved card",
        "execution_frequency": "Daily",
        "stability": "Stable",
        "manual_time_mins": "15"
    });

    let (status, body) = post(&app, &key, &uri, request.clone()).await;
    assert_eq!(status, 201, "{}", body);
    assert!(body["payload"].is_null());
    assert_eq!(body["raw_text"], "Recommendation: Yes, automate it.");
    assert!(body["warning"].is_string());

    let (status, body) = post(&app, &key, &uri, request).await;
    assert_eq!(status, 201);
    assert_eq!(body["raw_text"], r#"{"verdict": "maybe"}"#);

    let (_, listed) = get(
        &app,
        &key,
        &format!("/api/v1/projects/{}/analyses?kind=automation_candidate", project),
    )
    .await;
    assert_eq!(listed["analyses"].as_array().unwrap().len(), 2);

    let (_, stats) = get(&app, &key, &format!("/api/v1/projects/{}/stats", project)).await;
    assert_eq!(stats["analysis_count"], 2);
}

#[actix_rt::test]
async fn test_automation_rejects_invalid_manual_time() {
    let pool = create_test_pool().await;
    let generator = ScriptedGenerator::new();
    let app = create_test_app(&pool, generator.clone()).await;
    let key = create_principal(&pool, "qa").await;
    let project = create_project(&app, &key, "Automation").await;

    for minutes in [json!(0), json!(-5), json!("ten"), json!(null)] {
        let (status, body) = post(
            &app,
            &key,
            &format!("/api/v1/projects/{}/analyses/automation", project),
            json!({
                "test_case_description": "Checkout",
                "execution_frequency": "Weekly",
                "stability": "Stable",
                "manual_time_mins": minutes
            }),
        )
        .await;
        assert_eq!(status, 400, "{}", body);
        assert!(body["message"].as_str().unwrap().contains("manual_time_mins"));
    }
    assert_eq!(generator.calls(), 0);
}

#[actix_rt::test]
async fn test_impact_and_sentinel() {
    let pool = create_test_pool().await;
    let generator = ScriptedGenerator::new();
    generator.push(r#"Result: {"likelihood": "Low", "reasoning": "Unrelated module"}"#);
    generator.push("Error: Failed to generate content due to: timeout");
    let app = create_test_app(&pool, generator).await;
    let key = create_principal(&pool, "qa").await;
    let project = create_project(&app, &key, "Impact").await;
    let uri = format!("/api/v1/projects/{}/analyses/impact", project);
    let request = json!({
        "code_change_description": "Rename CSS classes in footer",
        "test_case_description": "User can reset password"
    });

    // Leading prose without a fence is not valid JSON.
    let (status, body) = post(&app, &key, &uri, request.clone()).await;
    assert_eq!(status, 201);
    assert!(body["warning"].is_string());

    let (status, body) = post(&app, &key, &uri, request).await;
    assert_eq!(status, 502);
    assert_eq!(
        body["message"],
        "Error: Failed to generate content due to: timeout"
    );

    let (_, listed) = get(&app, &key, &format!("/api/v1/projects/{}/analyses", project)).await;
    assert_eq!(listed["analyses"].as_array().unwrap().len(), 1);
}

#[actix_rt::test]
async fn test_defect_requires_logs() {
    let pool = create_test_pool().await;
    let app = create_test_app(&pool, ScriptedGenerator::new()).await;
    let key = create_principal(&pool, "qa").await;
    let project = create_project(&app, &key, "Defects").await;

    let (status, _) = post(
        &app,
        &key,
        &format!("/api/v1/projects/{}/analyses/defect", project),
        json!({ "failed_test": "TC-1", "error_logs": "" }),
    )
    .await;
    assert_eq!(status, 400);
}

#[actix_rt::test]
async fn test_long_failed_test_name_is_kept_in_source() {
    let pool = create_test_pool().await;
    let generator = ScriptedGenerator::new();
    generator.push(r#"{"root_cause": "Race in session refresh", "severity": "High"}"#);
    let app = create_test_app(&pool, generator).await;
    let key = create_principal(&pool, "qa").await;
    let project = create_project(&app, &key, "Defects").await;

    let failed_test = "checkout > payment > retries the card after a timeout ".repeat(15);
    let (status, body) = post(
        &app,
        &key,
        &format!("/api/v1/projects/{}/analyses/defect", project),
        json!({ "failed_test": failed_test, "error_logs": "TimeoutError after 30s" }),
    )
    .await;

    assert_eq!(status, 201, "{}", body);
    assert_eq!(body["source"], format!("Defect: {}", failed_test.trim()));
    assert_eq!(body["payload"]["root_cause"], "Race in session refresh");
}
