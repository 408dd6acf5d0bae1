//! Project ownership, statistics and cascading deletes.

use super::test_helpers::*;
use serde_json::json;

#[actix_rt::test]
async fn test_projects_are_private_to_their_owner() {
    let pool = create_test_pool().await;
    let generator = ScriptedGenerator::new();
    let app = create_test_app(&pool, generator.clone()).await;
    let owner = create_principal(&pool, "owner").await;
    let other = create_principal(&pool, "other").await;
    let project = create_project(&app, &owner, "Private").await;

    let (status, body) = get(&app, &other, &format!("/api/v1/projects/{}", project)).await;
    assert_eq!(status, 403);
    assert_eq!(body["error"], "FORBIDDEN");

    let (status, _) = generate_text(&app, &other, &project, "Sneaky").await;
    assert_eq!(status, 403);
    assert_eq!(generator.calls(), 0);

    let (status, _) = delete(&app, &other, &format!("/api/v1/projects/{}", project)).await;
    assert_eq!(status, 403);

    let (_, listed) = get(&app, &other, "/api/v1/projects").await;
    assert_eq!(listed["projects"], json!([]));

    let (_, listed) = get(&app, &owner, "/api/v1/projects").await;
    assert_eq!(listed["projects"][0]["id"], project.as_str());
}

#[actix_rt::test]
async fn test_unknown_project_is_not_found() {
    let pool = create_test_pool().await;
    let app = create_test_app(&pool, ScriptedGenerator::new()).await;
    let key = create_principal(&pool, "qa").await;

    let (status, body) = get(
        &app,
        &key,
        "/api/v1/projects/0190a4b2-0000-7000-8000-000000000000",
    )
    .await;
    assert_eq!(status, 404);
    assert_eq!(body["error"], "NOT_FOUND");
}

#[actix_rt::test]
async fn test_project_name_validation() {
    let pool = create_test_pool().await;
    let app = create_test_app(&pool, ScriptedGenerator::new()).await;
    let key = create_principal(&pool, "qa").await;

    let (status, _) = post(&app, &key, "/api/v1/projects", json!({ "name": " " })).await;
    assert_eq!(status, 400);

    let (status, _) = post(
        &app,
        &key,
        "/api/v1/projects",
        json!({ "name": "x".repeat(201) }),
    )
    .await;
    assert_eq!(status, 400);
}

#[actix_rt::test]
async fn test_stats_aggregate_severity_and_batches() {
    let pool = create_test_pool().await;
    let generator = ScriptedGenerator::new();
    generator.push(FLAT_RAW);
    generator.push(GROUPED_RAW);
    let app = create_test_app(&pool, generator).await;
    let key = create_principal(&pool, "qa").await;
    let project = create_project(&app, &key, "Stats").await;

    generate_text(&app, &key, &project, "Orders").await;
    generate_text(&app, &key, &project, "Login").await;
    post(
        &app,
        &key,
        &format!("/api/v1/projects/{}/test-cases", project),
        json!({ "summary": "No severity given" }),
    )
    .await;

    let (status, stats) = get(&app, &key, &format!("/api/v1/projects/{}/stats", project)).await;
    assert_eq!(status, 200, "{}", stats);
    assert_eq!(stats["test_case_count"], 6);
    assert_eq!(stats["batch_count"], 2);
    assert_eq!(stats["analysis_count"], 0);
    assert_eq!(stats["recent_batches"].as_array().unwrap().len(), 2);

    let severities = stats["severity_counts"].as_array().unwrap();
    let count_of = |name: &str| {
        severities
            .iter()
            .find(|s| s["severity"] == name)
            .map(|s| s["count"].as_i64().unwrap())
    };
    assert_eq!(severities[0]["severity"], "High");
    assert_eq!(count_of("High"), Some(2));
    assert_eq!(count_of("Critical"), Some(1));
    assert_eq!(count_of("Medium"), Some(1));
    assert_eq!(count_of("Low"), Some(1));
    assert_eq!(count_of("Unspecified"), Some(1));
}

#[actix_rt::test]
async fn test_delete_project_removes_everything() {
    let pool = create_test_pool().await;
    let generator = ScriptedGenerator::new();
    generator.push(GROUPED_RAW);
    generator.push(r#"{"likelihood": "High", "reasoning": "Touches login"}"#);
    let app = create_test_app(&pool, generator).await;
    let key = create_principal(&pool, "qa").await;
    let project = create_project(&app, &key, "Doomed").await;

    generate_text(&app, &key, &project, "Login").await;
    post(
        &app,
        &key,
        &format!("/api/v1/projects/{}/analyses/impact", project),
        json!({
            "code_change_description": "Refactor session handling",
            "test_case_description": "Login keeps the session"
        }),
    )
    .await;

    let (status, _) = delete(&app, &key, &format!("/api/v1/projects/{}", project)).await;
    assert_eq!(status, 204);

    let (status, _) = get(&app, &key, &format!("/api/v1/projects/{}", project)).await;
    assert_eq!(status, 404);
    assert_eq!(pool.count_test_cases(project.parse().unwrap()).await.unwrap(), 0);
    assert_eq!(pool.count_batches(project.parse().unwrap()).await.unwrap(), 0);
    assert_eq!(pool.count_analyses(project.parse().unwrap()).await.unwrap(), 0);
}
