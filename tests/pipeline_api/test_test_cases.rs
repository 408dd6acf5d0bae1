//! Manual test case CRUD and batch bookkeeping on child deletion.

use super::test_helpers::*;
use casegen_lib::entity::generation_batch;
use casegen_lib::models::NormalizedTestCase;
use sea_orm::{ActiveModelTrait, EntityTrait, Set};
use serde_json::json;

#[actix_rt::test]
async fn test_manual_test_case_crud() {
    let pool = create_test_pool().await;
    let app = create_test_app(&pool, ScriptedGenerator::new()).await;
    let key = create_principal(&pool, "qa").await;
    let project = create_project(&app, &key, "Manual").await;
    let base = format!("/api/v1/projects/{}/test-cases", project);

    let (status, created) = post(
        &app,
        &key,
        &base,
        json!({
            "source_key": "JIRA-42",
            "summary": "Reset password",
            "steps": ["Open profile", "Click reset"],
            "example_data": "user@example.com",
            "severity": "Medium"
        }),
    )
    .await;
    assert_eq!(status, 201, "{}", created);
    assert!(created["batch_id"].is_null());
    assert_eq!(created["source_key"], "JIRA-42");
    assert_eq!(created["example_data"]["kind"], "text");
    let id = created["id"].as_str().unwrap();
    let item = format!("{}/{}", base, id);

    let (status, fetched) = get(&app, &key, &item).await;
    assert_eq!(status, 200);
    assert_eq!(fetched["summary"], "Reset password");

    let (status, updated) = put(
        &app,
        &key,
        &item,
        json!({ "severity": "High", "expected_result": "Email sent" }),
    )
    .await;
    assert_eq!(status, 200, "{}", updated);
    assert_eq!(updated["severity"], "High");
    assert_eq!(updated["expected_result"], "Email sent");
    assert_eq!(updated["summary"], "Reset password");

    let (status, _) = put(&app, &key, &item, json!({})).await;
    assert_eq!(status, 400);

    let (status, _) = delete(&app, &key, &item).await;
    assert_eq!(status, 204);
    let (status, _) = get(&app, &key, &item).await;
    assert_eq!(status, 404);
}

#[actix_rt::test]
async fn test_create_requires_summary() {
    let pool = create_test_pool().await;
    let app = create_test_app(&pool, ScriptedGenerator::new()).await;
    let key = create_principal(&pool, "qa").await;
    let project = create_project(&app, &key, "Manual").await;

    let (status, body) = post(
        &app,
        &key,
        &format!("/api/v1/projects/{}/test-cases", project),
        json!({ "summary": "  " }),
    )
    .await;
    assert_eq!(status, 400);
    assert_eq!(body["error"], "INVALID_INPUT");
}

/// Removing a batch child keeps the batch's list and count in step.
#[actix_rt::test]
async fn test_deleting_child_updates_batch() {
    let pool = create_test_pool().await;
    let generator = ScriptedGenerator::new();
    generator.push(FLAT_RAW);
    let app = create_test_app(&pool, generator).await;
    let key = create_principal(&pool, "qa").await;
    let project = create_project(&app, &key, "Children").await;

    let (_, generated) = generate_text(&app, &key, &project, "Orders").await;
    let batch_id = generated["batch_id"].as_str().unwrap();
    let first = generated["records"][0]["id"].as_str().unwrap();
    let second = generated["records"][1]["id"].as_str().unwrap();
    let batch_uri = format!("/api/v1/projects/{}/batches/{}", project, batch_id);

    let (status, _) = delete(
        &app,
        &key,
        &format!("/api/v1/projects/{}/test-cases/{}", project, first),
    )
    .await;
    assert_eq!(status, 204);

    let (_, batch) = get(&app, &key, &batch_uri).await;
    assert_eq!(batch["test_case_count"], 1);
    assert_eq!(batch["test_case_ids"], json!([second]));
    assert_eq!(batch["test_cases"].as_array().unwrap().len(), 1);

    // The last child takes the batch with it.
    delete(
        &app,
        &key,
        &format!("/api/v1/projects/{}/test-cases/{}", project, second),
    )
    .await;
    let (status, _) = get(&app, &key, &batch_uri).await;
    assert_eq!(status, 404);
}

#[actix_rt::test]
async fn test_list_filters_and_pagination() {
    let pool = create_test_pool().await;
    let generator = ScriptedGenerator::new();
    generator.push(FLAT_RAW);
    generator.push(GROUPED_RAW);
    let app = create_test_app(&pool, generator).await;
    let key = create_principal(&pool, "qa").await;
    let project = create_project(&app, &key, "Listing").await;

    let (_, flat) = generate_text(&app, &key, &project, "Orders").await;
    generate_text(&app, &key, &project, "Login").await;
    let base = format!("/api/v1/projects/{}/test-cases", project);

    let (_, all) = get(&app, &key, &base).await;
    assert_eq!(all["total"], 5);
    assert_eq!(all["limit"], 20);

    let (_, page) = get(&app, &key, &format!("{}?limit=2&offset=1", base)).await;
    assert_eq!(page["total"], 5);
    assert_eq!(page["test_cases"].as_array().unwrap().len(), 2);
    assert_eq!(page["offset"], 1);

    let (_, high) = get(&app, &key, &format!("{}?severity=High", base)).await;
    assert_eq!(high["total"], 2);

    let (_, by_batch) = get(
        &app,
        &key,
        &format!("{}?batch_id={}", base, flat["batch_id"].as_str().unwrap()),
    )
    .await;
    assert_eq!(by_batch["total"], 2);

    let (_, clamped) = get(&app, &key, &format!("{}?limit=1000", base)).await;
    assert_eq!(clamped["limit"], 100);
}

async fn seed_batch(pool: &casegen_lib::db::DbPool, project: &str, size: usize) -> (uuid::Uuid, Vec<uuid::Uuid>) {
    let records: Vec<NormalizedTestCase> = (0..size)
        .map(|i| NormalizedTestCase {
            summary: Some(format!("Case {}", i)),
            ..Default::default()
        })
        .collect();
    let (batch, children) = pool
        .insert_generation_batch(project.parse().unwrap(), "Text Input", &records)
        .await
        .unwrap()
        .unwrap();
    (batch.id, children.into_iter().map(|c| c.id).collect())
}

async fn overwrite_child_list(pool: &casegen_lib::db::DbPool, batch_id: uuid::Uuid, list: serde_json::Value) {
    let batch = generation_batch::Entity::find_by_id(batch_id)
        .one(pool.connection())
        .await
        .unwrap()
        .unwrap();
    let mut active: generation_batch::ActiveModel = batch.into();
    active.test_case_ids = Set(list);
    active.update(pool.connection()).await.unwrap();
}

/// Sibling deletes issued together leave the batch consistent with its rows.
#[actix_rt::test]
async fn test_sibling_deletes_keep_batch_count_consistent() {
    let pool = create_test_pool().await;
    let app = create_test_app(&pool, ScriptedGenerator::new()).await;
    let key = create_principal(&pool, "qa").await;
    let project = create_project(&app, &key, "Siblings").await;
    let project_id: uuid::Uuid = project.parse().unwrap();

    let (batch_id, ids) = seed_batch(&pool, &project, 3).await;

    let (first, second) = futures_util::future::join(
        pool.delete_test_case(project_id, ids[0]),
        pool.delete_test_case(project_id, ids[1]),
    )
    .await;
    assert!(first.unwrap());
    assert!(second.unwrap());

    let (status, batch) = get(
        &app,
        &key,
        &format!("/api/v1/projects/{}/batches/{}", project, batch_id),
    )
    .await;
    assert_eq!(status, 200);
    assert_eq!(batch["test_case_count"], 1);
    assert_eq!(batch["test_case_ids"], json!([ids[2].to_string()]));
    assert_eq!(batch["test_cases"].as_array().unwrap().len(), 1);
}

/// The child list is rebuilt from the rows still in the batch, in generation order.
#[actix_rt::test]
async fn test_child_delete_rebuilds_list_from_rows() {
    let pool = create_test_pool().await;
    let app = create_test_app(&pool, ScriptedGenerator::new()).await;
    let key = create_principal(&pool, "qa").await;
    let project = create_project(&app, &key, "Rebuild").await;

    let (batch_id, ids) = seed_batch(&pool, &project, 3).await;
    // Stale list: reordered and mentioning a row that never existed.
    overwrite_child_list(
        &pool,
        batch_id,
        json!([ids[2], uuid::Uuid::now_v7(), ids[1], ids[0]]),
    )
    .await;

    let (status, _) = delete(
        &app,
        &key,
        &format!("/api/v1/projects/{}/test-cases/{}", project, ids[1]),
    )
    .await;
    assert_eq!(status, 204);

    let (_, batch) = get(
        &app,
        &key,
        &format!("/api/v1/projects/{}/batches/{}", project, batch_id),
    )
    .await;
    assert_eq!(batch["test_case_count"], 2);
    assert_eq!(
        batch["test_case_ids"],
        json!([ids[0].to_string(), ids[2].to_string()])
    );
}

/// An undecodable stored child list is an error, never an empty batch.
#[actix_rt::test]
async fn test_corrupt_child_list_does_not_orphan_siblings() {
    let pool = create_test_pool().await;
    let app = create_test_app(&pool, ScriptedGenerator::new()).await;
    let key = create_principal(&pool, "qa").await;
    let project = create_project(&app, &key, "Corrupt").await;
    let batch_uri_of = |batch_id: uuid::Uuid| format!("/api/v1/projects/{}/batches/{}", project, batch_id);

    let (batch_id, ids) = seed_batch(&pool, &project, 3).await;
    overwrite_child_list(&pool, batch_id, json!("not-a-list")).await;

    let (status, body) = get(&app, &key, &batch_uri_of(batch_id)).await;
    assert_eq!(status, 500);
    assert_eq!(body["error"], "DATABASE_ERROR");

    let (status, _) = delete(
        &app,
        &key,
        &format!("/api/v1/projects/{}/test-cases/{}", project, ids[0]),
    )
    .await;
    assert_eq!(status, 204);

    // Batch survives with the siblings still attached.
    let (status, batch) = get(&app, &key, &batch_uri_of(batch_id)).await;
    assert_eq!(status, 200);
    assert_eq!(batch["test_case_count"], 2);
    for sibling in &ids[1..] {
        let (_, case) = get(
            &app,
            &key,
            &format!("/api/v1/projects/{}/test-cases/{}", project, sibling),
        )
        .await;
        assert_eq!(case["batch_id"], batch_id.to_string());
    }
}
