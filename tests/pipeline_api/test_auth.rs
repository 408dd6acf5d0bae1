//! API key and admin key authentication.

use super::test_helpers::*;
use actix_web::test;
use serde_json::json;

#[actix_rt::test]
async fn test_missing_and_invalid_keys_are_rejected() {
    let pool = create_test_pool().await;
    let app = create_test_app(&pool, ScriptedGenerator::new()).await;

    let (status, body) = send(&app, test::TestRequest::get().uri("/api/v1/projects")).await;
    assert_eq!(status, 401);
    assert_eq!(body["error"], "UNAUTHORIZED");

    let (status, _) = get(&app, "cg_not-a-real-key", "/api/v1/projects").await;
    assert_eq!(status, 401);
}

#[actix_rt::test]
async fn test_admin_key_lifecycle() {
    let pool = create_test_pool().await;
    let app = create_test_app(&pool, ScriptedGenerator::new()).await;

    let (status, _) = send(
        &app,
        test::TestRequest::post()
            .uri("/api/v1/auth/keys")
            .insert_header(("X-Admin-Key", "wrong"))
            .set_json(json!({ "name": "CI" })),
    )
    .await;
    assert_eq!(status, 401);

    let (status, created) = send(
        &app,
        test::TestRequest::post()
            .uri("/api/v1/auth/keys")
            .insert_header(("X-Admin-Key", TEST_ADMIN_KEY))
            .set_json(json!({ "name": "CI", "expires_in": "30d" })),
    )
    .await;
    assert_eq!(status, 201, "{}", created);
    let key = created["key"].as_str().unwrap().to_string();
    let id = created["id"].as_str().unwrap().to_string();

    let (status, _) = get(&app, &key, "/api/v1/projects").await;
    assert_eq!(status, 200);

    let (status, listed) = send(
        &app,
        test::TestRequest::get()
            .uri("/api/v1/auth/keys")
            .insert_header(("X-Admin-Key", TEST_ADMIN_KEY)),
    )
    .await;
    assert_eq!(status, 200);
    assert_eq!(listed["keys"][0]["name"], "CI");
    assert!(listed["keys"][0].get("key_hash").is_none());

    let (status, _) = send(
        &app,
        test::TestRequest::delete()
            .uri(&format!("/api/v1/auth/keys/{}", id))
            .insert_header(("X-Admin-Key", TEST_ADMIN_KEY)),
    )
    .await;
    assert_eq!(status, 200);

    let (status, body) = get(&app, &key, "/api/v1/projects").await;
    assert_eq!(status, 401);
    assert!(body["message"].as_str().unwrap().contains("revoked"));
}

#[actix_rt::test]
async fn test_health_is_public() {
    let pool = create_test_pool().await;
    let app = create_test_app(&pool, ScriptedGenerator::new()).await;

    let (status, body) = send(&app, test::TestRequest::get().uri("/api/v1/health")).await;
    assert_eq!(status, 200);
    assert_eq!(body["status"], "healthy");

    let (status, body) = send(&app, test::TestRequest::get().uri("/api/v1/ready")).await;
    assert_eq!(status, 200);
    assert_eq!(body["database"], "connected");
}
