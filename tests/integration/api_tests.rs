//! API integration tests
//!
//! These tests require a running server on localhost:8080 with a seeded
//! technician account (admin@lablend.local / admin123).
//! Run with: cargo test -- --ignored

use reqwest::Client;
use serde_json::{json, Value};

const BASE_URL: &str = "http://localhost:8080/api/v1";

/// Helper to get an authenticated token for the seeded technician
async fn get_auth_token(client: &Client) -> String {
    let response = client
        .post(format!("{}/auth/login", BASE_URL))
        .json(&json!({
            "email": "admin@lablend.local",
            "password": "admin123"
        }))
        .send()
        .await
        .expect("Failed to send login request");

    let body: Value = response.json().await.expect("Failed to parse login response");
    body["data"]["token"]
        .as_str()
        .expect("No token in response")
        .to_string()
}

/// Create a student user and return its id
async fn create_student(client: &Client, token: &str, tag: &str) -> i64 {
    let response = client
        .post(format!("{}/users", BASE_URL))
        .header("Authorization", format!("Bearer {}", token))
        .json(&json!({
            "name": format!("Test Student {}", tag),
            "email": format!("student-{}@lablend.local", tag),
            "registrationNumber": format!("REG-{}", tag),
            "userType": "student",
            "password": "student123"
        }))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 201);
    let body: Value = response.json().await.expect("Failed to parse response");
    body["data"]["id"].as_i64().expect("No user ID")
}

/// Create a material and return its id
async fn create_material(client: &Client, token: &str, tag: &str, total: i64, available: i64) -> i64 {
    let response = client
        .post(format!("{}/materials", BASE_URL))
        .header("Authorization", format!("Bearer {}", token))
        .json(&json!({
            "internalCode": format!("MAT-{}", tag),
            "title": format!("Test Material {}", tag),
            "thematicArea": "Electronics",
            "materialType": "equipment",
            "quantityTotal": total,
            "quantityAvailable": available,
            "conditionStatus": "good"
        }))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 201);
    let body: Value = response.json().await.expect("Failed to parse response");
    body["data"]["id"].as_i64().expect("No material ID")
}

fn unique_tag(prefix: &str) -> String {
    format!(
        "{}-{}",
        prefix,
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap()
            .as_millis()
    )
}

#[tokio::test]
#[ignore]
async fn test_health_check() {
    let client = Client::new();

    let response = client
        .get(format!("{}/health", BASE_URL))
        .send()
        .await
        .expect("Failed to send request");

    assert!(response.status().is_success());

    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["status"], "healthy");
}

#[tokio::test]
#[ignore]
async fn test_login() {
    let client = Client::new();

    let response = client
        .post(format!("{}/auth/login", BASE_URL))
        .json(&json!({
            "email": "admin@lablend.local",
            "password": "admin123"
        }))
        .send()
        .await
        .expect("Failed to send request");

    assert!(response.status().is_success());

    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["success"], true);
    assert!(body["data"]["token"].is_string());
    assert!(body["data"]["refreshToken"].is_string());
    assert!(body["data"]["user"]["password"].is_null());
}

#[tokio::test]
#[ignore]
async fn test_login_invalid_credentials() {
    let client = Client::new();

    let response = client
        .post(format!("{}/auth/login", BASE_URL))
        .json(&json!({
            "email": "admin@lablend.local",
            "password": "wrong"
        }))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 401);

    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["success"], false);
}

#[tokio::test]
#[ignore]
async fn test_refresh_token() {
    let client = Client::new();

    let login: Value = client
        .post(format!("{}/auth/login", BASE_URL))
        .json(&json!({
            "email": "admin@lablend.local",
            "password": "admin123"
        }))
        .send()
        .await
        .expect("Failed to send request")
        .json()
        .await
        .expect("Failed to parse response");

    let response = client
        .post(format!("{}/auth/refresh", BASE_URL))
        .json(&json!({ "refreshToken": login["data"]["refreshToken"] }))
        .send()
        .await
        .expect("Failed to send request");

    assert!(response.status().is_success());

    let body: Value = response.json().await.expect("Failed to parse response");
    assert!(body["data"]["token"].is_string());
}

#[tokio::test]
#[ignore]
async fn test_requests_without_token_are_rejected() {
    let client = Client::new();

    let response = client
        .get(format!("{}/users", BASE_URL))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 401);
}

#[tokio::test]
#[ignore]
async fn test_list_users_pagination_envelope() {
    let client = Client::new();
    let token = get_auth_token(&client).await;

    let response = client
        .get(format!("{}/users?page=1&limit=5", BASE_URL))
        .header("Authorization", format!("Bearer {}", token))
        .send()
        .await
        .expect("Failed to send request");

    assert!(response.status().is_success());

    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["success"], true);
    assert!(body["data"].is_array());
    assert_eq!(body["pagination"]["page"], 1);
    assert_eq!(body["pagination"]["limit"], 5);
    assert!(body["pagination"]["total"].is_number());
    assert!(body["pagination"]["totalPages"].is_number());
}

#[tokio::test]
#[ignore]
async fn test_material_quantities_must_be_consistent() {
    let client = Client::new();
    let token = get_auth_token(&client).await;
    let tag = unique_tag("badqty");

    let response = client
        .post(format!("{}/materials", BASE_URL))
        .header("Authorization", format!("Bearer {}", token))
        .json(&json!({
            "internalCode": format!("MAT-{}", tag),
            "title": "Inconsistent",
            "thematicArea": "Physics",
            "materialType": "book",
            "quantityTotal": 1,
            "quantityAvailable": 2,
            "conditionStatus": "new"
        }))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 400);
}

#[tokio::test]
#[ignore]
async fn test_loan_lifecycle() {
    let client = Client::new();
    let token = get_auth_token(&client).await;
    let tag = unique_tag("loan");

    let user_id = create_student(&client, &token, &tag).await;
    let material_id = create_material(&client, &token, &tag, 2, 2).await;

    // Check out
    let response = client
        .post(format!("{}/loans", BASE_URL))
        .header("Authorization", format!("Bearer {}", token))
        .json(&json!({
            "userId": user_id,
            "materialId": material_id,
            "dueDate": "2099-01-01T00:00:00Z"
        }))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 201);
    let body: Value = response.json().await.expect("Failed to parse response");
    let loan_id = body["data"]["id"].as_i64().expect("No loan ID");
    assert_eq!(body["data"]["status"], "active");
    assert_eq!(body["data"]["user"]["id"], user_id);
    assert_eq!(body["data"]["material"]["id"], material_id);

    // Availability dropped by one
    let material: Value = client
        .get(format!("{}/materials/{}", BASE_URL, material_id))
        .header("Authorization", format!("Bearer {}", token))
        .send()
        .await
        .expect("Failed to send request")
        .json()
        .await
        .expect("Failed to parse response");
    assert_eq!(material["data"]["quantityAvailable"], 1);

    // A second loan of the same material to the same user is rejected
    let response = client
        .post(format!("{}/loans", BASE_URL))
        .header("Authorization", format!("Bearer {}", token))
        .json(&json!({
            "userId": user_id,
            "materialId": material_id,
            "dueDate": "2099-01-01T00:00:00Z"
        }))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 400);

    // Return
    let response = client
        .post(format!("{}/loans/{}/return", BASE_URL, loan_id))
        .header("Authorization", format!("Bearer {}", token))
        .json(&json!({ "returnCondition": "good" }))
        .send()
        .await
        .expect("Failed to send request");

    assert!(response.status().is_success());
    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["data"]["status"], "returned");
    assert!(body["data"]["returnDate"].is_string());

    // Availability restored
    let material: Value = client
        .get(format!("{}/materials/{}", BASE_URL, material_id))
        .header("Authorization", format!("Bearer {}", token))
        .send()
        .await
        .expect("Failed to send request")
        .json()
        .await
        .expect("Failed to parse response");
    assert_eq!(material["data"]["quantityAvailable"], 2);

    // Returning twice is rejected
    let response = client
        .post(format!("{}/loans/{}/return", BASE_URL, loan_id))
        .header("Authorization", format!("Bearer {}", token))
        .json(&json!({}))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 400);
}

#[tokio::test]
#[ignore]
async fn test_loan_fails_when_out_of_stock() {
    let client = Client::new();
    let token = get_auth_token(&client).await;
    let tag = unique_tag("stock");

    let user_id = create_student(&client, &token, &tag).await;
    let material_id = create_material(&client, &token, &tag, 1, 0).await;

    let response = client
        .post(format!("{}/loans", BASE_URL))
        .header("Authorization", format!("Bearer {}", token))
        .json(&json!({
            "userId": user_id,
            "materialId": material_id,
            "dueDate": "2099-01-01T00:00:00Z"
        }))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 400);
}

#[tokio::test]
#[ignore]
async fn test_overdue_sweep_is_idempotent() {
    let client = Client::new();
    let token = get_auth_token(&client).await;

    let first: Value = client
        .post(format!("{}/loans/process-overdue", BASE_URL))
        .header("Authorization", format!("Bearer {}", token))
        .send()
        .await
        .expect("Failed to send request")
        .json()
        .await
        .expect("Failed to parse response");
    assert_eq!(first["success"], true);

    // Everything caught by the first sweep is no longer active, so an
    // immediate second sweep finds nothing
    let second: Value = client
        .post(format!("{}/loans/process-overdue", BASE_URL))
        .header("Authorization", format!("Bearer {}", token))
        .send()
        .await
        .expect("Failed to send request")
        .json()
        .await
        .expect("Failed to parse response");
    assert_eq!(second["data"].as_array().expect("data not array").len(), 0);
}

#[tokio::test]
#[ignore]
async fn test_late_return_produces_single_fine() {
    let client = Client::new();
    let token = get_auth_token(&client).await;
    let tag = unique_tag("late");

    let user_id = create_student(&client, &token, &tag).await;
    let material_id = create_material(&client, &token, &tag, 1, 1).await;

    // A loan that is due in the past is valid input and starts out active
    let response = client
        .post(format!("{}/loans", BASE_URL))
        .header("Authorization", format!("Bearer {}", token))
        .json(&json!({
            "userId": user_id,
            "materialId": material_id,
            "dueDate": "2020-01-01T00:00:00Z"
        }))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 201);
    let body: Value = response.json().await.expect("Failed to parse response");
    let loan_id = body["data"]["id"].as_i64().expect("No loan ID");
    assert_eq!(body["data"]["status"], "active");

    // First sweep marks it overdue and fines the borrower
    let swept: Value = client
        .post(format!("{}/loans/process-overdue", BASE_URL))
        .header("Authorization", format!("Bearer {}", token))
        .send()
        .await
        .expect("Failed to send request")
        .json()
        .await
        .expect("Failed to parse response");
    assert!(swept["data"]
        .as_array()
        .expect("data not array")
        .iter()
        .any(|loan| loan["id"] == loan_id));

    // Second sweep must not fine the same loan again
    client
        .post(format!("{}/loans/process-overdue", BASE_URL))
        .header("Authorization", format!("Bearer {}", token))
        .send()
        .await
        .expect("Failed to send request");

    let fines: Value = client
        .get(format!("{}/fines?loanId={}", BASE_URL, loan_id))
        .header("Authorization", format!("Bearer {}", token))
        .send()
        .await
        .expect("Failed to send request")
        .json()
        .await
        .expect("Failed to parse response");
    assert_eq!(fines["pagination"]["total"], 1);
    assert_eq!(fines["data"][0]["reason"], "late_return");
    assert_eq!(fines["data"][0]["isActive"], true);

    // The overdue loan can still be returned, without a second fine
    let response = client
        .post(format!("{}/loans/{}/return", BASE_URL, loan_id))
        .header("Authorization", format!("Bearer {}", token))
        .json(&json!({ "returnCondition": "good" }))
        .send()
        .await
        .expect("Failed to send request");
    assert!(response.status().is_success());
    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["data"]["status"], "returned");

    let fines: Value = client
        .get(format!("{}/fines?loanId={}", BASE_URL, loan_id))
        .header("Authorization", format!("Bearer {}", token))
        .send()
        .await
        .expect("Failed to send request")
        .json()
        .await
        .expect("Failed to parse response");
    assert_eq!(fines["pagination"]["total"], 1);
}

#[tokio::test]
#[ignore]
async fn test_reservation_priority_ordering() {
    let client = Client::new();
    let token = get_auth_token(&client).await;
    let tag = unique_tag("resq");

    // Material with no available stock
    let material_id = create_material(&client, &token, &tag, 1, 0).await;
    let student_id = create_student(&client, &token, &tag).await;

    // Professor reserving later still outranks the student
    let professor: Value = client
        .post(format!("{}/users", BASE_URL))
        .header("Authorization", format!("Bearer {}", token))
        .json(&json!({
            "name": format!("Test Professor {}", tag),
            "email": format!("prof-{}@lablend.local", tag),
            "registrationNumber": format!("PROF-{}", tag),
            "userType": "professor",
            "password": "prof1234"
        }))
        .send()
        .await
        .expect("Failed to send request")
        .json()
        .await
        .expect("Failed to parse response");
    let professor_id = professor["data"]["id"].as_i64().expect("No user ID");

    let response = client
        .post(format!("{}/reservations", BASE_URL))
        .header("Authorization", format!("Bearer {}", token))
        .json(&json!({ "materialId": material_id, "userId": student_id }))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 201);
    let student_reservation: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(student_reservation["data"]["priorityLevel"], 0);

    let response = client
        .post(format!("{}/reservations", BASE_URL))
        .header("Authorization", format!("Bearer {}", token))
        .json(&json!({ "materialId": material_id, "userId": professor_id }))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 201);
    let professor_reservation: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(professor_reservation["data"]["priorityLevel"], 1);

    // Duplicate reservation is rejected
    let response = client
        .post(format!("{}/reservations", BASE_URL))
        .header("Authorization", format!("Bearer {}", token))
        .json(&json!({ "materialId": material_id, "userId": student_id }))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 400);

    // The queue listing sorted by priority puts the professor first
    let listing: Value = client
        .get(format!(
            "{}/reservations?materialId={}&sortBy=priorityLevel&sortOrder=desc",
            BASE_URL, material_id
        ))
        .header("Authorization", format!("Bearer {}", token))
        .send()
        .await
        .expect("Failed to send request")
        .json()
        .await
        .expect("Failed to parse response");
    assert_eq!(listing["data"][0]["userId"], professor_id);
}

#[tokio::test]
#[ignore]
async fn test_reservation_requires_exhausted_stock() {
    let client = Client::new();
    let token = get_auth_token(&client).await;
    let tag = unique_tag("resav");

    let material_id = create_material(&client, &token, &tag, 1, 1).await;
    let user_id = create_student(&client, &token, &tag).await;

    let response = client
        .post(format!("{}/reservations", BASE_URL))
        .header("Authorization", format!("Bearer {}", token))
        .json(&json!({ "materialId": material_id, "userId": user_id }))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 400);
}

#[tokio::test]
#[ignore]
async fn test_fine_limit_blocks_user() {
    let client = Client::new();
    let token = get_auth_token(&client).await;
    let tag = unique_tag("fines");

    let user_id = create_student(&client, &token, &tag).await;

    // Default policy blocks at three active fines
    for i in 0..3 {
        let response = client
            .post(format!("{}/fines", BASE_URL))
            .header("Authorization", format!("Bearer {}", token))
            .json(&json!({
                "userId": user_id,
                "reason": "rule_violation",
                "description": format!("Violation {}", i)
            }))
            .send()
            .await
            .expect("Failed to send request");
        assert_eq!(response.status(), 201);
    }

    let user: Value = client
        .get(format!("{}/users/{}", BASE_URL, user_id))
        .header("Authorization", format!("Bearer {}", token))
        .send()
        .await
        .expect("Failed to send request")
        .json()
        .await
        .expect("Failed to parse response");

    assert_eq!(user["data"]["fineCount"], 3);
    assert!(user["data"]["blockedUntil"].is_string());

    // A blocked user cannot log in
    let response = client
        .post(format!("{}/auth/login", BASE_URL))
        .json(&json!({
            "email": format!("student-{}@lablend.local", tag),
            "password": "student123"
        }))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 403);

    // And cannot receive a new loan
    let material_id = create_material(&client, &token, &tag, 1, 1).await;
    let response = client
        .post(format!("{}/loans", BASE_URL))
        .header("Authorization", format!("Bearer {}", token))
        .json(&json!({
            "userId": user_id,
            "materialId": material_id,
            "dueDate": "2099-01-01T00:00:00Z"
        }))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 400);
}

#[tokio::test]
#[ignore]
async fn test_settings_roundtrip() {
    let client = Client::new();
    let token = get_auth_token(&client).await;

    let response = client
        .get(format!("{}/settings", BASE_URL))
        .header("Authorization", format!("Bearer {}", token))
        .send()
        .await
        .expect("Failed to send request");

    assert!(response.status().is_success());
    let body: Value = response.json().await.expect("Failed to parse response");
    assert!(body["data"]["maxFinesLimit"].is_number());
    assert!(body["data"]["blockDurationDays"].is_number());
}

#[tokio::test]
#[ignore]
async fn test_audit_logs_require_technician() {
    let client = Client::new();
    let token = get_auth_token(&client).await;

    let response = client
        .get(format!("{}/audit-logs", BASE_URL))
        .header("Authorization", format!("Bearer {}", token))
        .send()
        .await
        .expect("Failed to send request");

    // Seeded account is a technician
    assert!(response.status().is_success());
    let body: Value = response.json().await.expect("Failed to parse response");
    assert!(body["data"].is_array());
}
