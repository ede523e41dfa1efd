//! API integration tests
//!
//! These run against a live server with both stores up:
//! cargo test -- --ignored

use reqwest::Client;
use serde_json::{json, Value};

const BASE_URL: &str = "http://localhost:8080/api/v1";

/// Suffix fixture names so reruns against the same database don't collide
/// with the unique username/email constraints
fn unique(name: &str) -> String {
    let nanos = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap()
        .subsec_nanos();
    format!("{}_{}", name, nanos)
}

/// Register a throwaway user and return its id
async fn create_test_user(client: &Client, name: &str) -> i64 {
    let name = unique(name);
    let response = client
        .post(format!("{}/auth/register", BASE_URL))
        .json(&json!({
            "username": name,
            "email": format!("{}@example.org", name),
            "password": "correct-horse-battery"
        }))
        .send()
        .await
        .expect("Failed to send register request");

    assert_eq!(response.status(), 201);
    let body: Value = response.json().await.expect("Failed to parse register response");
    body["id"].as_i64().expect("No user id in response")
}

/// Create a book and return its id
async fn create_test_book(client: &Client, title: &str) -> i64 {
    let response = client
        .post(format!("{}/books", BASE_URL))
        .json(&json!({
            "title": title,
            "author": "Antoine de Saint-Exupéry",
            "category_id": null
        }))
        .send()
        .await
        .expect("Failed to send create book request");

    assert_eq!(response.status(), 201);
    let body: Value = response.json().await.expect("Failed to parse book response");
    body["id"].as_i64().expect("No book id in response")
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
async fn test_login_checks_credentials() {
    let client = Client::new();
    let name = unique("login_check");
    let email = format!("{}@example.org", name);

    let response = client
        .post(format!("{}/auth/register", BASE_URL))
        .json(&json!({
            "username": name,
            "email": email,
            "password": "correct-horse-battery"
        }))
        .send()
        .await
        .expect("Failed to send register request");
    assert_eq!(response.status(), 201);

    // Wrong password is rejected
    let response = client
        .post(format!("{}/auth/login", BASE_URL))
        .json(&json!({ "email": email, "password": "wrong" }))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 401);

    // Right password answers with the public profile, no hash
    let response = client
        .post(format!("{}/auth/login", BASE_URL))
        .json(&json!({ "email": email, "password": "correct-horse-battery" }))
        .send()
        .await
        .expect("Failed to send request");
    assert!(response.status().is_success());
    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["username"].as_str(), Some(name.as_str()));
    assert!(body.get("password_hash").is_none());
}

#[tokio::test]
#[ignore]
async fn test_borrow_and_return_cycle() {
    let client = Client::new();
    let user_id = create_test_user(&client, "borrower").await;
    let book_id = create_test_book(&client, "Vol de nuit").await;

    // Borrow: loan created with null return date, book flips to borrowed
    let response = client
        .post(format!("{}/loans", BASE_URL))
        .json(&json!({ "book_id": book_id, "user_id": user_id }))
        .send()
        .await
        .expect("Failed to send borrow request");
    assert_eq!(response.status(), 201);

    let loan: Value = response.json().await.expect("Failed to parse loan");
    let loan_id = loan["id"].as_i64().expect("No loan id");
    assert!(loan["returned_date"].is_null());
    assert_eq!(loan["book"]["availability"], "borrowed");
    assert_eq!(loan["user"]["id"].as_i64(), Some(user_id));

    // Same user borrowing the same book again is a conflict
    let response = client
        .post(format!("{}/loans", BASE_URL))
        .json(&json!({ "book_id": book_id, "user_id": user_id }))
        .send()
        .await
        .expect("Failed to send duplicate borrow");
    assert_eq!(response.status(), 409);

    // Any other user borrowing it is a conflict too
    let other_id = create_test_user(&client, "other_borrower").await;
    let response = client
        .post(format!("{}/loans", BASE_URL))
        .json(&json!({ "book_id": book_id, "user_id": other_id }))
        .send()
        .await
        .expect("Failed to send second borrow");
    assert_eq!(response.status(), 409);

    // Return: book flips back to available, return date is stamped
    let response = client
        .post(format!("{}/loans/{}/return", BASE_URL, loan_id))
        .send()
        .await
        .expect("Failed to send return request");
    assert!(response.status().is_success());

    let returned: Value = response.json().await.expect("Failed to parse return");
    assert!(!returned["returned_date"].is_null());
    assert_eq!(returned["book"]["availability"], "available");

    // Returning again is a conflict
    let response = client
        .post(format!("{}/loans/{}/return", BASE_URL, loan_id))
        .send()
        .await
        .expect("Failed to send second return");
    assert_eq!(response.status(), 409);
}

#[tokio::test]
#[ignore]
async fn test_borrow_missing_book_is_not_found() {
    let client = Client::new();
    let user_id = create_test_user(&client, "no_book").await;

    let response = client
        .post(format!("{}/loans", BASE_URL))
        .json(&json!({ "book_id": 999_999, "user_id": user_id }))
        .send()
        .await
        .expect("Failed to send borrow request");

    assert_eq!(response.status(), 404);
}

#[tokio::test]
#[ignore]
async fn test_search_is_case_insensitive() {
    let client = Client::new();
    create_test_book(&client, "Le Petit Prince").await;

    let response = client
        .get(format!("{}/books?title=prince", BASE_URL))
        .send()
        .await
        .expect("Failed to send search request");

    assert!(response.status().is_success());
    let books: Value = response.json().await.expect("Failed to parse search");
    let titles: Vec<&str> = books
        .as_array()
        .expect("Expected array")
        .iter()
        .filter_map(|b| b["title"].as_str())
        .collect();
    assert!(titles.contains(&"Le Petit Prince"));
    assert!(titles.iter().all(|t| t.to_lowercase().contains("prince")));
}

#[tokio::test]
#[ignore]
async fn test_never_borrowed_excludes_returned_loans() {
    let client = Client::new();
    let user_id = create_test_user(&client, "historian").await;
    let borrowed_id = create_test_book(&client, "Citadelle").await;
    let untouched_id = create_test_book(&client, "Courrier sud").await;

    // Borrow and immediately return the first book
    let response = client
        .post(format!("{}/loans", BASE_URL))
        .json(&json!({ "book_id": borrowed_id, "user_id": user_id }))
        .send()
        .await
        .expect("Failed to borrow");
    let loan: Value = response.json().await.unwrap();
    client
        .post(format!("{}/loans/{}/return", BASE_URL, loan["id"].as_i64().unwrap()))
        .send()
        .await
        .expect("Failed to return");

    let response = client
        .get(format!("{}/stats/never-borrowed", BASE_URL))
        .send()
        .await
        .expect("Failed to fetch report");
    let rows: Value = response.json().await.unwrap();
    let ids: Vec<i64> = rows
        .as_array()
        .unwrap()
        .iter()
        .filter_map(|r| r["book_id"].as_i64())
        .collect();

    // A fully-returned book still has loan rows and must not appear
    assert!(!ids.contains(&borrowed_id));
    assert!(ids.contains(&untouched_id));
}

#[tokio::test]
#[ignore]
async fn test_global_stats_shape() {
    let client = Client::new();

    let response = client
        .get(format!("{}/stats", BASE_URL))
        .send()
        .await
        .expect("Failed to send request");

    assert!(response.status().is_success());
    let body: Value = response.json().await.expect("Failed to parse response");
    assert!(body["total_books"].is_number());
    assert!(body["total_users"].is_number());
    assert!(body["active_loans"].is_number());
}

#[tokio::test]
#[ignore]
async fn test_comment_crud_and_rating_aggregation() {
    let client = Client::new();
    let user_id = create_test_user(&client, "reviewer").await;
    let book_id = create_test_book(&client, "Terre des hommes").await;

    // Out-of-range rating is rejected at the boundary
    let response = client
        .post(format!("{}/comments", BASE_URL))
        .json(&json!({ "book_id": book_id, "user_id": user_id, "text": "!", "rating": 6 }))
        .send()
        .await
        .expect("Failed to send comment");
    assert_eq!(response.status(), 400);

    // Two valid ratings: 3 and 5
    let response = client
        .post(format!("{}/comments", BASE_URL))
        .json(&json!({ "book_id": book_id, "user_id": user_id, "text": "Bien.", "rating": 3 }))
        .send()
        .await
        .expect("Failed to send comment");
    assert_eq!(response.status(), 201);
    let first: Value = response.json().await.unwrap();
    let comment_id = first["id"].as_str().expect("No comment id").to_string();
    assert!(first["updated_at"].is_null());

    let response = client
        .post(format!("{}/comments", BASE_URL))
        .json(&json!({ "book_id": book_id, "user_id": user_id, "text": "Superbe.", "rating": 5 }))
        .send()
        .await
        .expect("Failed to send comment");
    assert_eq!(response.status(), 201);

    // Aggregation: mean 4.0, count 2, min 3, max 5
    let response = client
        .get(format!("{}/books/{}/rating", BASE_URL, book_id))
        .send()
        .await
        .expect("Failed to fetch rating");
    assert!(response.status().is_success());
    let rating: Value = response.json().await.unwrap();
    assert_eq!(rating["mean_rating"].as_f64(), Some(4.0));
    assert_eq!(rating["review_count"].as_i64(), Some(2));
    assert_eq!(rating["min_rating"].as_i64(), Some(3));
    assert_eq!(rating["max_rating"].as_i64(), Some(5));

    // Update stamps the modification timestamp and keeps the opaque id
    let response = client
        .put(format!("{}/comments/{}", BASE_URL, comment_id))
        .json(&json!({ "text": "Très bien.", "rating": 4 }))
        .send()
        .await
        .expect("Failed to update comment");
    assert!(response.status().is_success());
    let updated: Value = response.json().await.unwrap();
    assert_eq!(updated["id"].as_str(), Some(comment_id.as_str()));
    assert!(!updated["updated_at"].is_null());

    // Delete, then the comment is gone
    let response = client
        .delete(format!("{}/comments/{}", BASE_URL, comment_id))
        .send()
        .await
        .expect("Failed to delete comment");
    assert_eq!(response.status(), 204);

    let response = client
        .get(format!("{}/comments/{}", BASE_URL, comment_id))
        .send()
        .await
        .expect("Failed to fetch comment");
    assert_eq!(response.status(), 404);
}

#[tokio::test]
#[ignore]
async fn test_user_loan_listings() {
    let client = Client::new();
    let user_id = create_test_user(&client, "lister").await;
    let book_id = create_test_book(&client, "Lettre à un otage").await;

    let response = client
        .post(format!("{}/loans", BASE_URL))
        .json(&json!({ "book_id": book_id, "user_id": user_id }))
        .send()
        .await
        .expect("Failed to borrow");
    let loan: Value = response.json().await.unwrap();

    let response = client
        .get(format!("{}/users/{}/loans", BASE_URL, user_id))
        .send()
        .await
        .expect("Failed to list loans");
    let active: Value = response.json().await.unwrap();
    assert_eq!(active.as_array().unwrap().len(), 1);

    client
        .post(format!("{}/loans/{}/return", BASE_URL, loan["id"].as_i64().unwrap()))
        .send()
        .await
        .expect("Failed to return");

    // Active list empties, history keeps the row
    let response = client
        .get(format!("{}/users/{}/loans", BASE_URL, user_id))
        .send()
        .await
        .expect("Failed to list loans");
    let active: Value = response.json().await.unwrap();
    assert!(active.as_array().unwrap().is_empty());

    let response = client
        .get(format!("{}/users/{}/loans/history", BASE_URL, user_id))
        .send()
        .await
        .expect("Failed to list history");
    let history: Value = response.json().await.unwrap();
    assert_eq!(history.as_array().unwrap().len(), 1);
    assert!(!history[0]["returned_date"].is_null());
}
