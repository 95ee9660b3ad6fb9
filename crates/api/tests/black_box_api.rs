use std::sync::Arc;

use chrono::{Duration as ChronoDuration, NaiveDate, Utc};
use fellowship_api::app::{build_router, services::AppServices};
use fellowship_auth::{JwtClaims, Role};
use fellowship_core::UserId;
use jsonwebtoken::{Algorithm, EncodingKey, Header};
use reqwest::{StatusCode, header::LOCATION, redirect};
use serde_json::{Value, json};

const SECRET: &str = "test-secret";

struct TestServer {
    base_url: String,
    handle: tokio::task::JoinHandle<()>,
}

impl TestServer {
    async fn spawn() -> Self {
        fellowship_observability::init_for_tests();

        // Same router as prod, fresh in-memory storage, ephemeral port.
        let app = build_router(Arc::new(AppServices::in_memory()), SECRET);
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("failed to bind ephemeral port");
        let addr = listener.local_addr().unwrap();
        let base_url = format!("http://{}", addr);

        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self { base_url, handle }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

fn mint_jwt(role: &str) -> String {
    let now = Utc::now();
    let mut claims = JwtClaims::new(UserId::new(), Role::Member, now, now + ChronoDuration::minutes(10));
    claims.role = role.to_string();

    jsonwebtoken::encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(SECRET.as_bytes()),
    )
    .expect("failed to encode jwt")
}

fn no_redirects() -> reqwest::Client {
    reqwest::Client::builder()
        .redirect(redirect::Policy::none())
        .build()
        .unwrap()
}

async fn register(client: &reqwest::Client, srv: &TestServer, email: &str) -> reqwest::Response {
    client
        .post(srv.url("/public/register"))
        .json(&json!({ "firstName": "Ada", "lastName": "Lovelace", "email": email }))
        .send()
        .await
        .unwrap()
}

async fn register_id(client: &reqwest::Client, srv: &TestServer, email: &str) -> String {
    let res = register(client, srv, email).await;
    assert_eq!(res.status(), StatusCode::CREATED);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["status"], "PENDING");
    body["id"].as_str().unwrap().to_string()
}

async fn submit_prayer(client: &reqwest::Client, srv: &TestServer, body: Value) -> String {
    let res = client.post(srv.url("/public/prayer-requests")).json(&body).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::CREATED);
    let body: Value = res.json().await.unwrap();
    body["id"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn health_is_public_and_api_requires_identity() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();

    let res = client.get(srv.url("/health")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let res = client.get(srv.url("/api/whoami")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);

    let res = client.get(srv.url("/api/members")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["error"], "unauthenticated");

    let res = client
        .get(srv.url("/api/whoami"))
        .bearer_auth("not-a-token")
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn whoami_reflects_token_role() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();

    let res = client
        .get(srv.url("/api/whoami"))
        .bearer_auth(mint_jwt("LEADER"))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["role"], "LEADER");
    assert_eq!(body["adminSurface"], true);
}

#[tokio::test]
async fn unknown_role_is_a_server_error() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();

    let res = client
        .get(srv.url("/api/members"))
        .bearer_auth(mint_jwt("DEACON"))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["error"], "internal_error");
}

#[tokio::test]
async fn registration_approval_is_guarded() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();
    let admin = mint_jwt("ADMIN");

    let id = register_id(&client, &srv, "ada@example.org").await;

    let res = client
        .get(srv.url("/api/members/pending"))
        .bearer_auth(&admin)
        .send()
        .await
        .unwrap();
    let body: Value = res.json().await.unwrap();
    assert!(body["items"].as_array().unwrap().iter().any(|m| m["id"] == id.as_str()));

    // Leaders can read members but not approve them.
    let res = client
        .post(srv.url(&format!("/api/members/{id}/approve")))
        .bearer_auth(mint_jwt("LEADER"))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::FORBIDDEN);

    let res = client
        .post(srv.url(&format!("/api/members/{id}/approve")))
        .bearer_auth(&admin)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["status"], "ACTIVE");

    let res = client
        .post(srv.url(&format!("/api/members/{id}/approve")))
        .bearer_auth(&admin)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["error"], "invalid_transition");
    assert_eq!(body["message"], "cannot approve member in status ACTIVE");
}

#[tokio::test]
async fn rejection_deletes_the_registration() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();
    let admin = mint_jwt("SUPER_ADMIN");

    let id = register_id(&client, &srv, "reject@example.org").await;

    let res = client
        .post(srv.url(&format!("/api/members/{id}/reject")))
        .bearer_auth(&admin)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let res = client
        .get(srv.url(&format!("/api/members/{id}")))
        .bearer_auth(&admin)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);

    // The email is free again.
    register_id(&client, &srv, "reject@example.org").await;
}

#[tokio::test]
async fn duplicate_email_is_a_conflict() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();

    register_id(&client, &srv, "twice@example.org").await;
    let res = register(&client, &srv, "TWICE@example.org").await;
    assert_eq!(res.status(), StatusCode::CONFLICT);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["error"], "conflict");
}

#[tokio::test]
async fn invalid_registration_lists_every_field() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();

    let res = client
        .post(srv.url("/public/register"))
        .json(&json!({ "firstName": "", "lastName": "", "email": "nope" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["error"], "validation_failed");
    assert_eq!(body["details"].as_array().unwrap().len(), 3);
}

#[tokio::test]
async fn denial_does_not_reveal_existence() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();

    let res = client
        .post(srv.url("/public/contact"))
        .json(&json!({
            "name": "Grace",
            "email": "grace@example.org",
            "subject": "Visiting",
            "message": "What time is the service?",
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CREATED);
    let created: Value = res.json().await.unwrap();
    let existing = created["id"].as_str().unwrap().to_string();
    let missing = UserId::new().to_string();

    let leader = mint_jwt("LEADER");
    let mut bodies = Vec::new();
    for id in [existing.as_str(), missing.as_str(), "not-a-uuid"] {
        let res = client
            .get(srv.url(&format!("/api/messages/{id}")))
            .bearer_auth(&leader)
            .send()
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::FORBIDDEN);
        bodies.push(res.json::<Value>().await.unwrap());
    }
    assert!(bodies.windows(2).all(|w| w[0] == w[1]));

    let res = client
        .get(srv.url(&format!("/api/messages/{missing}")))
        .bearer_auth(mint_jwt("ADMIN"))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn role_table_is_enforced_at_the_edge() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();

    let cases = [
        ("ADMIN", "/api/users", StatusCode::FORBIDDEN),
        ("ADMIN", "/api/settings", StatusCode::FORBIDDEN),
        ("ADMIN", "/api/messages", StatusCode::OK),
        ("SUPER_ADMIN", "/api/users", StatusCode::OK),
        ("SUPER_ADMIN", "/api/settings", StatusCode::OK),
        ("LEADER", "/api/members", StatusCode::OK),
        ("LEADER", "/api/follow-ups", StatusCode::OK),
        ("LEADER", "/api/ministries", StatusCode::OK),
        ("LEADER", "/api/messages", StatusCode::FORBIDDEN),
        ("LEADER", "/api/notices", StatusCode::FORBIDDEN),
        ("LEADER", "/api/books", StatusCode::FORBIDDEN),
        ("MEMBER", "/api/members", StatusCode::FORBIDDEN),
        ("MEMBER", "/api/events", StatusCode::FORBIDDEN),
    ];
    for (role, path, expected) in cases {
        let res = client.get(srv.url(path)).bearer_auth(mint_jwt(role)).send().await.unwrap();
        assert_eq!(res.status(), expected, "{role} GET {path}");
    }
}

#[tokio::test]
async fn anonymous_prayer_request_drops_contact_details() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();
    let admin = mint_jwt("ADMIN");

    let id = submit_prayer(
        &client,
        &srv,
        json!({
            "name": "Jane",
            "email": "j@x.com",
            "phone": "555-0100",
            "title": "Healing",
            "request": "For my mother",
            "isAnonymous": true,
            "isPublic": true,
        }),
    )
    .await;

    let res = client
        .get(srv.url(&format!("/api/prayer-requests/{id}")))
        .bearer_auth(&admin)
        .send()
        .await
        .unwrap();
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["name"], Value::Null);
    assert_eq!(body["email"], Value::Null);
    assert_eq!(body["phone"], Value::Null);

    let res = client.get(srv.url("/public/prayer-requests")).send().await.unwrap();
    let wall: Value = res.json().await.unwrap();
    assert_eq!(wall["items"].as_array().unwrap().len(), 1);
    assert!(wall["items"][0].get("email").is_none());
}

#[tokio::test]
async fn marking_prayed_counts_each_principal_once() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();

    let id = submit_prayer(&client, &srv, json!({ "title": "Exams", "request": "Strength" })).await;
    let url = srv.url(&format!("/api/prayer-requests/{id}/prayed"));

    let res = client.post(&url).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);

    let admin = mint_jwt("ADMIN");
    for _ in 0..2 {
        let res = client.post(&url).bearer_auth(&admin).send().await.unwrap();
        assert_eq!(res.status(), StatusCode::OK);
    }
    let res = client.post(&url).bearer_auth(mint_jwt("ADMIN")).send().await.unwrap();
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["prayerCount"], 2);
    assert_eq!(body["prayedBy"].as_array().unwrap().len(), 2);
    assert_eq!(body["status"], "SUBMITTED");
}

#[tokio::test]
async fn leaders_only_see_shared_prayer_requests() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();
    let leader = mint_jwt("LEADER");

    let shared = submit_prayer(
        &client,
        &srv,
        json!({ "title": "Shared", "request": "Please pray", "shareWithPastors": true }),
    )
    .await;
    let private = submit_prayer(&client, &srv, json!({ "title": "Private", "request": "Just staff" })).await;

    let res = client
        .get(srv.url("/api/prayer-requests"))
        .bearer_auth(&leader)
        .send()
        .await
        .unwrap();
    let body: Value = res.json().await.unwrap();
    let ids: Vec<_> = body["items"].as_array().unwrap().iter().map(|r| r["id"].clone()).collect();
    assert_eq!(ids, vec![Value::from(shared.clone())]);

    let res = client
        .get(srv.url(&format!("/api/prayer-requests/{shared}")))
        .bearer_auth(&leader)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    for id in [private, UserId::new().to_string()] {
        let res = client
            .get(srv.url(&format!("/api/prayer-requests/{id}")))
            .bearer_auth(&leader)
            .send()
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::FORBIDDEN);
    }

    let res = client
        .patch(srv.url(&format!("/api/prayer-requests/{shared}")))
        .bearer_auth(&leader)
        .json(&json!({ "status": "PRAYING" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn response_moves_message_to_responded_unless_status_given() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();
    let admin = mint_jwt("ADMIN");

    let res = client
        .post(srv.url("/public/contact"))
        .json(&json!({
            "name": "Grace",
            "email": "grace@example.org",
            "subject": "Prayer",
            "message": "Can someone call me?",
        }))
        .send()
        .await
        .unwrap();
    let id = res.json::<Value>().await.unwrap()["id"].as_str().unwrap().to_string();
    let before = Utc::now();

    let res = client
        .patch(srv.url(&format!("/api/messages/{id}")))
        .bearer_auth(&admin)
        .json(&json!({ "response": "Thanks!" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["status"], "RESPONDED");
    let responded_at: chrono::DateTime<Utc> = serde_json::from_value(body["respondedAt"].clone()).unwrap();
    assert!(responded_at >= before - ChronoDuration::seconds(1));

    let res = client
        .patch(srv.url(&format!("/api/messages/{id}")))
        .bearer_auth(&admin)
        .json(&json!({ "response": "Thanks again!", "status": "CLOSED" }))
        .send()
        .await
        .unwrap();
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["status"], "CLOSED");
    assert_eq!(body["response"], "Thanks again!");
}

#[tokio::test]
async fn public_notices_respect_the_publication_window() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();
    let admin = mint_jwt("ADMIN");
    let now = Utc::now();

    let notices = [
        json!({ "title": "Current", "content": "Shown", "publishDate": now - ChronoDuration::days(1) }),
        json!({
            "title": "Expired",
            "content": "Hidden",
            "publishDate": now - ChronoDuration::days(7),
            "expiryDate": now - ChronoDuration::days(1),
        }),
        json!({ "title": "Inactive", "content": "Hidden", "isActive": false }),
    ];
    for notice in notices {
        let res = client
            .post(srv.url("/api/notices"))
            .bearer_auth(&admin)
            .json(&notice)
            .send()
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::CREATED);
    }

    let res = client.get(srv.url("/public/notices")).send().await.unwrap();
    let body: Value = res.json().await.unwrap();
    let titles: Vec<_> = body["items"].as_array().unwrap().iter().map(|n| n["title"].clone()).collect();
    assert_eq!(titles, vec![Value::from("Current")]);

    let res = client
        .post(srv.url("/api/notices"))
        .bearer_auth(&admin)
        .json(&json!({
            "title": "Backwards",
            "content": "Bad window",
            "publishDate": now,
            "expiryDate": now - ChronoDuration::days(1),
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn follow_up_lifecycle_through_the_api() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();
    let admin = mint_jwt("ADMIN");
    let leader = mint_jwt("LEADER");

    let res = client
        .post(srv.url("/api/members"))
        .bearer_auth(&admin)
        .json(&json!({ "firstName": "Ruth", "lastName": "Moab", "email": "ruth@example.org" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CREATED);
    let member: Value = res.json().await.unwrap();
    assert_eq!(member["status"], "ACTIVE");

    let draft = json!({ "memberId": member["id"], "kind": "VISIT", "notes": "New in town" });
    let res = client
        .post(srv.url("/api/follow-ups"))
        .bearer_auth(&leader)
        .json(&draft)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::FORBIDDEN);

    let res = client
        .post(srv.url("/api/follow-ups"))
        .bearer_auth(&admin)
        .json(&draft)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CREATED);
    let follow_up: Value = res.json().await.unwrap();
    assert_eq!(follow_up["status"], "OPEN");
    let id = follow_up["id"].as_str().unwrap().to_string();

    let res = client
        .post(srv.url(&format!("/api/follow-ups/{id}/assign")))
        .bearer_auth(&leader)
        .json(&json!({ "assignee": UserId::new() }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(res.json::<Value>().await.unwrap()["status"], "ASSIGNED");

    let next = NaiveDate::from_ymd_opt(2031, 5, 1).unwrap();
    let completion = json!({ "outcome": "Visited", "requiresFollowUp": true, "nextFollowUpDate": next });
    let res = client
        .post(srv.url(&format!("/api/follow-ups/{id}/complete")))
        .bearer_auth(&leader)
        .json(&completion)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["status"], "COMPLETED");
    assert_eq!(body["schedulingHint"], "2031-05-01");

    let res = client
        .post(srv.url(&format!("/api/follow-ups/{id}/complete")))
        .bearer_auth(&leader)
        .json(&completion)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn closed_registration_refuses_sign_ups() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();

    let res = client
        .put(srv.url("/api/settings"))
        .bearer_auth(mint_jwt("SUPER_ADMIN"))
        .json(&json!({ "registrationOpen": false }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let res = register(&client, &srv, "late@example.org").await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["error"], "invariant_violation");
}

#[tokio::test]
async fn policy_audit_endpoints() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();

    let res = client
        .get(srv.url("/api/rbac/matrix"))
        .bearer_auth(mint_jwt("ADMIN"))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::FORBIDDEN);

    let res = client
        .get(srv.url("/api/rbac/matrix"))
        .bearer_auth(mint_jwt("SUPER_ADMIN"))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["entries"].as_array().unwrap().len(), 4 * 12 * 8);

    let res = client
        .get(srv.url("/api/rbac/explain?class=messages&action=read"))
        .bearer_auth(mint_jwt("LEADER"))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["allowed"], false);
    assert_eq!(body["rule"], "leader_default_deny");

    let res = client
        .get(srv.url("/api/rbac/explain?class=dashboard&action=read"))
        .bearer_auth(mint_jwt("LEADER"))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn pages_redirect_instead_of_erroring() {
    let srv = TestServer::spawn().await;
    let client = no_redirects();

    let cases = [
        (None, "/admin", Some("/sign-in")),
        (None, "/admin/members", Some("/sign-in")),
        (None, "/sign-in", None),
        (Some("MEMBER"), "/admin", Some("/sign-in")),
        (Some("MEMBER"), "/sign-in", None),
        (Some("MEMBER"), "/register", None),
        (Some("ADMIN"), "/sign-in", Some("/admin")),
        (Some("ADMIN"), "/register", Some("/admin")),
        (Some("ADMIN"), "/admin/users", Some("/admin")),
        (Some("ADMIN"), "/admin/messages", None),
        (Some("LEADER"), "/admin/messages", Some("/admin")),
        (Some("LEADER"), "/admin/members", None),
        (Some("SUPER_ADMIN"), "/admin/settings", None),
    ];
    for (role, path, location) in cases {
        let mut req = client.get(srv.url(path));
        if let Some(role) = role {
            req = req.bearer_auth(mint_jwt(role));
        }
        let res = req.send().await.unwrap();
        match location {
            Some(expected) => {
                assert_eq!(res.status(), StatusCode::SEE_OTHER, "{role:?} {path}");
                assert_eq!(res.headers()[LOCATION], expected, "{role:?} {path}");
            }
            None => assert_eq!(res.status(), StatusCode::OK, "{role:?} {path}"),
        }
    }

    let res = client
        .get(srv.url("/admin"))
        .bearer_auth("garbage")
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::SEE_OTHER);
    assert_eq!(res.headers()[LOCATION], "/sign-in");

    let res = client
        .get(srv.url("/admin/nowhere"))
        .bearer_auth(mint_jwt("ADMIN"))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn malformed_bodies_are_authorized_first_then_reported_as_json() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();
    let any_id = UserId::new();

    // Anonymous callers are turned away before the body is read.
    let res = client
        .post(srv.url("/api/members"))
        .json(&json!({ "firstName": 5 }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);

    // So are principals the policy denies.
    let res = client
        .patch(srv.url(&format!("/api/messages/{any_id}")))
        .bearer_auth(mint_jwt("LEADER"))
        .json(&json!({ "status": "BOGUS" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::FORBIDDEN);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["error"], "forbidden");

    // An authorized caller gets a 400 in the error shape.
    let res = client
        .patch(srv.url(&format!("/api/messages/{any_id}")))
        .bearer_auth(mint_jwt("ADMIN"))
        .json(&json!({ "status": "BOGUS" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["error"], "validation_failed");
    assert!(!body["details"].as_array().unwrap().is_empty());

    let res = client
        .post(srv.url("/api/notices"))
        .bearer_auth(mint_jwt("ADMIN"))
        .header("content-type", "application/json")
        .body("{not json")
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["details"][0]["field"], "body");
}

#[tokio::test]
async fn public_submissions_report_every_missing_field() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();

    let res = client
        .post(srv.url("/public/contact"))
        .json(&json!({ "name": "x" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["error"], "validation_failed");
    let fields: Vec<_> = body["details"]
        .as_array()
        .unwrap()
        .iter()
        .map(|d| d["field"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(fields, vec!["email", "message", "subject"]);

    let res = client
        .post(srv.url("/public/prayer-requests"))
        .json(&json!({ "isPublic": "yes" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["error"], "validation_failed");
}

#[tokio::test]
async fn framework_errors_use_the_json_shape() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();

    let res = client.get(srv.url("/api/no-such-area")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["error"], "not_found");

    let res = client.put(srv.url("/public/contact")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::METHOD_NOT_ALLOWED);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["error"], "method_not_allowed");
}
