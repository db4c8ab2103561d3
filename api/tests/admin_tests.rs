mod common;

use api::admin::create_admin;
use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use common::*;
use serde_json::json;

async fn register(app: &Router, username: &str, email: &str) -> i64 {
    let mut payload = valid_registration();
    payload["username"] = json!(username);
    payload["email"] = json!(email);
    let response = send(app, post_json("/register", &payload)).await;
    assert_eq!(response.status(), StatusCode::CREATED);
    body_json(response).await["user_id"].as_i64().unwrap()
}

async fn login(app: &Router) -> String {
    let response = send(
        app,
        post_json("/admin/login", &json!({"username": "root", "password": "Sup3r$ecret"})),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let cookie = response
        .headers()
        .get(header::SET_COOKIE)
        .unwrap()
        .to_str()
        .unwrap()
        .to_string();
    assert!(cookie.contains("HttpOnly"));
    cookie.split(';').next().unwrap().to_string()
}

fn with_cookie(method: &str, uri: &str, cookie: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::COOKIE, cookie)
        .body(Body::empty())
        .unwrap()
}

#[tokio::test]
async fn test_admin_routes_require_a_session() {
    let (app, _) = test_app();
    for uri in ["/admin/registrations", "/admin/registrations/1", "/admin/export.csv"] {
        let response = send(&app, get(uri)).await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED, "{uri}");
    }

    let forged = send(&app, with_cookie("GET", "/admin/registrations", "regadmin_session=bogus")).await;
    assert_eq!(forged.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_bad_credentials_are_rejected() {
    let (app, store) = test_app();
    create_admin(store.as_ref(), "root", "root@mail.com", "Sup3r$ecret")
        .await
        .unwrap();

    let response = send(
        &app,
        post_json("/admin/login", &json!({"username": "root", "password": "wrong"})),
    )
    .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert!(response.headers().get(header::SET_COOKIE).is_none());

    let unknown = send(
        &app,
        post_json("/admin/login", &json!({"username": "nobody", "password": "Sup3r$ecret"})),
    )
    .await;
    assert_eq!(unknown.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_admin_review_flow() {
    let (app, store) = test_app();
    create_admin(store.as_ref(), "root", "root@mail.com", "Sup3r$ecret")
        .await
        .unwrap();
    let alice = register(&app, "alice01", "alice01@mail.com").await;
    let bob = register(&app, "bob_02", "bob02@mail.com").await;

    let cookie = login(&app).await;

    let listing = send(&app, with_cookie("GET", "/admin/registrations", &cookie)).await;
    assert_eq!(listing.status(), StatusCode::OK);
    let page = body_json(listing).await;
    assert_eq!(page["total"], 2);
    assert_eq!(page["page"], 1);
    assert_eq!(page["pages"], 1);
    assert_eq!(page["items"][0]["username"], "bob_02");

    let searched = send(
        &app,
        with_cookie("GET", "/admin/registrations?search=ALICE", &cookie),
    )
    .await;
    let page = body_json(searched).await;
    assert_eq!(page["total"], 1);
    assert_eq!(page["items"][0]["id"], alice);

    let detail = send(
        &app,
        with_cookie("GET", &format!("/admin/registrations/{alice}"), &cookie),
    )
    .await;
    assert_eq!(detail.status(), StatusCode::OK);
    let record = body_json(detail).await;
    assert_eq!(record["email"], "alice01@mail.com");
    assert!(record.get("password_hash").is_none());
    assert!(record.get("security_answer").is_none());

    let export = send(&app, with_cookie("GET", "/admin/export.csv", &cookie)).await;
    assert_eq!(export.status(), StatusCode::OK);
    let disposition = export
        .headers()
        .get(header::CONTENT_DISPOSITION)
        .unwrap()
        .to_str()
        .unwrap()
        .to_string();
    assert!(disposition.contains("registrations_"));
    let csv = body_text(export).await;
    assert_eq!(csv.lines().count(), 3);
    assert!(csv.starts_with("ID,First Name,Last Name"));

    let deleted = send(
        &app,
        with_cookie("DELETE", &format!("/admin/registrations/{bob}"), &cookie),
    )
    .await;
    assert_eq!(deleted.status(), StatusCode::OK);
    assert_eq!(body_json(deleted).await["success"], true);
    assert_eq!(store.registration_count().await, 1);

    let again = send(
        &app,
        with_cookie("DELETE", &format!("/admin/registrations/{bob}"), &cookie),
    )
    .await;
    assert_eq!(again.status(), StatusCode::NOT_FOUND);

    let logout = send(&app, with_cookie("POST", "/admin/logout", &cookie)).await;
    assert_eq!(logout.status(), StatusCode::OK);

    let after_logout = send(&app, with_cookie("GET", "/admin/registrations", &cookie)).await;
    assert_eq!(after_logout.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_login_records_last_login() {
    let (app, store) = test_app();
    create_admin(store.as_ref(), "root", "root@mail.com", "Sup3r$ecret")
        .await
        .unwrap();
    login(&app).await;

    use api::storage::RegistrationStore;
    let admin = store.find_admin_by_username("root").await.unwrap().unwrap();
    assert!(admin.last_login.is_some());
}

#[tokio::test]
async fn test_huge_page_number_is_an_empty_page() {
    let (app, store) = test_app();
    create_admin(store.as_ref(), "root", "root@mail.com", "Sup3r$ecret")
        .await
        .unwrap();
    register(&app, "alice01", "alice01@mail.com").await;
    let cookie = login(&app).await;

    let response = send(
        &app,
        with_cookie(
            "GET",
            &format!("/admin/registrations?page={}", i64::MAX),
            &cookie,
        ),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let page = body_json(response).await;
    assert_eq!(page["total"], 1);
    assert_eq!(page["items"], json!([]));
}
